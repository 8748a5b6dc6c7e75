use std::time::Duration;

use async_trait::async_trait;

use super::SessionCache;
use crate::error::CacheError;

/// Cache for environments without a cache: every read misses, every write
/// succeeds. Keeps the lifecycle manager free of "is a cache configured"
/// branches.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSessionCache;

#[async_trait]
impl SessionCache for NoopSessionCache {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &[u8], _ttl: Duration) -> Result<(), CacheError> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Ok(())
    }
}
