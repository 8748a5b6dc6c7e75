use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use super::SessionCache;
use crate::error::CacheError;

const KEY_PREFIX: &str = "session:";

/// Networked cache adapter over a shared redis connection manager. The
/// manager reconnects on its own; any command failure surfaces as a
/// `CacheError` and is absorbed as a miss upstream.
#[derive(Clone)]
pub struct RedisSessionCache {
    conn: ConnectionManager,
}

impl RedisSessionCache {
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(url).map_err(CacheError::from)?;
        let conn = ConnectionManager::new(client).await.map_err(CacheError::from)?;
        Ok(Self { conn })
    }

    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    fn key(key: &str) -> String {
        format!("{KEY_PREFIX}{key}")
    }
}

#[async_trait]
impl SessionCache for RedisSessionCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn = self.conn.clone();
        let value: Option<Vec<u8>> = conn.get(Self::key(key)).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError> {
        let seconds = ttl.as_secs();
        let mut conn = self.conn.clone();
        if seconds == 0 {
            // An already-expired projection has nothing to cache.
            let _: () = conn.del(Self::key(key)).await?;
            return Ok(());
        }
        let _: () = conn.set_ex(Self::key(key), value, seconds).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(Self::key(key)).await?;
        Ok(())
    }
}
