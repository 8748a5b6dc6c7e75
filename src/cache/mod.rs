pub mod memory;
pub mod noop;
mod projection;
pub mod redis;

use std::time::Duration;

use async_trait::async_trait;

pub use memory::MemorySessionCache;
pub use noop::NoopSessionCache;
pub use projection::CacheProjection;
pub use self::redis::RedisSessionCache;

use crate::error::CacheError;

/// Low-latency key/value layer in front of the durable session store.
///
/// Implementations must be safe to call when the backend is unreachable:
/// they report the failure as an error and callers degrade to a miss. The
/// cache is never the source of truth.
#[async_trait]
pub trait SessionCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}
