use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::future::Cache;

use super::SessionCache;
use crate::error::CacheError;

#[derive(Clone)]
struct Entry {
    bytes: Vec<u8>,
    deadline: Instant,
}

/// Bounded in-process cache. Each entry carries its own deadline because
/// session TTLs differ per entry (remaining lifetime), which a cache-wide
/// time-to-live cannot express.
#[derive(Clone)]
pub struct MemorySessionCache {
    cache: Cache<String, Entry>,
}

impl MemorySessionCache {
    pub fn new(max_entries: u64) -> Self {
        Self {
            cache: Cache::builder().max_capacity(max_entries).build(),
        }
    }
}

#[async_trait]
impl SessionCache for MemorySessionCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        match self.cache.get(key).await {
            Some(entry) if entry.deadline > Instant::now() => Ok(Some(entry.bytes)),
            Some(_) => {
                self.cache.invalidate(key).await;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError> {
        if ttl.is_zero() {
            self.cache.invalidate(key).await;
            return Ok(());
        }

        self.cache
            .insert(
                key.to_string(),
                Entry {
                    bytes: value.to_vec(),
                    deadline: Instant::now() + ttl,
                },
            )
            .await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.cache.invalidate(key).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::MemorySessionCache;
    use crate::cache::SessionCache;

    #[tokio::test]
    async fn set_then_get_returns_value() {
        let cache = MemorySessionCache::new(16);
        cache
            .set("token-1", b"payload", Duration::from_secs(60))
            .await
            .expect("set should succeed");

        let value = cache.get("token-1").await.expect("get should succeed");
        assert_eq!(value.as_deref(), Some(b"payload".as_slice()));
    }

    #[tokio::test]
    async fn expired_entry_reads_as_miss() {
        let cache = MemorySessionCache::new(16);
        cache
            .set("token-1", b"payload", Duration::from_millis(10))
            .await
            .expect("set should succeed");

        tokio::time::sleep(Duration::from_millis(30)).await;

        let value = cache.get("token-1").await.expect("get should succeed");
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn zero_ttl_drops_the_entry() {
        let cache = MemorySessionCache::new(16);
        cache
            .set("token-1", b"payload", Duration::from_secs(60))
            .await
            .expect("set should succeed");
        cache
            .set("token-1", b"payload", Duration::ZERO)
            .await
            .expect("set should succeed");

        assert!(cache.get("token-1").await.expect("get").is_none());
    }

    #[tokio::test]
    async fn delete_removes_the_entry() {
        let cache = MemorySessionCache::new(16);
        cache
            .set("token-1", b"payload", Duration::from_secs(60))
            .await
            .expect("set should succeed");
        cache.delete("token-1").await.expect("delete should succeed");

        assert!(cache.get("token-1").await.expect("get").is_none());
    }

    #[tokio::test]
    async fn delete_of_missing_key_is_a_noop() {
        let cache = MemorySessionCache::new(16);
        assert!(cache.delete("missing").await.is_ok());
    }
}
