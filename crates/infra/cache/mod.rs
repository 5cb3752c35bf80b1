pub mod in_memory;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use mockall::automock;
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;
use tracing::debug;

use crate::domain::value_objects::clock::Clock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub value: Vec<u8>,
    pub expires_at: DateTime<Utc>,
}

/// Storage backend for [`TtlCache`]. Implementations hold raw entries and never
/// interpret expiry themselves.
#[automock]
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<CacheEntry>>;

    async fn store(&self, key: &str, entry: CacheEntry) -> Result<()>;

    async fn remove(&self, key: &str) -> Result<()>;
}

/// Key/value cache with per-entry expiry. Time comes from the injected clock,
/// so an entry expires exactly when `clock.now() >= expires_at`.
#[derive(Clone)]
pub struct TtlCache {
    store: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
}

impl TtlCache {
    pub fn new(store: Arc<dyn CacheStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub async fn get<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let Some(entry) = self.store.load(key).await? else {
            return Ok(None);
        };

        if self.clock.now() >= entry.expires_at {
            debug!(key, expires_at = %entry.expires_at, "cache: evicting expired entry");
            self.store.remove(key).await?;
            return Ok(None);
        }

        Ok(Some(serde_json::from_slice(&entry.value)?))
    }

    pub async fn set<T>(&self, key: &str, value: &T, ttl: Duration) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let entry = CacheEntry {
            value: serde_json::to_vec(value)?,
            expires_at: self.clock.now() + ttl,
        };
        self.store.store(key, entry).await
    }

    pub async fn invalidate(&self, key: &str) -> Result<()> {
        self.store.remove(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::clock::FixedClock;
    use chrono::TimeZone;
    use mockall::predicate::eq;

    fn fixed_clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
        ))
    }

    #[tokio::test]
    async fn entry_expires_when_clock_reaches_ttl() {
        let clock = fixed_clock();
        let cache = TtlCache::new(
            Arc::new(in_memory::InMemoryCacheStore::new(
                in_memory::DEFAULT_MAX_ENTRIES,
                clock.clone(),
            )),
            clock.clone(),
        );

        cache.set("seed:user", &42_u64, Duration::hours(24)).await.unwrap();

        clock.advance(Duration::hours(23));
        assert_eq!(cache.get::<u64>("seed:user").await.unwrap(), Some(42));

        clock.advance(Duration::hours(1));
        assert_eq!(cache.get::<u64>("seed:user").await.unwrap(), None);
    }

    #[tokio::test]
    async fn expired_entry_is_removed_from_store() {
        let clock = fixed_clock();
        let expires_at = clock.now() - Duration::seconds(1);

        let mut store = MockCacheStore::new();
        store
            .expect_load()
            .with(eq("stale"))
            .times(1)
            .returning(move |_| {
                Ok(Some(CacheEntry {
                    value: b"1".to_vec(),
                    expires_at,
                }))
            });
        store
            .expect_remove()
            .with(eq("stale"))
            .times(1)
            .returning(|_| Ok(()));

        let cache = TtlCache::new(Arc::new(store), clock);
        assert_eq!(cache.get::<u64>("stale").await.unwrap(), None);
    }

    #[tokio::test]
    async fn invalidate_drops_live_entry() {
        let clock = fixed_clock();
        let cache = TtlCache::new(
            Arc::new(in_memory::InMemoryCacheStore::new(
                in_memory::DEFAULT_MAX_ENTRIES,
                clock.clone(),
            )),
            clock,
        );

        cache.set("k", "value", Duration::minutes(5)).await.unwrap();
        cache.invalidate("k").await.unwrap();

        assert_eq!(cache.get::<String>("k").await.unwrap(), None);
    }
}
