use anyhow::Result;
use async_trait::async_trait;
use moka::{Expiry, future::Cache as MokaCache};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use super::{CacheEntry, CacheStore};
use crate::domain::value_objects::clock::Clock;

/// Entry bound used when a caller has no better figure.
pub const DEFAULT_MAX_ENTRIES: u64 = 10_000;

/// Lets moka drop an entry once its `expires_at` has passed, measured on the
/// same clock that stamped it.
struct EntryExpiry {
    clock: Arc<dyn Clock>,
}

impl EntryExpiry {
    fn remaining(&self, entry: &CacheEntry) -> Duration {
        (entry.expires_at - self.clock.now())
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}

impl Expiry<String, CacheEntry> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(self.remaining(value))
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CacheEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(self.remaining(value))
    }
}

/// Bounded in-process store. Evicts by TinyLFU once `max_entries` is reached
/// and drops entries after their own expiry.
#[derive(Clone)]
pub struct InMemoryCacheStore {
    entries: MokaCache<String, CacheEntry>,
}

impl InMemoryCacheStore {
    pub fn new(max_entries: u64, clock: Arc<dyn Clock>) -> Self {
        let entries = MokaCache::builder()
            .max_capacity(max_entries)
            .expire_after(EntryExpiry { clock })
            .build();

        Self { entries }
    }

    /// Applies pending evictions so `entry_count` is current.
    pub async fn run_pending_tasks(&self) {
        self.entries.run_pending_tasks().await;
    }

    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn load(&self, key: &str) -> Result<Option<CacheEntry>> {
        Ok(self.entries.get(key).await)
    }

    async fn store(&self, key: &str, entry: CacheEntry) -> Result<()> {
        self.entries.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.invalidate(key).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::clock::FixedClock;
    use chrono::{TimeZone, Utc};

    fn fixed_clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
        ))
    }

    fn entry(clock: &FixedClock, value: &[u8]) -> CacheEntry {
        CacheEntry {
            value: value.to_vec(),
            expires_at: clock.now() + chrono::Duration::hours(24),
        }
    }

    #[tokio::test]
    async fn store_overwrites_previous_entry() {
        let clock = fixed_clock();
        let store = InMemoryCacheStore::new(DEFAULT_MAX_ENTRIES, clock.clone());

        store.store("k", entry(&clock, b"1")).await.unwrap();
        store.store("k", entry(&clock, b"2")).await.unwrap();
        store.run_pending_tasks().await;

        assert_eq!(store.entry_count(), 1);
        assert_eq!(store.load("k").await.unwrap().unwrap().value, b"2".to_vec());

        store.remove("k").await.unwrap();
        assert_eq!(store.load("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn store_stays_within_its_bound() {
        const MAX_ENTRIES: u64 = 100;
        let clock = fixed_clock();
        let store = InMemoryCacheStore::new(MAX_ENTRIES, clock.clone());

        for viewer in 0..10_000 {
            let key = format!("directory:order-seed:{viewer}");
            store.store(&key, entry(&clock, b"7")).await.unwrap();
        }
        store.run_pending_tasks().await;

        assert!(
            store.entry_count() <= MAX_ENTRIES,
            "store holds {} entries, bound is {MAX_ENTRIES}",
            store.entry_count()
        );
    }

    #[tokio::test]
    async fn already_expired_entry_is_not_retained() {
        let clock = fixed_clock();
        let store = InMemoryCacheStore::new(DEFAULT_MAX_ENTRIES, clock.clone());

        let stale = CacheEntry {
            value: b"1".to_vec(),
            expires_at: clock.now() - chrono::Duration::seconds(1),
        };
        store.store("stale", stale).await.unwrap();

        assert_eq!(store.load("stale").await.unwrap(), None);
    }
}
