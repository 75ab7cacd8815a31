//! In-process cache backend

use async_trait::async_trait;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::RwLock;

use super::{CacheBackend, CacheError, Clock, SystemClock};
use crate::types::CacheKey;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    /// `None` when `now + ttl` overflows
    expires_at: Option<SystemTime>,
}

impl CacheEntry {
    fn is_live(&self, now: SystemTime) -> bool {
        self.expires_at.is_none_or(|expires_at| now < expires_at)
    }
}

type Store = LruCache<String, CacheEntry>;

/// LRU-bounded cache shared across clones
///
/// Holds at most `capacity` entries, evicting the least recently used one
/// when full. Expired entries are dropped when read and swept on every write.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    store: Arc<RwLock<Store>>,
    prefix: String,
    clock: Arc<dyn Clock>,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCache {
    /// Capacity used when none (or zero) is given
    pub const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(1000) {
        Some(n) => n,
        None => unreachable!(),
    };

    /// Create an empty cache with the default capacity
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty cache holding at most `max_entries` (`0` for the default)
    #[must_use]
    pub fn with_capacity(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(Self::DEFAULT_CAPACITY);
        Self {
            store: Arc::new(RwLock::new(LruCache::new(capacity))),
            prefix: String::new(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Prefix every stored key (for sharing one store between applications)
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Use a custom time source
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Number of stored entries, including expired ones not yet reclaimed
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    /// Whether nothing is stored
    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    /// Maximum number of entries held
    pub async fn capacity(&self) -> usize {
        self.store.read().await.cap().get()
    }

    fn storage_key(&self, key: &CacheKey) -> String {
        format!("{}{}", self.prefix, key)
    }

    fn sweep_expired(store: &mut Store, now: SystemTime) -> usize {
        let expired: Vec<String> = store
            .iter()
            .filter(|(_, entry)| !entry.is_live(now))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            store.pop(key);
        }
        expired.len()
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn has(&self, key: &CacheKey) -> Result<bool, CacheError> {
        let now = self.clock.now();
        let storage_key = self.storage_key(key);
        let mut store = self.store.write().await;

        match store.peek(&storage_key) {
            Some(entry) if entry.is_live(now) => Ok(true),
            Some(_) => {
                store.pop(&storage_key);
                Ok(false)
            }
            None => Ok(false),
        }
    }

    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheError> {
        let now = self.clock.now();
        let storage_key = self.storage_key(key);
        let mut store = self.store.write().await;

        match store.get(&storage_key) {
            Some(entry) if entry.is_live(now) => Ok(Some(entry.value.clone())),
            Some(_) => {
                store.pop(&storage_key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn put(&self, key: &CacheKey, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let now = self.clock.now();
        let entry = CacheEntry {
            value: value.to_string(),
            expires_at: now.checked_add(ttl),
        };

        let mut store = self.store.write().await;
        let removed = Self::sweep_expired(&mut store, now);
        if removed > 0 {
            tracing::debug!(removed, "Swept expired cache entries");
        }
        store.push(self.storage_key(key), entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{ManualClock, RESPONSE_TTL};

    #[tokio::test]
    async fn test_put_then_get() {
        let cache = MemoryCache::new();
        let key = CacheKey::from("https://api.untappd.com/v4/user/info");

        assert!(!cache.has(&key).await.unwrap());
        cache.put(&key, r#"{"a":1}"#, RESPONSE_TTL).await.unwrap();

        assert!(cache.has(&key).await.unwrap());
        assert_eq!(
            cache.get(&key).await.unwrap().as_deref(),
            Some(r#"{"a":1}"#)
        );
    }

    #[tokio::test]
    async fn test_expiry_boundary() {
        let clock = Arc::new(ManualClock::new());
        let cache = MemoryCache::new().with_clock(clock.clone());
        let key = CacheKey::from("k");

        cache.put(&key, "v", RESPONSE_TTL).await.unwrap();

        clock.advance(Duration::from_secs(59 * 60));
        assert!(cache.has(&key).await.unwrap());

        clock.advance(Duration::from_secs(60));
        assert!(!cache.has(&key).await.unwrap());

        clock.advance(Duration::from_secs(60));
        assert!(!cache.has(&key).await.unwrap());
        assert!(cache.get(&key).await.unwrap().is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_has_reclaims_expired_entry() {
        let clock = Arc::new(ManualClock::new());
        let cache = MemoryCache::new().with_clock(clock.clone());
        let key = CacheKey::from("k");

        cache.put(&key, "v", RESPONSE_TTL).await.unwrap();
        clock.advance(Duration::from_secs(2 * 60 * 60));

        assert!(!cache.has(&key).await.unwrap());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_put_sweeps_expired_pages() {
        let clock = Arc::new(ManualClock::new());
        let cache = MemoryCache::with_capacity(10_000).with_clock(clock.clone());
        let url = "https://api.untappd.com/v4/checkin/recent";

        for min_id in 0..500 {
            let key = CacheKey::new(format!("{url}&min_id={min_id}"));
            assert!(!cache.has(&key).await.unwrap());
            cache.put(&key, "{}", RESPONSE_TTL).await.unwrap();
        }
        assert_eq!(cache.len().await, 500);

        clock.advance(Duration::from_secs(2 * 60 * 60));
        let fresh = CacheKey::new(format!("{url}&min_id=500"));
        cache.put(&fresh, "{}", RESPONSE_TTL).await.unwrap();

        assert_eq!(cache.len().await, 1);
        assert!(cache.has(&fresh).await.unwrap());
    }

    #[tokio::test]
    async fn test_capacity_evicts_least_recently_used() {
        let cache = MemoryCache::with_capacity(2);
        let (a, b, c) = (CacheKey::from("a"), CacheKey::from("b"), CacheKey::from("c"));

        cache.put(&a, "1", RESPONSE_TTL).await.unwrap();
        cache.put(&b, "2", RESPONSE_TTL).await.unwrap();
        // Touch `a` so `b` becomes the eviction candidate
        cache.get(&a).await.unwrap();
        cache.put(&c, "3", RESPONSE_TTL).await.unwrap();

        assert_eq!(cache.len().await, 2);
        assert!(cache.has(&a).await.unwrap());
        assert!(!cache.has(&b).await.unwrap());
        assert!(cache.has(&c).await.unwrap());
    }

    #[tokio::test]
    async fn test_zero_capacity_uses_default() {
        assert_eq!(MemoryCache::with_capacity(0).capacity().await, 1000);
    }

    #[tokio::test]
    async fn test_huge_ttl_never_expires() {
        let clock = Arc::new(ManualClock::new());
        let cache = MemoryCache::new().with_clock(clock.clone());
        let key = CacheKey::from("k");

        cache.put(&key, "v", Duration::MAX).await.unwrap();
        clock.advance(Duration::from_secs(365 * 24 * 60 * 60));

        assert!(cache.has(&key).await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_writers() {
        let cache = MemoryCache::new();
        let mut tasks = Vec::new();
        for i in 0..16 {
            let cache = cache.clone();
            tasks.push(tokio::spawn(async move {
                let key = CacheKey::new(format!("k{}", i % 4));
                cache.put(&key, &i.to_string(), RESPONSE_TTL).await.unwrap();
                cache.get(&key).await.unwrap()
            }));
        }
        for task in tasks {
            assert!(task.await.unwrap().is_some());
        }
        assert_eq!(cache.len().await, 4);
    }

    #[tokio::test]
    async fn test_prefix_isolates_keys() {
        let shared = MemoryCache::new();
        let app_a = shared.clone().with_prefix("a:");
        let app_b = shared.clone().with_prefix("b:");
        let key = CacheKey::from("same");

        app_a.put(&key, "from a", RESPONSE_TTL).await.unwrap();

        assert!(app_a.has(&key).await.unwrap());
        assert!(!app_b.has(&key).await.unwrap());
        assert_eq!(shared.len().await, 1);
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let cache = MemoryCache::new();
        let key = CacheKey::from("k");
        cache.put(&key, "old", RESPONSE_TTL).await.unwrap();
        cache.put(&key, "new", RESPONSE_TTL).await.unwrap();
        assert_eq!(cache.get(&key).await.unwrap().as_deref(), Some("new"));
    }
}
