use crate::config::CacheConfig;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache lock poisoned: {0}")]
    LockError(String),
    #[error("invalid cache key: {0}")]
    InvalidKey(String),
}

struct CacheEntry<T> {
    value: T,
    created_at: Instant,
    last_access: Instant,
    access_count: u64,
}

impl<T: Clone> CacheEntry<T> {
    fn new(value: T) -> Self {
        let now = Instant::now();
        Self {
            value,
            created_at: now,
            last_access: now,
            access_count: 0,
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() > ttl
    }

    fn touch(&mut self) -> T {
        self.access_count += 1;
        self.last_access = Instant::now();
        self.value.clone()
    }
}

/// Shared-reference cache so one instance can sit behind an `Arc` in app state.
pub trait CacheTrait<T>: Send + Sync
where
    T: Clone + Send + Sync,
{
    fn get(&self, key: &str) -> Option<T>;
    fn insert(&self, key: String, value: T) -> Result<(), CacheError>;
    fn size(&self) -> usize;
    fn hit_rate(&self) -> f64;
    /// Drops expired entries and reports how many went.
    fn cleanup_expired(&self) -> usize;
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub inserts: u64,
    pub evictions: u64,
    pub expirations: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

struct CacheInner<T> {
    entries: HashMap<String, CacheEntry<T>>,
    stats: CacheStats,
}

pub struct InmemoryCache<T> {
    inner: Mutex<CacheInner<T>>,
    max_size: usize,
    ttl: Duration,
}

impl<T> InmemoryCache<T>
where
    T: Clone + Send + Sync,
{
    pub fn new(config: &CacheConfig) -> Self {
        tracing::info!(
            "Initializing in-memory cache with max_size: {}, expiration: {}s",
            config.max_size,
            config.expiration
        );
        Self {
            inner: Mutex::new(CacheInner {
                entries: HashMap::new(),
                stats: CacheStats::default(),
            }),
            max_size: config.max_size.max(1) as usize,
            ttl: Duration::from_secs(u64::from(config.expiration)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, CacheInner<T>>, CacheError> {
        self.inner
            .lock()
            .map_err(|e| CacheError::LockError(e.to_string()))
    }

    pub fn stats(&self) -> Option<CacheStats> {
        self.lock().ok().map(|inner| inner.stats.clone())
    }

    /// Evicts the least recently read entry.
    fn evict_lru(inner: &mut CacheInner<T>) {
        let victim = inner
            .entries
            .iter()
            .min_by(|a, b| {
                a.1.last_access
                    .cmp(&b.1.last_access)
                    .then_with(|| a.1.access_count.cmp(&b.1.access_count))
            })
            .map(|(key, _)| key.clone());

        if let Some(key) = victim {
            inner.entries.remove(&key);
            inner.stats.evictions += 1;
            tracing::debug!("Evicted cache entry: {}", key);
        }
    }
}

impl<T> CacheTrait<T> for InmemoryCache<T>
where
    T: Clone + Send + Sync,
{
    fn get(&self, key: &str) -> Option<T> {
        if key.is_empty() {
            tracing::warn!("Attempted to get cache entry with empty key");
            return None;
        }

        let mut inner = match self.lock() {
            Ok(inner) => inner,
            Err(e) => {
                tracing::error!("Cache read for {} failed: {}", key, e);
                return None;
            }
        };

        let expired = inner.entries.get(key).map(|e| e.is_expired(self.ttl));
        match expired {
            Some(false) => {
                inner.stats.hits += 1;
                tracing::debug!("Cache hit for key: {}", key);
                inner.entries.get_mut(key).map(CacheEntry::touch)
            }
            Some(true) => {
                inner.entries.remove(key);
                inner.stats.expirations += 1;
                inner.stats.misses += 1;
                tracing::debug!("Cache entry expired for key: {}", key);
                None
            }
            None => {
                inner.stats.misses += 1;
                tracing::debug!("Cache miss for key: {}", key);
                None
            }
        }
    }

    fn insert(&self, key: String, value: T) -> Result<(), CacheError> {
        if key.is_empty() {
            return Err(CacheError::InvalidKey("key cannot be empty".to_string()));
        }

        let mut inner = self.lock()?;
        if inner.entries.len() >= self.max_size && !inner.entries.contains_key(&key) {
            Self::evict_lru(&mut inner);
        }
        inner.entries.insert(key.clone(), CacheEntry::new(value));
        inner.stats.inserts += 1;
        tracing::debug!("Cached entry: {}", key);
        Ok(())
    }

    fn size(&self) -> usize {
        self.lock().map(|inner| inner.entries.len()).unwrap_or(0)
    }

    fn hit_rate(&self) -> f64 {
        self.stats().map(|s| s.hit_rate()).unwrap_or(0.0)
    }

    fn cleanup_expired(&self) -> usize {
        let mut inner = match self.lock() {
            Ok(inner) => inner,
            Err(e) => {
                tracing::error!("Failed to acquire lock for cache cleanup: {}", e);
                return 0;
            }
        };
        let before = inner.entries.len();
        let ttl = self.ttl;
        inner.entries.retain(|_, entry| !entry.is_expired(ttl));
        let removed = before - inner.entries.len();
        if removed > 0 {
            inner.stats.expirations += removed as u64;
            tracing::debug!("Cleaned up {} expired cache entries", removed);
        }
        removed
    }
}

/// Runs `sweep` every `period` until the task is dropped.
pub async fn run_cleanup<F>(period: Duration, mut sweep: F)
where
    F: FnMut() -> usize + Send,
{
    let mut interval = tokio::time::interval(period);
    loop {
        interval.tick().await;
        let removed = sweep();
        tracing::debug!("Periodic cache cleanup removed {} entries", removed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(max_size: u32, expiration: u32) -> CacheConfig {
        CacheConfig {
            r#type: "memory".to_string(),
            max_size,
            expiration,
        }
    }

    #[test]
    fn test_cache_basic_operations() {
        let cache: InmemoryCache<String> = InmemoryCache::new(&config(3, 3600));

        assert!(cache.insert("25".to_string(), "pikachu".to_string()).is_ok());
        assert_eq!(cache.get("25").as_deref(), Some("pikachu"));
        assert!(cache.get("1").is_none());
        assert_eq!(cache.size(), 1);
        assert_eq!(cache.hit_rate(), 0.5);
    }

    #[test]
    fn test_cache_evicts_least_recently_read() {
        let cache: InmemoryCache<u32> = InmemoryCache::new(&config(2, 3600));

        cache.insert("1".to_string(), 1).unwrap();
        cache.insert("2".to_string(), 2).unwrap();
        // reading 1 makes 2 the eviction candidate
        assert_eq!(cache.get("1"), Some(1));
        cache.insert("3".to_string(), 3).unwrap();

        assert_eq!(cache.stats().unwrap().evictions, 1);
        assert_eq!(cache.get("1"), Some(1));
        assert_eq!(cache.get("2"), None);
        assert_eq!(cache.get("3"), Some(3));
    }

    #[test]
    fn test_zero_expiration_expires_entries() {
        let cache: InmemoryCache<u32> = InmemoryCache::new(&config(10, 0));
        cache.insert("a".to_string(), 1).unwrap();
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.get("a"), None);

        cache.insert("b".to_string(), 2).unwrap();
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.cleanup_expired(), 1);
        assert_eq!(cache.size(), 0);
    }

    #[test]
    fn test_invalid_operations() {
        let cache: InmemoryCache<String> = InmemoryCache::new(&config(10, 3600));
        assert!(matches!(
            cache.insert(String::new(), "x".to_string()),
            Err(CacheError::InvalidKey(_))
        ));
        assert!(cache.get("").is_none());
    }

    #[test]
    fn test_reinserting_a_key_does_not_evict() {
        let cache: InmemoryCache<u32> = InmemoryCache::new(&config(1, 3600));
        cache.insert("a".to_string(), 1).unwrap();
        cache.insert("a".to_string(), 2).unwrap();
        assert_eq!(cache.get("a"), Some(2));
        assert_eq!(cache.size(), 1);
        assert_eq!(cache.stats().unwrap().evictions, 0);
    }
}
