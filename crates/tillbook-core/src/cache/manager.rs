use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::MonthlySummary;
use crate::store::KeyValueStore;
use crate::utils::MonthKey;

/// Prefix that marks a backing-store key as a cache entry.
const CACHE_KEY_PREFIX: &str = "cache.";

/// Entries older than this are evicted on the next read.
const CACHE_TTL_MINUTES: i64 = 5;

/// Entries younger than this do not need a background refresh.
const CACHE_FRESH_SECONDS: i64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub data: T,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            timestamp: Utc::now(),
        }
    }

    pub fn age(&self) -> Duration {
        Utc::now() - self.timestamp
    }

    pub fn age_display(&self) -> String {
        let seconds = self.age().num_seconds();
        if seconds < 60 {
            // Also covers clock skew
            "just now".to_string()
        } else if seconds < 3600 {
            format!("{}m ago", seconds / 60)
        } else {
            format!("{}h ago", seconds / 3600)
        }
    }

    /// True once `ttl` has fully elapsed since the entry was written.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.age() >= ttl
    }
}

/// Passive, TTL-bounded cache over the shared key-value store.
///
/// Nothing is swept in the background: an expired entry is removed the
/// first time it is read. Identical fetches are not coalesced; callers show
/// the cached value and overwrite it when their own fetch completes.
#[derive(Clone)]
pub struct CacheManager {
    store: Arc<dyn KeyValueStore>,
    ttl: Duration,
    fresh_for: Duration,
}

impl CacheManager {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            ttl: Duration::minutes(CACHE_TTL_MINUTES),
            fresh_for: Duration::seconds(CACHE_FRESH_SECONDS),
        }
    }

    fn storage_key(key: &str) -> String {
        format!("{}{}", CACHE_KEY_PREFIX, key)
    }

    /// Store `data` under `key`, replacing any previous entry. Storage
    /// faults are logged, never returned.
    pub fn put<T: Serialize>(&self, key: &str, data: &T) {
        let entry = CacheEntry::new(data);
        let result = serde_json::to_string(&entry)
            .map_err(crate::store::StoreError::from)
            .and_then(|contents| self.store.set(&Self::storage_key(key), &contents));
        if let Err(e) = result {
            warn!(cache = key, error = %e, "Failed to cache data");
        }
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> Option<CacheEntry<T>> {
        let contents = match self.store.get(&Self::storage_key(key)) {
            Ok(Some(contents)) => contents,
            Ok(None) => return None,
            Err(e) => {
                warn!(cache = key, error = %e, "Failed to read cache");
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!(cache = key, error = %e, "Cache entry is corrupt, treating as miss");
                None
            }
        }
    }

    /// The live entry for `key` with its timestamp. Expired entries are
    /// evicted and reported as a miss.
    pub fn get_entry<T: DeserializeOwned>(&self, key: &str) -> Option<CacheEntry<T>> {
        let entry = self.load::<T>(key)?;
        if entry.is_expired(self.ttl) {
            debug!(cache = key, age_secs = entry.age().num_seconds(), "Cache entry expired, evicting");
            self.evict(key);
            return None;
        }
        Some(entry)
    }

    /// Cached data for `key`, or `None` if missing, corrupt or expired.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get_entry(key).map(|entry| entry.data)
    }

    /// True only if `key` was written within the freshness window.
    pub fn is_fresh(&self, key: &str) -> bool {
        self.load::<serde_json::Value>(key)
            .map(|entry| entry.age() < self.fresh_for)
            .unwrap_or(false)
    }

    fn evict(&self, key: &str) {
        if let Err(e) = self.store.remove(&Self::storage_key(key)) {
            warn!(cache = key, error = %e, "Failed to evict cache entry");
        }
    }

    /// Remove every cache entry. Other keys in the backing store are untouched.
    pub fn clear_all(&self) {
        let keys = match self.store.keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "Failed to list cache keys");
                return;
            }
        };

        let mut removed = 0;
        for key in keys.iter().filter(|k| k.starts_with(CACHE_KEY_PREFIX)) {
            match self.store.remove(key) {
                Ok(()) => removed += 1,
                Err(e) => warn!(key = %key, error = %e, "Failed to remove cache entry"),
            }
        }
        debug!(removed, "Cache cleared");
    }

    // ===== Monthly Summary =====

    pub fn summary_key(month: &MonthKey) -> String {
        format!("summary_{}", month.wire_label())
    }

    pub fn load_summary(&self, month: &MonthKey) -> Option<CacheEntry<MonthlySummary>> {
        self.get_entry(&Self::summary_key(month))
    }

    pub fn save_summary(&self, month: &MonthKey, summary: &MonthlySummary) {
        self.put(&Self::summary_key(month), summary)
    }

    pub fn is_summary_fresh(&self, month: &MonthKey) -> bool {
        self.is_fresh(&Self::summary_key(month))
    }
}

// ============================================================================
// Tests
// ============================================================================
