//! In-memory cache for one-shot generations.
//!
//! An explicit object constructed at startup and handed to whichever
//! handler needs it — no module-level singleton. Entries expire after a
//! TTL (checked lazily on read) and the entry count is bounded; inserting
//! past capacity evicts the oldest entry. Process-local and lost on
//! restart, which is fine for a development cache.

use std::collections::HashMap;
use std::time::{Duration, Instant};

const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);
const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    inserted_at: Instant,
}

/// TTL + capacity bounded generation cache.
#[derive(Debug)]
pub struct GenerationCache {
    entries: HashMap<String, CacheEntry>,
    ttl: Duration,
    capacity: usize,
}

impl Default for GenerationCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_CAPACITY)
    }
}

impl GenerationCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            capacity,
        }
    }

    /// Look up a cached generation, expiring it if the TTL has passed.
    pub fn get(&mut self, key: &str) -> Option<String> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.inserted_at.elapsed() >= self.ttl,
            None => return None,
        };
        if expired {
            self.entries.remove(key);
            return None;
        }
        self.entries.get(key).map(|e| e.value.clone())
    }

    /// Insert a generation, evicting the oldest entry when full.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.inserted_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                self.entries.remove(&oldest);
            }
        }
        self.entries.insert(
            key,
            CacheEntry {
                value: value.into(),
                inserted_at: Instant::now(),
            },
        );
    }

    /// Number of live entries (expired entries may still be counted until
    /// the next read touches them).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_within_ttl() {
        let mut cache = GenerationCache::new(Duration::from_secs(60), 8);
        cache.insert("k", "v");
        assert_eq!(cache.get("k"), Some("v".to_string()));
    }

    #[test]
    fn test_expired_entry_is_dropped_on_read() {
        let mut cache = GenerationCache::new(Duration::ZERO, 8);
        cache.insert("k", "v");
        assert_eq!(cache.get("k"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut cache = GenerationCache::new(Duration::from_secs(60), 2);
        cache.insert("first", "1");
        cache.insert("second", "2");
        cache.insert("third", "3");

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("first"), None);
        assert_eq!(cache.get("second"), Some("2".to_string()));
        assert_eq!(cache.get("third"), Some("3".to_string()));
    }

    #[test]
    fn test_reinsert_refreshes_existing_key() {
        let mut cache = GenerationCache::new(Duration::from_secs(60), 2);
        cache.insert("a", "1");
        cache.insert("b", "2");
        // Re-inserting a present key must not evict anything.
        cache.insert("a", "updated");

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a"), Some("updated".to_string()));
        assert_eq!(cache.get("b"), Some("2".to_string()));
    }
}
