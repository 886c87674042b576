//! Short-lived, per-lister cache of listing results.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

use crate::models::CloudImage;

#[derive(Debug, Clone)]
struct CacheEntry {
    images: Vec<CloudImage>,
    stored_at: Instant,
}

/// Listing results keyed by a provider-prefixed link key.
///
/// Not locked across a fetch: two concurrent misses for the same key both
/// fetch, and the last write wins.
#[derive(Debug)]
pub struct ImageCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl ImageCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Cached images for `key`, if stored less than the TTL ago.
    pub fn get(&self, key: &str) -> Option<Vec<CloudImage>> {
        let entry = self.entries.get(key)?;
        if entry.stored_at.elapsed() < self.ttl {
            debug!(key, count = entry.images.len(), "cache hit");
            Some(entry.images.clone())
        } else {
            None
        }
    }

    pub fn insert(&self, key: String, images: Vec<CloudImage>) {
        self.entries.insert(
            key,
            CacheEntry {
                images,
                stored_at: Instant::now(),
            },
        );
    }

    pub fn remove(&self, key: &str) {
        self.entries.remove(key);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
