//! In-memory caching using moka
//!
//! Property snapshots (capacity, nightly price, owner) are read on every
//! booking request. They only change through the property endpoints, which
//! invalidate the entry, so a generous TTL is safe.

use moka::future::Cache;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use crate::reservations::models::PropertySnapshot;

/// Application cache holding property snapshots
#[derive(Clone)]
pub struct AppCache {
    /// Property snapshots (property id -> snapshot)
    pub properties: Cache<Uuid, Arc<PropertySnapshot>>,
}

impl AppCache {
    /// Create a new cache instance with configured TTLs
    pub fn new() -> Self {
        Self {
            // Properties: 1000 entries, 30 min TTL, 10 min idle
            properties: Cache::builder()
                .max_capacity(1_000)
                .time_to_live(Duration::from_secs(30 * 60))
                .time_to_idle(Duration::from_secs(10 * 60))
                .build(),
        }
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            properties_size: self.properties.entry_count(),
        }
    }

    /// Invalidate all caches
    pub fn invalidate_all(&self) {
        self.properties.invalidate_all();
        info!("All caches invalidated");
    }

    /// Invalidate a specific property after it was updated or deleted
    pub async fn invalidate_property(&self, property_id: Uuid) {
        self.properties.invalidate(&property_id).await;
        debug!("Cache invalidated for property: {}", property_id);
    }
}

impl Default for AppCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics for the health endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub properties_size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn snapshot(id: Uuid) -> Arc<PropertySnapshot> {
        Arc::new(PropertySnapshot {
            id,
            name: "Yurt".to_string(),
            guests: 2,
            price: dec!(80),
            cover_url: String::new(),
            creator_id: Uuid::new_v4(),
        })
    }

    #[tokio::test]
    async fn test_invalidate_property_removes_entry() {
        let cache = AppCache::new();
        let id = Uuid::new_v4();
        cache.properties.insert(id, snapshot(id)).await;
        assert!(cache.properties.get(&id).await.is_some());

        cache.invalidate_property(id).await;
        assert!(cache.properties.get(&id).await.is_none());
    }
}
