use super::kv::LocalStore;
use crate::domain::ListingWithCategory;
use crate::error::Result;
use crate::search::ListingQuery;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

pub const OFFLINE_KEY: &str = "offline_data";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfflineSnapshot {
    pub saved_at: DateTime<Utc>,
    pub listings: Vec<ListingWithCategory>,
}

/// Listings cached under `offline_data` plus the current connectivity flag.
pub struct OfflineCache {
    store: Arc<dyn LocalStore>,
    online: AtomicBool,
}

impl OfflineCache {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self {
            store,
            online: AtomicBool::new(true),
        }
    }

    pub fn save(&self, listings: Vec<ListingWithCategory>) -> Result<OfflineSnapshot> {
        let snapshot = OfflineSnapshot {
            saved_at: Utc::now(),
            listings,
        };
        self.store
            .set(OFFLINE_KEY, &serde_json::to_value(&snapshot)?)?;
        Ok(snapshot)
    }

    pub fn load(&self) -> Result<Option<OfflineSnapshot>> {
        Ok(self
            .store
            .get(OFFLINE_KEY)?
            .and_then(|v| serde_json::from_value(v).ok()))
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Relaxed)
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::Relaxed);
    }

    /// Snapshot listings filtered and sorted like a live query.
    /// `None` while online, or offline with nothing saved.
    pub fn offline_listings(&self, query: &ListingQuery) -> Result<Option<Vec<ListingWithCategory>>> {
        if self.is_online() {
            return Ok(None);
        }
        let Some(snapshot) = self.load()? else {
            return Ok(None);
        };
        debug!("Serving offline snapshot saved at {}", snapshot.saved_at);

        let mut found: Vec<_> = snapshot
            .listings
            .into_iter()
            .filter(|l| query.matches(l))
            .collect();
        query.apply_sort(&mut found);
        Ok(Some(found))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client_store::MemoryStore;
    use crate::domain::{Category, Listing};
    use crate::search::SortOrder;

    fn sample() -> ListingWithCategory {
        named(7, "Sunset Point")
    }

    fn named(id: i64, name: &str) -> ListingWithCategory {
        ListingWithCategory {
            listing: Listing {
                id,
                name: name.to_string(),
                description: "Ridge top viewpoint".to_string(),
                address: "Ridge Road".to_string(),
                phone: String::new(),
                category_id: 2,
                features: "[]".to_string(),
            },
            category: Category {
                id: 2,
                slug: "tourist-spots".to_string(),
                name: "Tourist Spots".to_string(),
                icon: String::new(),
                description: String::new(),
            },
        }
    }

    #[test]
    fn test_snapshot_survives_reload() {
        let store: Arc<dyn LocalStore> = Arc::new(MemoryStore::new());
        OfflineCache::new(store.clone()).save(vec![sample()]).unwrap();

        let loaded = OfflineCache::new(store).load().unwrap().unwrap();
        assert_eq!(loaded.listings, vec![sample()]);
    }

    #[test]
    fn test_connectivity_toggle() {
        let cache = OfflineCache::new(Arc::new(MemoryStore::new()));
        assert!(cache.is_online());
        cache.set_online(false);
        assert!(!cache.is_online());
        assert_eq!(cache.load().unwrap(), None);
    }

    #[test]
    fn test_snapshot_is_served_only_when_offline() {
        let cache = OfflineCache::new(Arc::new(MemoryStore::new()));
        cache
            .save(vec![sample(), named(3, "Lake Boating Club"), named(5, "echo valley")])
            .unwrap();

        let query = ListingQuery::new(Some("tourist-spots"), None).sorted(SortOrder::Name);
        assert_eq!(cache.offline_listings(&query).unwrap(), None);

        cache.set_online(false);
        let names: Vec<_> = cache
            .offline_listings(&query)
            .unwrap()
            .unwrap()
            .into_iter()
            .map(|l| l.listing.name)
            .collect();
        assert_eq!(names, ["echo valley", "Lake Boating Club", "Sunset Point"]);

        let by_text = cache
            .offline_listings(&ListingQuery::new(None, Some("LAKE")))
            .unwrap()
            .unwrap();
        assert_eq!(by_text.len(), 1);
    }

    #[test]
    fn test_offline_without_snapshot_is_none() {
        let cache = OfflineCache::new(Arc::new(MemoryStore::new()));
        cache.set_online(false);
        assert_eq!(cache.offline_listings(&ListingQuery::default()).unwrap(), None);
    }
}
