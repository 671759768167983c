use super::traits::CatalogStore;
use crate::domain::{Category, Listing, ListingWithCategory, NewCategory, NewListing};
use crate::error::{GuideError, Result};
use crate::search::ListingQuery;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

#[derive(Default)]
struct Tables {
    categories: BTreeMap<i64, Category>,
    listings: BTreeMap<i64, Listing>,
    next_category_id: i64,
    next_listing_id: i64,
}

/// In-memory catalog for development/testing
#[derive(Default)]
pub struct InMemoryCatalog {
    tables: Mutex<Tables>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables.lock().map_err(|e| GuideError::Storage {
            message: format!("catalog lock poisoned: {e}"),
        })
    }
}

impl Tables {
    fn join(&self, listing: &Listing) -> Option<ListingWithCategory> {
        self.categories
            .get(&listing.category_id)
            .map(|category| ListingWithCategory {
                listing: listing.clone(),
                category: category.clone(),
            })
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn categories(&self) -> Result<Vec<Category>> {
        let tables = self.lock()?;
        Ok(tables.categories.values().cloned().collect())
    }

    async fn category_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        let tables = self.lock()?;
        Ok(tables.categories.values().find(|c| c.slug == slug).cloned())
    }

    async fn insert_category(&self, category: &NewCategory) -> Result<Category> {
        let mut tables = self.lock()?;
        if tables.categories.values().any(|c| c.slug == category.slug) {
            return Err(GuideError::Integrity(format!(
                "category slug '{}' already exists",
                category.slug
            )));
        }

        tables.next_category_id += 1;
        let created = Category {
            id: tables.next_category_id,
            slug: category.slug.clone(),
            name: category.name.clone(),
            icon: category.icon.clone(),
            description: category.description.clone(),
        };
        tables.categories.insert(created.id, created.clone());

        debug!("Created category: {} with id {}", created.slug, created.id);
        Ok(created)
    }

    async fn find_listings(&self, query: &ListingQuery) -> Result<Vec<ListingWithCategory>> {
        let tables = self.lock()?;
        let mut found: Vec<ListingWithCategory> = tables
            .listings
            .values()
            .filter_map(|l| tables.join(l))
            .filter(|item| query.matches(item))
            .collect();
        query.apply_sort(&mut found);
        Ok(found)
    }

    async fn listing_by_id(&self, id: i64) -> Result<Option<ListingWithCategory>> {
        let tables = self.lock()?;
        Ok(tables.listings.get(&id).and_then(|l| tables.join(l)))
    }

    async fn insert_listing(&self, listing: &NewListing) -> Result<ListingWithCategory> {
        let mut tables = self.lock()?;
        let category = tables
            .categories
            .get(&listing.category_id)
            .cloned()
            .ok_or_else(|| {
                GuideError::Integrity(format!(
                    "listing '{}' references missing category {}",
                    listing.name, listing.category_id
                ))
            })?;

        tables.next_listing_id += 1;
        let created = Listing {
            id: tables.next_listing_id,
            name: listing.name.clone(),
            description: listing.description.clone(),
            address: listing.address.clone(),
            phone: listing.phone.clone(),
            category_id: listing.category_id,
            features: listing.encoded_features(),
        };
        tables.listings.insert(created.id, created.clone());

        debug!("Created listing: {} with id {}", created.name, created.id);
        Ok(ListingWithCategory {
            listing: created,
            category,
        })
    }

    async fn clear(&self) -> Result<()> {
        let mut tables = self.lock()?;
        *tables = Tables::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SortOrder;
    use crate::seed::{apply, default_seed};
    use crate::storage::SqliteCatalog;

    fn hotels() -> NewCategory {
        NewCategory {
            slug: "hotels".to_string(),
            name: "Hotels".to_string(),
            icon: "🏨".to_string(),
            description: "Places to stay".to_string(),
        }
    }

    fn listing(name: &str, category_id: i64) -> NewListing {
        NewListing {
            name: name.to_string(),
            description: "Valley facing rooms".to_string(),
            address: "Hill Road".to_string(),
            phone: "000".to_string(),
            category_id,
            features: vec!["Parking".to_string()],
        }
    }

    #[tokio::test]
    async fn test_duplicate_slug_is_integrity_error() {
        let catalog = InMemoryCatalog::new();
        catalog.insert_category(&hotels()).await.unwrap();

        let err = catalog.insert_category(&hotels()).await.unwrap_err();
        assert!(matches!(err, GuideError::Integrity(_)));
        assert_eq!(catalog.categories().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_listing_needs_existing_category() {
        let catalog = InMemoryCatalog::new();
        let err = catalog
            .insert_listing(&listing("Orphan Inn", 99))
            .await
            .unwrap_err();
        assert!(matches!(err, GuideError::Integrity(_)));
        assert!(catalog
            .find_listings(&ListingQuery::default())
            .await
            .unwrap()
            .is_empty());

        let category = catalog.insert_category(&hotels()).await.unwrap();
        let created = catalog
            .insert_listing(&listing("Pine View Resort", category.id))
            .await
            .unwrap();
        assert_eq!(created.category.slug, "hotels");
        assert_eq!(created.listing.features, r#"["Parking"]"#);
    }

    #[tokio::test]
    async fn test_clear_resets_ids() {
        let catalog = InMemoryCatalog::new();
        catalog.insert_category(&hotels()).await.unwrap();
        catalog.clear().await.unwrap();

        let again = catalog.insert_category(&hotels()).await.unwrap();
        assert_eq!(again.id, 1);
    }

    #[tokio::test]
    async fn test_matches_sqlite_for_same_queries() {
        let memory = InMemoryCatalog::new();
        let sqlite = SqliteCatalog::open_in_memory().unwrap();
        let seed = default_seed();
        apply(&memory, &seed).await.unwrap();
        apply(&sqlite, &seed).await.unwrap();

        assert_eq!(
            memory.categories().await.unwrap(),
            sqlite.categories().await.unwrap()
        );

        let queries = [
            ListingQuery::default(),
            ListingQuery::new(Some("hotels"), None),
            ListingQuery::new(Some("emergency-services"), Some("24X7")),
            ListingQuery::new(None, Some("VALLEY")),
            ListingQuery::new(None, Some("%")),
            ListingQuery::new(Some("casinos"), None),
            ListingQuery::new(Some(""), Some("")),
            ListingQuery::new(None, None).sorted(SortOrder::Name),
            ListingQuery::new(Some("tourist-spots"), None).sorted(SortOrder::NameDesc),
        ];
        for query in &queries {
            let expected = sqlite.find_listings(query).await.unwrap();
            let actual = memory.find_listings(query).await.unwrap();
            assert_eq!(actual, expected, "query {query:?}");
        }

        for id in [1, 5, 9, 42] {
            assert_eq!(
                memory.listing_by_id(id).await.unwrap(),
                sqlite.listing_by_id(id).await.unwrap()
            );
        }
    }
}
