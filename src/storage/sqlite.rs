use super::traits::CatalogStore;
use crate::domain::{Category, Listing, ListingWithCategory, NewCategory, NewListing};
use crate::error::{GuideError, Result};
use crate::search::ListingQuery;
use async_trait::async_trait;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

const SCHEMA: &str = r#"
    PRAGMA foreign_keys = ON;
    CREATE TABLE IF NOT EXISTS categories (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        slug        TEXT NOT NULL UNIQUE,
        name        TEXT NOT NULL,
        icon        TEXT NOT NULL DEFAULT '',
        description TEXT NOT NULL DEFAULT ''
    );
    CREATE TABLE IF NOT EXISTS listings (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        name        TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        address     TEXT NOT NULL DEFAULT '',
        phone       TEXT NOT NULL DEFAULT '',
        category_id INTEGER NOT NULL REFERENCES categories(id),
        features    TEXT NOT NULL DEFAULT '[]'
    );
    CREATE INDEX IF NOT EXISTS idx_listings_category_id ON listings(category_id);
"#;

const LISTING_COLUMNS: &str = "l.id, l.name, l.description, l.address, l.phone, l.category_id, l.features, \
     c.id, c.slug, c.name, c.icon, c.description";

/// SQLite-backed catalog. The connection is serialized behind a mutex.
pub struct SqliteCatalog {
    conn: Mutex<Connection>,
}

impl SqliteCatalog {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        info!("Opening catalog database at {}", path.display());
        Self::migrate(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::migrate(Connection::open_in_memory()?)
    }

    fn migrate(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        debug!("Catalog schema is up to date");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| GuideError::Storage {
            message: format!("connection lock poisoned: {e}"),
        })
    }
}

fn category_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(offset)?,
        slug: row.get(offset + 1)?,
        name: row.get(offset + 2)?,
        icon: row.get(offset + 3)?,
        description: row.get(offset + 4)?,
    })
}

fn listing_from_row(row: &Row<'_>) -> rusqlite::Result<ListingWithCategory> {
    Ok(ListingWithCategory {
        listing: Listing {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            address: row.get(3)?,
            phone: row.get(4)?,
            category_id: row.get(5)?,
            features: row.get(6)?,
        },
        category: category_from_row(row, 7)?,
    })
}

/// Constraint failures surface as integrity violations rather than raw database errors.
fn constraint_to_integrity(err: rusqlite::Error, context: String) -> GuideError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation => {
            GuideError::Integrity(context)
        }
        _ => GuideError::Database(err),
    }
}

#[async_trait]
impl CatalogStore for SqliteCatalog {
    async fn categories(&self) -> Result<Vec<Category>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT id, slug, name, icon, description FROM categories ORDER BY id")?;
        let rows = stmt.query_map([], |row| category_from_row(row, 0))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    async fn category_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        let conn = self.lock()?;
        let category = conn
            .query_row(
                "SELECT id, slug, name, icon, description FROM categories WHERE slug = ?1",
                params![slug],
                |row| category_from_row(row, 0),
            )
            .optional()?;
        Ok(category)
    }

    async fn insert_category(&self, category: &NewCategory) -> Result<Category> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO categories (slug, name, icon, description) VALUES (?1, ?2, ?3, ?4)",
            params![
                category.slug,
                category.name,
                category.icon,
                category.description
            ],
        )
        .map_err(|e| {
            constraint_to_integrity(
                e,
                format!("category slug '{}' already exists", category.slug),
            )
        })?;

        let id = conn.last_insert_rowid();
        debug!("Created category: {} with id {}", category.slug, id);
        Ok(Category {
            id,
            slug: category.slug.clone(),
            name: category.name.clone(),
            icon: category.icon.clone(),
            description: category.description.clone(),
        })
    }

    async fn find_listings(&self, query: &ListingQuery) -> Result<Vec<ListingWithCategory>> {
        let sql = format!(
            r"SELECT {LISTING_COLUMNS}
              FROM listings l JOIN categories c ON c.id = l.category_id
              WHERE (?1 IS NULL OR c.slug = ?1)
                AND (?2 IS NULL OR l.name LIKE ?2 ESCAPE '\' OR l.description LIKE ?2 ESCAPE '\')
              ORDER BY {}",
            query.order_by_clause()
        );

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![query.category_slug(), query.like_pattern()],
            listing_from_row,
        )?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    async fn listing_by_id(&self, id: i64) -> Result<Option<ListingWithCategory>> {
        let sql = format!(
            "SELECT {LISTING_COLUMNS} FROM listings l JOIN categories c ON c.id = l.category_id WHERE l.id = ?1"
        );

        let conn = self.lock()?;
        let found = conn
            .query_row(&sql, params![id], listing_from_row)
            .optional()?;
        Ok(found)
    }

    async fn insert_listing(&self, listing: &NewListing) -> Result<ListingWithCategory> {
        let id = {
            let conn = self.lock()?;
            conn.execute(
                "INSERT INTO listings (name, description, address, phone, category_id, features)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    listing.name,
                    listing.description,
                    listing.address,
                    listing.phone,
                    listing.category_id,
                    listing.encoded_features()
                ],
            )
            .map_err(|e| {
                constraint_to_integrity(
                    e,
                    format!(
                        "listing '{}' references missing category {}",
                        listing.name, listing.category_id
                    ),
                )
            })?;
            conn.last_insert_rowid()
        };

        debug!("Created listing: {} with id {}", listing.name, id);
        self.listing_by_id(id).await?.ok_or_else(|| GuideError::Storage {
            message: format!("listing {id} vanished after insert"),
        })
    }

    async fn clear(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch("DELETE FROM listings; DELETE FROM categories;")?;
        info!("Cleared all listings and categories");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SortOrder;

    async fn seeded() -> SqliteCatalog {
        let catalog = SqliteCatalog::open_in_memory().unwrap();
        let hotels = catalog
            .insert_category(&NewCategory {
                slug: "hotels".to_string(),
                name: "Hotels".to_string(),
                icon: "🏨".to_string(),
                description: "Places to stay".to_string(),
            })
            .await
            .unwrap();
        let spots = catalog
            .insert_category(&NewCategory {
                slug: "tourist-spots".to_string(),
                name: "Tourist Spots".to_string(),
                icon: "🏞️".to_string(),
                description: "Things to see".to_string(),
            })
            .await
            .unwrap();

        for (name, description, category_id) in [
            ("Pine View Resort", "Valley facing rooms", hotels.id),
            ("Cedar Lodge", "Cosy wooden cottages", hotels.id),
            ("Echo Point", "Shout into the valley", spots.id),
            ("100% Tea Garden", "Estate walks", spots.id),
        ] {
            catalog
                .insert_listing(&NewListing {
                    name: name.to_string(),
                    description: description.to_string(),
                    address: "Hill Road".to_string(),
                    phone: "000".to_string(),
                    category_id,
                    features: vec!["Parking".to_string()],
                })
                .await
                .unwrap();
        }
        catalog
    }

    #[tokio::test]
    async fn test_filter_by_category_returns_only_that_category() {
        let catalog = seeded().await;
        let found = catalog
            .find_listings(&ListingQuery::new(Some("hotels"), None))
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|l| l.category.slug == "hotels"));
    }

    #[tokio::test]
    async fn test_text_search_is_case_insensitive_over_name_and_description() {
        let catalog = seeded().await;
        let by_name = catalog
            .find_listings(&ListingQuery::new(None, Some("LODGE")))
            .await
            .unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].listing.name, "Cedar Lodge");

        let by_description = catalog
            .find_listings(&ListingQuery::new(None, Some("valley")))
            .await
            .unwrap();
        let names: Vec<_> = by_description.iter().map(|l| l.listing.name.as_str()).collect();
        assert_eq!(names, vec!["Pine View Resort", "Echo Point"]);
    }

    #[tokio::test]
    async fn test_wildcards_in_query_match_literally() {
        let catalog = seeded().await;
        let found = catalog
            .find_listings(&ListingQuery::new(None, Some("%")))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].listing.name, "100% Tea Garden");
    }

    #[tokio::test]
    async fn test_unknown_category_yields_empty() {
        let catalog = seeded().await;
        let found = catalog
            .find_listings(&ListingQuery::new(Some("casinos"), None))
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_sort_by_name() {
        let catalog = seeded().await;
        let found = catalog
            .find_listings(&ListingQuery::new(Some("hotels"), None).sorted(SortOrder::Name))
            .await
            .unwrap();
        assert_eq!(found[0].listing.name, "Cedar Lodge");
        assert_eq!(found[1].listing.name, "Pine View Resort");
    }

    #[tokio::test]
    async fn test_listing_requires_existing_category() {
        let catalog = seeded().await;
        let err = catalog
            .insert_listing(&NewListing {
                name: "Orphan".to_string(),
                description: String::new(),
                address: String::new(),
                phone: String::new(),
                category_id: 999,
                features: vec![],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, GuideError::Integrity(_)));
    }

    #[tokio::test]
    async fn test_duplicate_slug_is_rejected() {
        let catalog = seeded().await;
        let err = catalog
            .insert_category(&NewCategory {
                slug: "hotels".to_string(),
                name: "More Hotels".to_string(),
                icon: String::new(),
                description: String::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, GuideError::Integrity(_)));
    }

    #[tokio::test]
    async fn test_features_are_stored_as_json_string() {
        let catalog = seeded().await;
        let listing = catalog.listing_by_id(1).await.unwrap().unwrap();
        assert_eq!(listing.listing.features, r#"["Parking"]"#);
        assert_eq!(listing.listing.feature_list(), vec!["Parking"]);
    }
}
