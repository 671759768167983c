use crate::domain::{Category, ListingWithCategory, NewCategory, NewListing};
use crate::error::Result;
use crate::search::ListingQuery;
use async_trait::async_trait;

/// Storage trait for the listings catalog
#[async_trait]
pub trait CatalogStore: Send + Sync {
    // Category operations
    async fn categories(&self) -> Result<Vec<Category>>;
    async fn category_by_slug(&self, slug: &str) -> Result<Option<Category>>;
    async fn insert_category(&self, category: &NewCategory) -> Result<Category>;

    // Listing operations
    async fn find_listings(&self, query: &ListingQuery) -> Result<Vec<ListingWithCategory>>;
    async fn listing_by_id(&self, id: i64) -> Result<Option<ListingWithCategory>>;
    async fn insert_listing(&self, listing: &NewListing) -> Result<ListingWithCategory>;

    /// Remove every listing and category.
    async fn clear(&self) -> Result<()>;
}
