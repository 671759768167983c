pub mod in_memory;
pub mod sqlite;
pub mod traits;

pub use in_memory::InMemoryCatalog;
pub use sqlite::SqliteCatalog;
pub use traits::CatalogStore;
