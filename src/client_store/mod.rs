//! Client-local persistence: the key/value store behind offline mode and analytics.

pub mod analytics;
pub mod kv;
pub mod offline;

pub use analytics::{Analytics, AnalyticsEvent, ANALYTICS_KEY, MAX_EVENTS};
pub use kv::{FileStore, LocalStore, MemoryStore};
pub use offline::{OfflineCache, OfflineSnapshot, OFFLINE_KEY};
