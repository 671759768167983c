//! Catalog seeding.
//!
//! A seed file is JSON of the form
//! `{"categories": [{"slug", "name", "icon", "description", "listings": [...]}]}`
//! where each listing omits `categoryId`; it is taken from the enclosing category.

use crate::domain::{NewCategory, NewListing};
use crate::error::Result;
use crate::storage::CatalogStore;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct SeedFile {
    pub categories: Vec<SeedCategory>,
}

#[derive(Debug, Deserialize)]
pub struct SeedCategory {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub listings: Vec<SeedListing>,
}

#[derive(Debug, Deserialize)]
pub struct SeedListing {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub features: Vec<String>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub categories: usize,
    pub listings: usize,
}

impl SeedFile {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Insert every category and its listings. Categories whose slug already exists are skipped
/// along with their listings, so seeding twice is harmless.
pub async fn apply(store: &dyn CatalogStore, seed: &SeedFile) -> Result<SeedSummary> {
    let mut summary = SeedSummary::default();

    for cat in &seed.categories {
        if store.category_by_slug(&cat.slug).await?.is_some() {
            info!("Category '{}' already present, skipping", cat.slug);
            continue;
        }

        let category = store
            .insert_category(&NewCategory {
                slug: cat.slug.clone(),
                name: cat.name.clone(),
                icon: cat.icon.clone(),
                description: cat.description.clone(),
            })
            .await?;
        summary.categories += 1;

        for l in &cat.listings {
            store
                .insert_listing(&NewListing {
                    name: l.name.clone(),
                    description: l.description.clone(),
                    address: l.address.clone(),
                    phone: l.phone.clone(),
                    category_id: category.id,
                    features: l.features.clone(),
                })
                .await?;
            summary.listings += 1;
        }
    }

    info!(
        "Seeded {} categories and {} listings",
        summary.categories, summary.listings
    );
    Ok(summary)
}

fn listing(name: &str, description: &str, address: &str, phone: &str, features: &[&str]) -> SeedListing {
    SeedListing {
        name: name.to_string(),
        description: description.to_string(),
        address: address.to_string(),
        phone: phone.to_string(),
        features: features.iter().map(|f| f.to_string()).collect(),
    }
}

/// Built-in catalog used when no seed file is given.
pub fn default_seed() -> SeedFile {
    SeedFile {
        categories: vec![
            SeedCategory {
                slug: "hotels".to_string(),
                name: "Hotels".to_string(),
                icon: "🏨".to_string(),
                description: "Resorts, lodges and homestays".to_string(),
                listings: vec![
                    listing(
                        "Pine View Resort",
                        "Valley facing rooms with a heated dining hall",
                        "12 Mall Road",
                        "+91 98160 11111",
                        &["WiFi", "Parking", "Room Heater"],
                    ),
                    listing(
                        "Cedar Lodge",
                        "Wooden cottages under the deodar forest",
                        "Forest Lane, Upper Bazaar",
                        "+91 98160 22222",
                        &["Bonfire", "Breakfast"],
                    ),
                    listing(
                        "Cloud Nine Homestay",
                        "Family run homestay with local cuisine",
                        "Village Road, Near Old Church",
                        "+91 98160 33333",
                        &["Home Food", "Garden"],
                    ),
                ],
            },
            SeedCategory {
                slug: "tourist-spots".to_string(),
                name: "Tourist Spots".to_string(),
                icon: "🏞️".to_string(),
                description: "Viewpoints, lakes, waterfalls and trails".to_string(),
                listings: vec![
                    listing(
                        "Sunset Point",
                        "Ridge top viewpoint over the valley",
                        "Ridge Road",
                        "",
                        &["Viewpoint", "Photography"],
                    ),
                    listing(
                        "Silver Falls",
                        "Seasonal waterfall, best during the monsoon",
                        "Falls Trail, 4 km from bus stand",
                        "",
                        &["Trek", "Picnic"],
                    ),
                    listing(
                        "Lake Boating Club",
                        "Paddle and row boats on the town lake",
                        "Lake Side",
                        "+91 98160 44444",
                        &["Boating", "Snacks"],
                    ),
                ],
            },
            SeedCategory {
                slug: "emergency-services".to_string(),
                name: "Emergency Services".to_string(),
                icon: "🚑".to_string(),
                description: "Hospitals, police and rescue".to_string(),
                listings: vec![
                    listing(
                        "Civil Hospital",
                        "24x7 emergency ward and ambulance",
                        "Hospital Road",
                        "108",
                        &["24x7", "Ambulance"],
                    ),
                    listing(
                        "Town Police Station",
                        "Tourist help desk and lost and found",
                        "Main Chowk",
                        "112",
                        &["24x7", "Tourist Help"],
                    ),
                    listing(
                        "Mountain Rescue Team",
                        "Search and rescue for trekkers",
                        "Near Helipad",
                        "+91 98160 55555",
                        &["Rescue", "First Aid"],
                    ),
                ],
            },
        ],
    }
}
