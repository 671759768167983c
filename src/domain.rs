use serde::{Deserialize, Serialize};

/// A named grouping of listings, identified by a unique slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub icon: String,
    pub description: String,
}

/// A single point of interest (hotel, spot, service) belonging to one category.
///
/// `features` holds a JSON-encoded array of strings exactly as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub address: String,
    pub phone: String,
    pub category_id: i64,
    pub features: String,
}

impl Listing {
    /// Decoded feature names. A malformed features string decodes to nothing.
    pub fn feature_list(&self) -> Vec<String> {
        serde_json::from_str(&self.features).unwrap_or_default()
    }
}

/// Listing as returned by the listings route, with its category embedded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingWithCategory {
    #[serde(flatten)]
    pub listing: Listing,
    pub category: Category,
}

/// Input for creating a category; the store assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCategory {
    pub slug: String,
    pub name: String,
    pub icon: String,
    pub description: String,
}

/// Input for creating a listing under an existing category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewListing {
    pub name: String,
    pub description: String,
    pub address: String,
    pub phone: String,
    pub category_id: i64,
    #[serde(default)]
    pub features: Vec<String>,
}

impl NewListing {
    pub fn encoded_features(&self) -> String {
        serde_json::to_string(&self.features).unwrap_or_else(|_| "[]".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(features: &str) -> Listing {
        Listing {
            id: 1,
            name: "Pine View Resort".to_string(),
            description: "Rooms with a valley view".to_string(),
            address: "Mall Road".to_string(),
            phone: "+91 1234 567890".to_string(),
            category_id: 1,
            features: features.to_string(),
        }
    }

    #[test]
    fn test_feature_list_decodes_json_array() {
        let l = listing(r#"["WiFi","Parking"]"#);
        assert_eq!(l.feature_list(), vec!["WiFi", "Parking"]);
    }

    #[test]
    fn test_feature_list_tolerates_malformed_string() {
        assert!(listing("WiFi, Parking").feature_list().is_empty());
    }

    #[test]
    fn test_listing_with_category_serializes_camel_case() {
        let item = ListingWithCategory {
            listing: listing("[]"),
            category: Category {
                id: 1,
                slug: "hotels".to_string(),
                name: "Hotels".to_string(),
                icon: "🏨".to_string(),
                description: "Places to stay".to_string(),
            },
        };

        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["categoryId"], 1);
        assert_eq!(value["features"], "[]");
        assert_eq!(value["category"]["slug"], "hotels");
    }
}
