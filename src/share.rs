use crate::domain::ListingWithCategory;
use serde::Serialize;
use url::form_urlencoded::byte_serialize;

/// Targets offered by the share menu on a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareLinks {
    pub url: String,
    pub text: String,
    pub whatsapp: String,
    pub twitter: String,
    pub facebook: String,
    pub email: String,
}

fn encode(s: &str) -> String {
    byte_serialize(s.as_bytes()).collect()
}

pub fn share_links(base_url: &str, item: &ListingWithCategory) -> ShareLinks {
    let url = format!(
        "{}/listings/{}",
        base_url.trim_end_matches('/'),
        item.listing.id
    );
    let text = format!("Check out {} ({})", item.listing.name, item.category.name);

    let (u, t) = (encode(&url), encode(&text));
    ShareLinks {
        whatsapp: format!("https://wa.me/?text={}", encode(&format!("{text} {url}"))),
        twitter: format!("https://twitter.com/intent/tweet?text={t}&url={u}"),
        facebook: format!("https://www.facebook.com/sharer/sharer.php?u={u}"),
        email: format!("mailto:?subject={t}&body={u}"),
        url,
        text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, Listing};

    #[test]
    fn test_links_are_url_encoded() {
        let item = ListingWithCategory {
            listing: Listing {
                id: 4,
                name: "Lake & Boating Club".to_string(),
                description: String::new(),
                address: String::new(),
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
        };

        let links = share_links("https://guide.example.com/", &item);
        assert_eq!(links.url, "https://guide.example.com/listings/4");
        assert!(links.twitter.contains("Lake+%26+Boating+Club"));
        assert!(links
            .facebook
            .ends_with("u=https%3A%2F%2Fguide.example.com%2Flistings%2F4"));
    }
}
