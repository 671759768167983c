//! Listing filters shared by every catalog backend.
//!
//! Both backends must agree on matching: the category filter compares slugs
//! exactly, the text filter is an ASCII case-insensitive substring match on
//! name or description (the collation SQLite applies to `LIKE`).

use crate::domain::ListingWithCategory;
use serde::Deserialize;

pub const LIKE_ESCAPE: char = '\\';

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Default,
    Name,
    NameDesc,
}

/// Query string of `GET /api/listings`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingQuery {
    pub category: Option<String>,
    pub q: Option<String>,
    #[serde(default)]
    pub sort: SortOrder,
}

impl ListingQuery {
    pub fn new(category: Option<&str>, q: Option<&str>) -> Self {
        Self {
            category: category.map(str::to_string),
            q: q.map(str::to_string),
            sort: SortOrder::Default,
        }
    }

    pub fn sorted(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    /// Category slug to filter by; empty means no filter.
    pub fn category_slug(&self) -> Option<&str> {
        self.category.as_deref().filter(|s| !s.is_empty())
    }

    /// Substring to search for; empty means no filter.
    pub fn text(&self) -> Option<&str> {
        self.q.as_deref().filter(|s| !s.is_empty())
    }

    /// `LIKE` pattern for the text filter, with wildcards in the input escaped.
    pub fn like_pattern(&self) -> Option<String> {
        self.text().map(|q| format!("%{}%", escape_like(q)))
    }

    pub fn matches(&self, item: &ListingWithCategory) -> bool {
        if let Some(slug) = self.category_slug() {
            if item.category.slug != slug {
                return false;
            }
        }

        match self.text() {
            Some(q) => {
                contains_ignore_ascii_case(&item.listing.name, q)
                    || contains_ignore_ascii_case(&item.listing.description, q)
            }
            None => true,
        }
    }

    pub fn order_by_clause(&self) -> &'static str {
        match self.sort {
            SortOrder::Default => "l.id ASC",
            SortOrder::Name => "l.name COLLATE NOCASE ASC, l.id ASC",
            SortOrder::NameDesc => "l.name COLLATE NOCASE DESC, l.id ASC",
        }
    }

    pub fn apply_sort(&self, items: &mut [ListingWithCategory]) {
        match self.sort {
            SortOrder::Default => items.sort_by_key(|i| i.listing.id),
            SortOrder::Name => items.sort_by(|a, b| {
                a.listing
                    .name
                    .to_ascii_lowercase()
                    .cmp(&b.listing.name.to_ascii_lowercase())
                    .then(a.listing.id.cmp(&b.listing.id))
            }),
            SortOrder::NameDesc => items.sort_by(|a, b| {
                b.listing
                    .name
                    .to_ascii_lowercase()
                    .cmp(&a.listing.name.to_ascii_lowercase())
                    .then(a.listing.id.cmp(&b.listing.id))
            }),
        }
    }
}

pub fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if c == '%' || c == '_' || c == LIKE_ESCAPE {
            out.push(LIKE_ESCAPE);
        }
        out.push(c);
    }
    out
}

fn contains_ignore_ascii_case(haystack: &str, needle: &str) -> bool {
    haystack
        .to_ascii_lowercase()
        .contains(&needle.to_ascii_lowercase())
}
