//! Entity fetchers: the read operations the page builders are written
//! against.
//!
//! Each fetcher composes exactly one query from the [`sql`] catalog, runs it
//! through the query layer, and maps the rows into the typed records from
//! [`crate::types`]. Joins that the source schema doesn't store (listings ↔
//! tags) are completed client-side. Per the query layer's failure policy, a
//! failed fetch comes back as "no entities".

use crate::db::{self, QueryExecutor};
use crate::types::{self, Category, CategoryWithCount, Listing};
use serde_json::{Value as Json, json};
use std::collections::{BTreeMap, BTreeSet};

/// The query catalog. SQLite dialect; the `tags` column is a JSON array
/// queried with `json_each`. Kept public so the integration suite can
/// dispatch its in-memory executor on the exact statements.
pub mod sql {
    pub const CATEGORIES: &str = "\
SELECT id, slug, name
FROM categories
ORDER BY name";

    pub const CATEGORIES_WITH_COUNTS: &str = "\
SELECT c.id, c.slug, c.name, COUNT(l.id) AS listing_count
FROM categories c
LEFT JOIN listings l ON l.category_id = c.id
GROUP BY c.id, c.slug, c.name
ORDER BY c.name";

    pub const LISTINGS: &str = "\
SELECT l.id, l.name, l.description, l.phone, l.address, l.tags,
       l.verified, l.created_at, l.latitude, l.longitude,
       c.slug AS category_slug, c.name AS category_name
FROM listings l
LEFT JOIN categories c ON c.id = l.category_id
ORDER BY l.created_at DESC";

    pub const LISTINGS_BY_CATEGORY: &str = "\
SELECT l.id, l.name, l.description, l.phone, l.address, l.tags,
       l.verified, l.created_at, l.latitude, l.longitude,
       c.slug AS category_slug, c.name AS category_name
FROM listings l
JOIN categories c ON c.id = l.category_id
WHERE c.slug = :slug
ORDER BY l.name";

    pub const LISTINGS_BY_TAG: &str = "\
SELECT l.id, l.name, l.description, l.phone, l.address, l.tags,
       l.verified, l.created_at, l.latitude, l.longitude,
       c.slug AS category_slug, c.name AS category_name
FROM listings l
LEFT JOIN categories c ON c.id = l.category_id
WHERE EXISTS (SELECT 1 FROM json_each(l.tags) t WHERE t.value = :tag)
ORDER BY l.created_at DESC";

    pub const LISTING_BY_ID: &str = "\
SELECT l.id, l.name, l.description, l.phone, l.address, l.tags,
       l.verified, l.created_at, l.latitude, l.longitude,
       c.slug AS category_slug, c.name AS category_name
FROM listings l
LEFT JOIN categories c ON c.id = l.category_id
WHERE l.id = :id";

    /// Tag columns only; flattening and de-duplication happen client-side.
    pub const LISTING_TAGS: &str = "\
SELECT tags
FROM listings
WHERE tags IS NOT NULL";

    /// Ranking window instead of one query per category. The inner JOIN is
    /// deliberate: categoryless listings are never sampled. The id
    /// tiebreaker keeps the window deterministic for equal timestamps.
    pub const SAMPLE_PER_CATEGORY: &str = "\
SELECT * FROM (
  SELECT l.id, l.name, l.description, l.phone, l.address, l.tags,
         l.verified, l.created_at, l.latitude, l.longitude,
         c.slug AS category_slug, c.name AS category_name,
         ROW_NUMBER() OVER (
           PARTITION BY l.category_id
           ORDER BY l.created_at DESC, l.id DESC
         ) AS category_rank
  FROM listings l
  JOIN categories c ON c.id = l.category_id
)
WHERE category_rank <= :cap";
}

/// How a listing fetch is scoped.
#[derive(Debug, Clone, PartialEq)]
pub enum ListingFilter {
    All,
    Category(String),
    Tag(String),
    Id(i64),
}

/// All categories, ordered by name.
pub fn categories(db: &dyn QueryExecutor) -> Vec<Category> {
    db::run_query(db, sql::CATEGORIES, &[])
        .iter()
        .filter_map(Category::from_row)
        .collect()
}

/// All categories with their listing counts, ordered by name.
pub fn categories_with_counts(db: &dyn QueryExecutor) -> Vec<CategoryWithCount> {
    db::run_query(db, sql::CATEGORIES_WITH_COUNTS, &[])
        .iter()
        .filter_map(CategoryWithCount::from_row)
        .collect()
}

/// Listings under the given filter, joined with their owning category.
///
/// Ordered by recency (`created_at` descending), except the by-category
/// variant which orders by listing name. `limit` is bound as a named
/// parameter, never spliced in as a value.
pub fn listings(
    db: &dyn QueryExecutor,
    filter: &ListingFilter,
    limit: Option<u32>,
) -> Vec<Listing> {
    let (base, mut params): (&str, Vec<(&str, Json)>) = match filter {
        ListingFilter::All => (sql::LISTINGS, Vec::new()),
        ListingFilter::Category(slug) => (sql::LISTINGS_BY_CATEGORY, vec![("slug", json!(slug))]),
        ListingFilter::Tag(tag) => (sql::LISTINGS_BY_TAG, vec![("tag", json!(tag))]),
        ListingFilter::Id(id) => (sql::LISTING_BY_ID, vec![("id", json!(id))]),
    };

    let mut text = base.to_string();
    if let Some(n) = limit {
        text.push_str("\nLIMIT :limit");
        params.push(("limit", json!(n)));
    }

    db::run_query(db, &text, &params)
        .iter()
        .filter_map(Listing::from_row)
        .collect()
}

/// Every distinct tag across all listings, sorted lexicographically.
///
/// The tag arrays are flattened and de-duplicated here rather than in SQL;
/// identity is the exact string value.
pub fn distinct_tags(db: &dyn QueryExecutor) -> Vec<String> {
    let rows = db::run_query(db, sql::LISTING_TAGS, &[]);
    let mut tags = BTreeSet::new();
    for row in &rows {
        tags.extend(types::tags_field(row, "tags"));
    }
    tags.into_iter().collect()
}

/// The `cap` most recent listings of every category, grouped by category
/// slug for O(1) lookup while the index renders. One windowed query, not
/// one query per category.
pub fn sample_listings_per_category(
    db: &dyn QueryExecutor,
    cap: u32,
) -> BTreeMap<String, Vec<Listing>> {
    let rows = db::run_query(db, sql::SAMPLE_PER_CATEGORY, &[("cap", json!(cap))]);
    let mut grouped: BTreeMap<String, Vec<Listing>> = BTreeMap::new();
    for listing in rows.iter().filter_map(Listing::from_row) {
        if let Some(slug) = listing.category_slug.clone() {
            grouped.entry(slug).or_default().push(listing);
        }
    }
    grouped
}
