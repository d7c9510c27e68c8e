//! Typed projections of the source rows.
//!
//! The query endpoint returns loosely-typed JSON rows. Everything downstream
//! of the fetchers works against the fixed records here, populated by an
//! explicit field-mapping step (`from_row`) immediately after a result set
//! arrives, so there are no ad hoc key lookups in the page builders.

use crate::slug::slugify;
use serde_json::Value as Json;

/// One row of a query result, as decoded from the wire.
pub type Row = serde_json::Map<String, Json>;

/// A listing category. `slug` is unique across categories and is used
/// directly as the path segment under `c/`.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: i64,
    pub slug: String,
    pub name: String,
}

impl Category {
    /// Map a row to a category. Returns `None` if a required column is
    /// missing or mistyped; such rows are dropped, not guessed at.
    pub fn from_row(row: &Row) -> Option<Category> {
        Some(Category {
            id: int_field(row, "id")?,
            slug: str_field(row, "slug")?,
            name: str_field(row, "name")?,
        })
    }
}

/// A category with its aggregated listing count, for the index page.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryWithCount {
    pub category: Category,
    pub listing_count: i64,
}

impl CategoryWithCount {
    pub fn from_row(row: &Row) -> Option<CategoryWithCount> {
        Some(CategoryWithCount {
            category: Category::from_row(row)?,
            listing_count: int_field(row, "listing_count").unwrap_or(0),
        })
    }
}

/// A directory listing, joined with its owning category when it has one.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// Parsed from the serialized JSON array in the `tags` column.
    /// Absent, null, or malformed all map to empty.
    pub tags: Vec<String>,
    pub verified: bool,
    pub created_at: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// From the LEFT JOIN with `categories`; `None` for categoryless rows.
    pub category_slug: Option<String>,
    pub category_name: Option<String>,
}

impl Listing {
    /// Map a row to a listing. `id` and `name` are required; everything
    /// else degrades to its empty form.
    pub fn from_row(row: &Row) -> Option<Listing> {
        Some(Listing {
            id: int_field(row, "id")?,
            name: str_field(row, "name")?,
            description: str_field(row, "description"),
            phone: str_field(row, "phone"),
            address: str_field(row, "address"),
            tags: tags_field(row, "tags"),
            verified: bool_field(row, "verified"),
            created_at: str_field(row, "created_at").unwrap_or_default(),
            latitude: float_field(row, "latitude"),
            longitude: float_field(row, "longitude"),
            category_slug: str_field(row, "category_slug"),
            category_name: str_field(row, "category_name"),
        })
    }

    /// Path segment for this listing's directory. Listing slugs are not
    /// unique (the id segment nested underneath disambiguates), but an
    /// empty slug would produce a broken path, so it falls back to the id.
    pub fn dir_slug(&self) -> String {
        let slug = slugify(&self.name);
        if slug.is_empty() {
            self.id.to_string()
        } else {
            slug
        }
    }

    /// Site-absolute path to this listing's page, `None` when the listing
    /// has no category (categoryless listings get no page of their own).
    pub fn page_path(&self) -> Option<String> {
        self.category_slug
            .as_ref()
            .map(|cat| format!("/c/{}/{}/{}/", cat, self.dir_slug(), self.id))
    }
}

fn str_field(row: &Row, key: &str) -> Option<String> {
    match row.get(key) {
        Some(Json::String(s)) => Some(s.clone()),
        _ => None,
    }
}

fn int_field(row: &Row, key: &str) -> Option<i64> {
    row.get(key).and_then(Json::as_i64)
}

fn float_field(row: &Row, key: &str) -> Option<f64> {
    row.get(key).and_then(Json::as_f64)
}

/// Booleans come back as real booleans or 0/1 integers depending on how the
/// source column was declared. Anything else reads as false.
fn bool_field(row: &Row, key: &str) -> bool {
    match row.get(key) {
        Some(Json::Bool(b)) => *b,
        Some(Json::Number(n)) => n.as_i64().unwrap_or(0) != 0,
        _ => false,
    }
}

/// The `tags` column holds a serialized JSON array of strings. Some drivers
/// decode it en route, so an already-parsed array is accepted too.
pub(crate) fn tags_field(row: &Row, key: &str) -> Vec<String> {
    let collect = |items: &[Json]| {
        items
            .iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect()
    };
    match row.get(key) {
        Some(Json::String(raw)) => match serde_json::from_str::<Vec<Json>>(raw) {
            Ok(items) => collect(&items),
            Err(_) => Vec::new(),
        },
        Some(Json::Array(items)) => collect(items),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Json) -> Row {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn category_from_row() {
        let c = Category::from_row(&row(json!({"id": 3, "slug": "food", "name": "Food"}))).unwrap();
        assert_eq!(c.id, 3);
        assert_eq!(c.slug, "food");
        assert_eq!(c.name, "Food");
    }

    #[test]
    fn category_missing_slug_is_dropped() {
        assert!(Category::from_row(&row(json!({"id": 3, "name": "Food"}))).is_none());
    }

    #[test]
    fn listing_from_full_row() {
        let l = Listing::from_row(&row(json!({
            "id": 7,
            "name": "Joe's Diner",
            "description": "Greasy spoon",
            "phone": "555-0100",
            "address": "1 Main St",
            "tags": "[\"lunch\",\"coffee\"]",
            "verified": 1,
            "created_at": "2024-05-01T12:00:00Z",
            "latitude": 52.37,
            "longitude": 4.9,
            "category_slug": "food",
            "category_name": "Food"
        })))
        .unwrap();

        assert_eq!(l.id, 7);
        assert_eq!(l.tags, vec!["lunch", "coffee"]);
        assert!(l.verified);
        assert_eq!(l.latitude, Some(52.37));
        assert_eq!(l.category_slug.as_deref(), Some("food"));
    }

    #[test]
    fn listing_optional_fields_degrade() {
        let l = Listing::from_row(&row(json!({"id": 1, "name": "Bare"}))).unwrap();
        assert_eq!(l.description, None);
        assert_eq!(l.tags, Vec::<String>::new());
        assert!(!l.verified);
        assert_eq!(l.created_at, "");
        assert_eq!(l.category_slug, None);
    }

    #[test]
    fn verified_accepts_bool_and_int() {
        let as_bool = Listing::from_row(&row(json!({"id": 1, "name": "A", "verified": true})));
        let as_int = Listing::from_row(&row(json!({"id": 2, "name": "B", "verified": 0})));
        assert!(as_bool.unwrap().verified);
        assert!(!as_int.unwrap().verified);
    }

    #[test]
    fn tags_accept_predecoded_array() {
        let l = Listing::from_row(&row(json!({"id": 1, "name": "A", "tags": ["wifi"]}))).unwrap();
        assert_eq!(l.tags, vec!["wifi"]);
    }

    #[test]
    fn malformed_tags_are_empty() {
        let l = Listing::from_row(&row(json!({"id": 1, "name": "A", "tags": "not json"}))).unwrap();
        assert!(l.tags.is_empty());
    }

    #[test]
    fn dir_slug_falls_back_to_id() {
        let l = Listing::from_row(&row(json!({"id": 9, "name": "!!!"}))).unwrap();
        assert_eq!(l.dir_slug(), "9");
    }

    #[test]
    fn page_path_requires_category() {
        let mut l = Listing::from_row(&row(json!({"id": 7, "name": "Joe's Diner"}))).unwrap();
        assert_eq!(l.page_path(), None);
        l.category_slug = Some("food".to_string());
        assert_eq!(l.page_path().as_deref(), Some("/c/food/joes-diner/7/"));
    }
}
