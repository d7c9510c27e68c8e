//! Page builders: the documents that make up the content tree.
//!
//! ## Generated documents
//!
//! - **Index** (`_index.md`): every category with its listing count and a
//!   small sample of recent listings, followed by the first tags as links
//! - **Category pages** (`c/<slug>/_index.md`): all listings of a category
//!   with summaries
//! - **Listing pages** (`c/<slug>/<listing-slug>/<id>/index.md`): one full
//!   document per listing; the id segment keeps colliding slugs apart
//! - **Tag pages** (`t/<slug>/index.md`): all listings carrying a tag, each
//!   linking back to its owning category
//!
//! ## Structure
//!
//! Every page is assembled as a [`Document`]: a front-matter block plus an
//! ordered list of body sections. The `render_*` functions are pure (data
//! in, text out) so truncation, escaping, and optional-section logic are
//! testable without touching the filesystem; the `build_*` functions fetch,
//! render, and write.

use crate::db::QueryExecutor;
use crate::fetch::{self, ListingFilter};
use crate::frontmatter::{FrontMatter, Value};
use crate::slug::slugify;
use crate::types::{Category, CategoryWithCount, Listing};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

/// Listings sampled per category on the index page.
pub const INDEX_SAMPLE_CAP: u32 = 3;
/// Tags linked from the index page (lexicographically first).
pub const INDEX_TAG_CAP: usize = 20;
/// Character budget for per-listing summaries on category and tag pages.
pub const SUMMARY_LIMIT: usize = 200;
/// Character budget for a listing page's front-matter description.
pub const META_DESCRIPTION_LIMIT: usize = 160;

pub const NO_CATEGORIES: &str = "No categories have been added yet.";
pub const NO_TAGS: &str = "No tags have been added yet.";
pub const NO_LISTINGS_IN_CATEGORY: &str = "No listings in this category yet.";
pub const NO_LISTINGS_WITH_TAG: &str = "No listings carry this tag yet.";

/// A content document: front-matter plus ordered body sections, separated
/// by blank lines when rendered.
struct Document {
    front_matter: FrontMatter,
    sections: Vec<String>,
}

impl Document {
    fn new(front_matter: FrontMatter) -> Document {
        Document {
            front_matter,
            sections: Vec::new(),
        }
    }

    fn section(&mut self, text: String) {
        self.sections.push(text);
    }

    fn render(&self) -> String {
        let mut out = self.front_matter.render();
        for section in &self.sections {
            out.push('\n');
            out.push_str(section);
            out.push('\n');
        }
        out
    }
}

/// Truncate to `limit` characters, appending `...` only when the input is
/// longer. Cuts on a character boundary; applied before front-matter
/// quoting, so an escape sequence can never be split.
pub fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        text.to_string()
    } else {
        let cut: String = text.chars().take(limit).collect();
        format!("{cut}...")
    }
}

fn count_phrase(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("1 {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

// ============================================================================
// Renderers
// ============================================================================

/// Render the index page: every category with count and sample, then tags.
pub fn render_index(
    categories: &[CategoryWithCount],
    samples: &BTreeMap<String, Vec<Listing>>,
    tags: &[String],
) -> String {
    let mut fm = FrontMatter::new();
    fm.push("title", Value::Str("Directory".to_string()));
    fm.push(
        "description",
        Value::Str("Browse every listing by category or tag".to_string()),
    );
    fm.push("template", Value::Str("index.html".to_string()));
    let mut doc = Document::new(fm);

    if categories.is_empty() {
        doc.section(NO_CATEGORIES.to_string());
    } else {
        doc.section("## Categories".to_string());
        for entry in categories {
            let category = &entry.category;
            let mut lines = vec![format!(
                "### [{}](/c/{}/) ({})",
                category.name,
                category.slug,
                count_phrase(entry.listing_count.max(0) as usize, "listing")
            )];
            if let Some(sample) = samples.get(&category.slug) {
                for listing in sample {
                    if let Some(path) = listing.page_path() {
                        lines.push(format!("- [{}]({})", listing.name, path));
                    }
                }
            }
            if entry.listing_count > i64::from(INDEX_SAMPLE_CAP) {
                lines.push(format!(
                    "\n[View all {} listings](/c/{}/)",
                    entry.listing_count, category.slug
                ));
            }
            doc.section(lines.join("\n"));
        }
    }

    doc.section("## Browse by tag".to_string());
    let tag_links: Vec<String> = tags
        .iter()
        .take(INDEX_TAG_CAP)
        .filter_map(|tag| {
            let slug = slugify(tag);
            (!slug.is_empty()).then(|| format!("[{tag}](/t/{slug}/)"))
        })
        .collect();
    if tag_links.is_empty() {
        doc.section(NO_TAGS.to_string());
    } else {
        doc.section(tag_links.join(" · "));
    }

    doc.render()
}

/// Render a category page: listing count plus a summary per listing, each
/// linking into its page directory (relative, since the listing directories
/// nest under the category's own).
pub fn render_category(category: &Category, listings: &[Listing]) -> String {
    let mut fm = FrontMatter::new();
    fm.push("title", Value::Str(category.name.clone()));
    fm.push(
        "description",
        Value::Str(format!("Listings in the {} category", category.name)),
    );
    fm.push("template", Value::Str("category.html".to_string()));
    fm.push_extra("count", Value::Int(listings.len() as i64));
    let mut doc = Document::new(fm);

    if listings.is_empty() {
        doc.section(NO_LISTINGS_IN_CATEGORY.to_string());
        return doc.render();
    }

    doc.section(format!(
        "{} in this category.",
        count_phrase(listings.len(), "listing")
    ));
    for listing in listings {
        doc.section(listing_summary(
            listing,
            &format!("{}/{}/", listing.dir_slug(), listing.id),
        ));
    }

    doc.render()
}

/// Render one listing page under its owning category.
pub fn render_listing(listing: &Listing, category: &Category) -> String {
    let mut fm = FrontMatter::new();
    fm.push("title", Value::Str(listing.name.clone()));
    fm.push(
        "description",
        Value::Str(truncate(
            listing.description.as_deref().unwrap_or_default(),
            META_DESCRIPTION_LIMIT,
        )),
    );
    fm.push("template", Value::Str("listing.html".to_string()));

    fm.push_extra("name", Value::Str(listing.name.clone()));
    fm.push_extra("category", Value::Str(category.slug.clone()));
    fm.push_extra(
        "phone",
        Value::Str(listing.phone.clone().unwrap_or_default()),
    );
    fm.push_extra(
        "address",
        Value::Str(listing.address.clone().unwrap_or_default()),
    );
    fm.push_extra("tags", Value::Seq(listing.tags.clone()));
    fm.push_extra("verified", Value::Bool(listing.verified));
    fm.push_extra("created_at", Value::Str(listing.created_at.clone()));
    if let Some(latitude) = listing.latitude {
        fm.push_extra("latitude", Value::Float(latitude));
    }
    if let Some(longitude) = listing.longitude {
        fm.push_extra("longitude", Value::Float(longitude));
    }
    let mut doc = Document::new(fm);

    if let Some(description) = &listing.description {
        doc.section(format!("## Description\n\n{description}"));
    }

    let mut contact = Vec::new();
    if let Some(phone) = &listing.phone {
        contact.push(format!("Phone: {phone}"));
    }
    if let Some(address) = &listing.address {
        contact.push(format!("Address: {address}"));
    }
    if !contact.is_empty() {
        doc.section(format!("## Contact\n\n{}", contact.join("\n")));
    }

    let tag_links: Vec<String> = listing
        .tags
        .iter()
        .filter_map(|tag| {
            let slug = slugify(tag);
            (!slug.is_empty()).then(|| format!("[{tag}](/t/{slug}/)"))
        })
        .collect();
    if !tag_links.is_empty() {
        doc.section(format!("## Tags\n\n{}", tag_links.join(" · ")));
    }

    if listing.verified {
        doc.section("**Verified listing**".to_string());
    }

    doc.section(format!(
        "[Back to {}](/c/{}/)",
        category.name, category.slug
    ));

    doc.render()
}

/// Render a tag page: every listing carrying the tag, linked to its page
/// and back to its owning category when it has one.
pub fn render_tag(tag: &str, listings: &[Listing]) -> String {
    let mut fm = FrontMatter::new();
    fm.push("title", Value::Str(tag.to_string()));
    fm.push(
        "description",
        Value::Str(format!("Listings tagged {tag}")),
    );
    fm.push("template", Value::Str("tag.html".to_string()));
    fm.push_extra("count", Value::Int(listings.len() as i64));
    let mut doc = Document::new(fm);

    if listings.is_empty() {
        doc.section(NO_LISTINGS_WITH_TAG.to_string());
        return doc.render();
    }

    doc.section(format!(
        "{} with this tag.",
        count_phrase(listings.len(), "listing")
    ));
    for listing in listings {
        let mut section = match listing.page_path() {
            Some(path) => listing_summary(listing, &path),
            // Categoryless listings have no page of their own: unlinked.
            None => listing_summary_lines(listing, format!("## {}", listing.name)),
        };
        if let (Some(slug), Some(name)) = (&listing.category_slug, &listing.category_name) {
            section.push_str(&format!("\n\nIn [{name}](/c/{slug}/)"));
        }
        doc.section(section);
    }

    doc.render()
}

/// A linked per-listing summary block: heading, truncated description,
/// contact lines.
fn listing_summary(listing: &Listing, href: &str) -> String {
    listing_summary_lines(listing, format!("## [{}]({})", listing.name, href))
}

fn listing_summary_lines(listing: &Listing, heading: String) -> String {
    let mut lines = vec![heading];
    if let Some(description) = &listing.description {
        lines.push(truncate(description, SUMMARY_LIMIT));
    }
    let mut contact = Vec::new();
    if let Some(phone) = &listing.phone {
        contact.push(format!("Phone: {phone}"));
    }
    if let Some(address) = &listing.address {
        contact.push(format!("Address: {address}"));
    }
    if !contact.is_empty() {
        lines.push(contact.join("\n"));
    }
    lines.join("\n\n")
}

// ============================================================================
// Builders
// ============================================================================

/// Fetch and write the index page.
pub fn build_index(db: &dyn QueryExecutor, root: &Path) -> io::Result<()> {
    let categories = fetch::categories_with_counts(db);
    let samples = fetch::sample_listings_per_category(db, INDEX_SAMPLE_CAP);
    let tags = fetch::distinct_tags(db);
    fs::write(
        root.join("_index.md"),
        render_index(&categories, &samples, &tags),
    )?;
    println!("Generated _index.md");
    Ok(())
}

/// Fetch and write every category page and, nested under each, every
/// listing page. Returns `(category pages, listing pages)` written.
pub fn build_categories(db: &dyn QueryExecutor, root: &Path) -> io::Result<(usize, usize)> {
    let categories = fetch::categories(db);
    let mut listing_pages = 0;
    for category in &categories {
        let dir = root.join("c").join(&category.slug);
        fs::create_dir_all(&dir)?;
        let listings = fetch::listings(
            db,
            &ListingFilter::Category(category.slug.clone()),
            None,
        );
        fs::write(dir.join("_index.md"), render_category(category, &listings))?;
        for listing in &listings {
            build_listing(category, listing, &dir)?;
        }
        listing_pages += listings.len();
        println!(
            "Generated c/{}/ ({})",
            category.slug,
            count_phrase(listings.len(), "listing")
        );
    }
    Ok((categories.len(), listing_pages))
}

/// Write one listing page under `<category>/<listing-slug>/<id>/`.
fn build_listing(category: &Category, listing: &Listing, category_dir: &Path) -> io::Result<()> {
    let dir = category_dir
        .join(listing.dir_slug())
        .join(listing.id.to_string());
    fs::create_dir_all(&dir)?;
    fs::write(dir.join("index.md"), render_listing(listing, category))
}

/// Fetch and write every tag page. Returns the number written. Tags whose
/// slug normalizes to nothing are skipped; there is no path to put them at.
pub fn build_tags(db: &dyn QueryExecutor, root: &Path) -> io::Result<usize> {
    let tags = fetch::distinct_tags(db);
    let mut written = 0;
    for tag in &tags {
        let slug = slugify(tag);
        if slug.is_empty() {
            continue;
        }
        let dir = root.join("t").join(&slug);
        fs::create_dir_all(&dir)?;
        let listings = fetch::listings(db, &ListingFilter::Tag(tag.clone()), None);
        fs::write(dir.join("index.md"), render_tag(tag, &listings))?;
        written += 1;
    }
    println!("Generated {}", count_phrase(written, "tag page"));
    Ok(written)
}

// ============================================================================
// Tests
// ============================================================================
