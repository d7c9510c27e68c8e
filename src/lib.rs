//! # placepress
//!
//! Generates a static-site content tree from a relational business
//! directory. The database is the data source: categories become sections,
//! listings become pages nested under them, and the free-form tag column
//! becomes a second navigation axis.
//!
//! # Architecture: One-Shot Pipeline
//!
//! Every invocation is a full rebuild, with no incremental updates and no
//! diffing:
//!
//! ```text
//! 1. Clear      content/ is deleted and its skeleton (c/, t/) recreated
//! 2. Fetch      read-only queries against the HTTP SQL endpoint
//! 3. Render     typed records → TOML front-matter + markdown documents
//! ```
//!
//! For a fixed database snapshot the pipeline is a pure function from
//! dataset to document tree: running it twice produces byte-identical
//! output. The downstream site compiler owns everything after that.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`db`] | Query layer: HTTP SQL execution, named parameter binding, failure-to-empty boundary |
//! | [`types`] | Typed entity records and the explicit row→record field mapping |
//! | [`fetch`] | Entity fetchers: categories, listings, distinct tags, per-category sample |
//! | [`pages`] | Page builders: index, category, listing, and tag documents |
//! | [`site`] | Tree lifecycle: destructive clear, skeleton, builder ordering |
//! | [`slug`] | Display string → URL-safe path segment |
//! | [`frontmatter`] | Insertion-ordered TOML front-matter rendering |
//! | [`output`] | CLI summary formatting |
//!
//! # Design Decisions
//!
//! ## Typed Records Over Row Maps
//!
//! The endpoint returns loosely-typed JSON rows. Those are mapped into
//! fixed records ([`types::Listing`], [`types::Category`]) immediately at
//! the fetch boundary, so page builders never do stringly-typed lookups and
//! a schema drift shows up in one place.
//!
//! ## Degrade, Don't Abort
//!
//! A failed query is indistinguishable from an empty table to everything
//! above the query layer: the affected page renders its empty state and the
//! run keeps going. Only filesystem failures abort, since a non-writable output
//! directory is not something a batch generator can recover from.
//!
//! ## Hand-Rendered Front-Matter
//!
//! The metadata blocks are rendered by a small purpose-built renderer
//! rather than a TOML serializer: field order is part of the output
//! contract and the blocks only ever carry flat scalars, sequences, and one
//! `[extra]` table. Bodies never pass through it.

pub mod db;
pub mod fetch;
pub mod frontmatter;
pub mod output;
pub mod pages;
pub mod site;
pub mod slug;
pub mod types;
