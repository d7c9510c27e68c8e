//! Output tree lifecycle.
//!
//! One run is one full rebuild: the previous tree is deleted up front, the
//! fixed top-level directories are recreated, and the page builders run in
//! a fixed order: index, categories (driving the nested listing pages),
//! then tags. Tag and category pages come after listings conceptually
//! because their counts and samples are computed from listing state at read
//! time; nothing is updated incrementally.
//!
//! A failure partway through a builder leaves a partially-populated tree.
//! That is acceptable: the next invocation clears and rebuilds from
//! scratch. Running two instances against the same output root concurrently
//! is unsafe and is the caller's responsibility to avoid; there is no
//! coordination primitive here.

use crate::db::QueryExecutor;
use crate::pages;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Filesystem failures are not recoverable (a non-writable output location
/// stays non-writable) and abort the run. Fetch failures never reach this
/// type, they degrade to empty pages inside the query layer.
#[derive(Error, Debug)]
pub enum SiteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Documents written by one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub categories: usize,
    pub listings: usize,
    pub tags: usize,
}

/// Clear the output tree and rebuild it from the current database state.
pub fn regenerate(db: &dyn QueryExecutor, output_root: &Path) -> Result<RunSummary, SiteError> {
    if output_root.exists() {
        fs::remove_dir_all(output_root)?;
    }
    fs::create_dir_all(output_root.join("c"))?;
    fs::create_dir_all(output_root.join("t"))?;

    pages::build_index(db, output_root)?;
    let (categories, listings) = pages::build_categories(db, output_root)?;
    let tags = pages::build_tags(db, output_root)?;

    Ok(RunSummary {
        categories,
        listings,
        tags,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::FailingDb;
    use tempfile::TempDir;

    #[test]
    fn regenerate_replaces_previous_tree() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("content");
        fs::create_dir_all(root.join("c/stale-category")).unwrap();
        fs::write(root.join("c/stale-category/_index.md"), "old").unwrap();

        regenerate(&FailingDb, &root).unwrap();

        assert!(!root.join("c/stale-category").exists());
        assert!(root.join("c").is_dir());
        assert!(root.join("t").is_dir());
        assert!(root.join("_index.md").is_file());
    }

    #[test]
    fn regenerate_survives_total_fetch_failure() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("content");

        let summary = regenerate(&FailingDb, &root).unwrap();

        assert_eq!(summary, RunSummary::default());
        let index = fs::read_to_string(root.join("_index.md")).unwrap();
        assert!(index.contains(pages::NO_CATEGORIES));
    }
}
