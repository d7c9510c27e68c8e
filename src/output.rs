//! CLI output formatting.
//!
//! Each piece has a `format_*` function (returns `Vec<String>`, pure, no
//! I/O) and a `print_*` wrapper that writes to stdout, so the wording is
//! testable without capturing the stream.

use crate::site::RunSummary;

fn count(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("1 {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

/// Format the end-of-run summary.
///
/// ```text
/// Generated 4 category pages, 31 listing pages, 12 tag pages
/// ```
pub fn format_summary(summary: &RunSummary) -> Vec<String> {
    vec![format!(
        "Generated {}, {}, {}",
        count(summary.categories, "category page"),
        count(summary.listings, "listing page"),
        count(summary.tags, "tag page"),
    )]
}

pub fn print_summary(summary: &RunSummary) {
    for line in format_summary(summary) {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_all_three_page_kinds() {
        let lines = format_summary(&RunSummary {
            categories: 4,
            listings: 31,
            tags: 12,
        });
        assert_eq!(
            lines,
            vec!["Generated 4 category pages, 31 listing pages, 12 tag pages"]
        );
    }

    #[test]
    fn summary_singularizes() {
        let lines = format_summary(&RunSummary {
            categories: 1,
            listings: 1,
            tags: 0,
        });
        assert_eq!(
            lines,
            vec!["Generated 1 category page, 1 listing page, 0 tag pages"]
        );
    }
}
