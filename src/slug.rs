//! URL slug normalization.
//!
//! Every generated path segment (category directories, listing directories,
//! tag directories) is a display string pushed through [`slugify`]. The
//! output alphabet is deliberately narrow (`[a-z0-9-]`) so the downstream
//! site compiler never sees a path it has to escape.

/// Normalize a display string into a URL-safe path segment.
///
/// - Lowercases the input
/// - Drops every character outside lowercase ASCII letters, digits,
///   whitespace, and `-`
/// - Collapses each whitespace run into a single hyphen
/// - Trims leading and trailing hyphens
///
/// Idempotent: `slugify(slugify(x)) == slugify(x)`. The result may be empty
/// (all-symbol input); callers that need a non-empty segment fall back to
/// the entity's id.
pub fn slugify(text: &str) -> String {
    let kept: String = text
        .to_lowercase()
        .chars()
        .filter(|c| {
            c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || *c == '-'
        })
        .collect();

    let mut slug = String::with_capacity(kept.len());
    let mut in_whitespace = false;
    for c in kept.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
            }
            in_whitespace = true;
        } else {
            slug.push(c);
            in_whitespace = false;
        }
    }

    slug.trim_matches('-').to_string()
}
