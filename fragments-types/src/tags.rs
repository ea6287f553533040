//! Tag normalization.
//!
//! Tags are entered as one comma separated string. Before anything is stored
//! or compared the string is lowercased, whitespace around commas is removed,
//! the ends are trimmed and inner whitespace runs collapse to one space.

use once_cell::sync::Lazy;
use regex::Regex;

static COMMA_PADDING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*,\s*").expect("comma padding pattern is valid"));
static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Normalize a raw tag string. Idempotent.
pub fn normalize_tags(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let joined = COMMA_PADDING.replace_all(&lowered, ",");
    WHITESPACE_RUN.replace_all(joined.trim(), " ").into_owned()
}

/// Normalize and split a raw tag string, dropping empty entries.
pub fn parse_tags(raw: &str) -> Vec<String> {
    normalize_tags(raw)
        .split(',')
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}
