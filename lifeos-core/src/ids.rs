//! ID and timestamp helpers for canon documents.
//!
//! Nested collection items use a counting convention rather than UUIDs:
//! the id embeds the first free integer for its array (`principle-7`),
//! so ids read well in YAML diffs and prompt templates.

use chrono::Utc;

/// Extract the first embedded run of digits in an id string.
fn embedded_number(id: &str) -> Option<u64> {
    let digits: String = id
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Singular form of a collection key: `principles` -> `principle`.
pub fn singularize(array_key: &str) -> &str {
    array_key.strip_suffix('s').unwrap_or(array_key)
}

/// Next id for an item in a nested collection.
///
/// Scans existing ids for embedded integers, takes the max plus one, and
/// formats `<singular>-<n>`. An empty collection yields `<singular>-1`.
pub fn next_item_id<'a>(
    existing: impl IntoIterator<Item = &'a str>,
    array_key: &str,
) -> String {
    let max = existing
        .into_iter()
        .filter_map(embedded_number)
        .max()
        .unwrap_or(0);
    format!("{}-{}", singularize(array_key), max + 1)
}

/// Generated id for an append-only record: `conv_1722945600123`.
pub fn timestamp_id(prefix: &str) -> String {
    format!("{prefix}_{}", Utc::now().timestamp_millis())
}

/// Current moment as an ISO-8601 timestamp.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

/// Current date as `YYYY-MM-DD`.
pub fn today_iso() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

/// Derive a file-safe slug from a free-form name.
pub fn sanitize_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
