//! Canonical substance name keys.
//!
//! A normalized key is the lowercase ASCII alphanumeric residue of a raw name.
//! Two raw names with the same key are the same substance. An empty key means
//! "no key" and must never be cached or matched under.

/// Normalize a raw substance name into its cache/match key.
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .map(|c| c.to_ascii_lowercase())
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// Normalize an optional name; `None` yields the empty key.
pub fn normalize_opt(raw: Option<&str>) -> String {
    raw.map(normalize).unwrap_or_default()
}
