//! Brand, bag-type, condition, and attribute detection over listing text.
//!
//! All detection is case-insensitive substring membership against the fixed
//! vocabularies in [`crate::vocab`], scanned in table order with the first
//! match winning. See [`crate::assemble`] for how these compose into a full
//! listing.

use lhx_core::ListingAttributes;

use crate::vocab::{BAG_TYPES, BRANDS, COLORS, MATERIALS, RESALE_HOSTS, SIZES};

/// Detects a brand in `title + text`.
///
/// Returns the canonical display name (abbreviations and unaccented
/// spellings are canonicalized, e.g. `"LV"` → `"Louis Vuitton"`), or `None`
/// when no vocabulary entry matches. Call sites supply their own sentinel.
#[must_use]
pub fn extract_brand(text: &str, title: &str) -> Option<&'static str> {
    let combined = format!("{title} {text}").to_lowercase();
    BRANDS
        .iter()
        .find(|(needle, _)| combined.contains(needle))
        .map(|(_, canonical)| *canonical)
}

/// Detects a bag category in `title + text`, title-cased for display.
///
/// Defaults to `"Handbag"` when nothing matches.
#[must_use]
pub fn extract_bag_type(text: &str, title: &str) -> String {
    let combined = format!("{title} {text}").to_lowercase();
    BAG_TYPES
        .iter()
        .find(|bag_type| combined.contains(*bag_type))
        .map_or_else(|| "Handbag".to_string(), |bag_type| title_case(bag_type))
}

/// Uppercases only the first character, preserving the rest as-is.
fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Detects the listing condition from text, falling back to the source URL.
///
/// Explicit keywords win; otherwise listings hosted on a known resale
/// marketplace are assumed `"Pre-owned"` and everything else `"New"`.
#[must_use]
pub fn extract_condition(text: &str, url: &str) -> String {
    let lower_text = text.to_lowercase();
    let lower_url = url.to_lowercase();

    if lower_text.contains("pre-owned")
        || lower_text.contains("preowned")
        || lower_text.contains("pre owned")
    {
        return "Pre-owned".to_string();
    }
    if lower_text.contains("vintage") {
        return "Vintage".to_string();
    }
    if lower_text.contains("like new") || lower_text.contains("excellent condition") {
        return "Like New".to_string();
    }
    if lower_text.contains("gently used") || lower_text.contains("good condition") {
        return "Good".to_string();
    }
    if RESALE_HOSTS.iter().any(|host| lower_url.contains(host)) {
        return "Pre-owned".to_string();
    }

    "New".to_string()
}

/// Detects color, size, and material independently; each stays absent when
/// its vocabulary has no match.
#[must_use]
pub fn extract_attributes(text: &str) -> ListingAttributes {
    let lower = text.to_lowercase();
    ListingAttributes {
        color: first_match(&lower, COLORS),
        size: first_match(&lower, SIZES),
        material: first_match(&lower, MATERIALS),
    }
}

fn first_match(lower_text: &str, vocabulary: &[&str]) -> Option<String> {
    vocabulary
        .iter()
        .find(|entry| lower_text.contains(*entry))
        .map(|entry| (*entry).to_string())
}
