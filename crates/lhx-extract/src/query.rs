//! Conversational query parsing.
//!
//! Turns a free-text shopper utterance ("something black for a cocktail
//! party under $3000") into structured filters plus a normalized,
//! vocabulary-aligned search string. Downstream search is keyword-based, so
//! the synthesized text outperforms the raw utterance.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::vocab::{BRANDS, OCCASIONS, QUERY_BAG_TYPES, QUERY_COLORS};

/// Structured interpretation of one shopper utterance. Ephemeral: built and
/// consumed within a single request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedQuery {
    pub search_text: String,
    pub brand: Option<String>,
    pub color: Option<String>,
    pub bag_type: Option<String>,
    pub occasion: Option<String>,
    pub min_price: Option<u32>,
    pub max_price: Option<u32>,
}

/// Upper-bound price phrasings, tried in order; the first match wins.
static MAX_PRICE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)under\s*\$?\s*(\d{1,3}(?:,?\d{3})*)",
        r"(?i)below\s*\$?\s*(\d{1,3}(?:,?\d{3})*)",
        r"(?i)less than\s*\$?\s*(\d{1,3}(?:,?\d{3})*)",
        r"(?i)max\s*\$?\s*(\d{1,3}(?:,?\d{3})*)",
        r"(?i)up to\s*\$?\s*(\d{1,3}(?:,?\d{3})*)",
        r"(?i)budget\s*(?:of|is)?\s*\$?\s*(\d{1,3}(?:,?\d{3})*)",
        r"(?i)\$\s*(\d{1,3}(?:,?\d{3})*)\s*(?:or less|max|maximum)",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("max-price pattern must compile"))
    .collect()
});

/// Lower-bound price phrasings, tried in order.
static MIN_PRICE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)over\s*\$?\s*(\d{1,3}(?:,?\d{3})*)",
        r"(?i)above\s*\$?\s*(\d{1,3}(?:,?\d{3})*)",
        r"(?i)more than\s*\$?\s*(\d{1,3}(?:,?\d{3})*)",
        r"(?i)at least\s*\$?\s*(\d{1,3}(?:,?\d{3})*)",
        r"(?i)starting\s*(?:at|from)?\s*\$?\s*(\d{1,3}(?:,?\d{3})*)",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("min-price pattern must compile"))
    .collect()
});

/// Explicit range: "$2,000 to $5,000", "$2000-$5000", "between $2000 and
/// $5000". Evaluated last; when present it overwrites both bounds.
static RANGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\$?\s*(\d{1,3}(?:,?\d{3})*)\s*(?:to|-|and)\s*\$?\s*(\d{1,3}(?:,?\d{3})*)")
        .expect("range pattern must compile")
});

fn parse_amount(raw: &str) -> Option<u32> {
    raw.replace(',', "").parse::<u32>().ok()
}

fn first_capture(patterns: &[Regex], input: &str) -> Option<u32> {
    patterns
        .iter()
        .find_map(|p| p.captures(input))
        .and_then(|captures| parse_amount(&captures[1]))
}

/// Parses a free-text utterance into filters and a synthesized search string.
///
/// Brand, color, and bag type come from ordered vocabulary scans (first hit
/// wins). When no bag-type keyword matches directly, an occasion keyword may
/// set both `occasion` and the inferred `bag_type`. Price bounds come from
/// phrase patterns; an explicit range runs last and unconditionally
/// overwrites both bounds.
#[must_use]
pub fn parse_conversational_query(input: &str) -> ParsedQuery {
    let lower = input.to_lowercase();
    let lower = lower.trim();

    let brand = BRANDS
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map(|(_, canonical)| (*canonical).to_string());

    let color = QUERY_COLORS
        .iter()
        .find(|c| lower.contains(*c))
        .map(|c| (*c).to_string());

    let mut bag_type = QUERY_BAG_TYPES
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map(|(_, display)| (*display).to_string());

    let mut occasion = None;
    if bag_type.is_none() {
        if let Some((needle, inferred)) = OCCASIONS.iter().find(|(needle, _)| lower.contains(needle))
        {
            occasion = Some((*needle).to_string());
            bag_type = Some((*inferred).to_string());
        }
    }

    let mut max_price = first_capture(&MAX_PRICE_PATTERNS, input);
    let mut min_price = first_capture(&MIN_PRICE_PATTERNS, input);

    // Range parsing runs last and wins over any single-bound phrase.
    if let Some(captures) = RANGE_PATTERN.captures(input) {
        if let (Some(low), Some(high)) = (parse_amount(&captures[1]), parse_amount(&captures[2])) {
            min_price = Some(low);
            max_price = Some(high);
        }
    }

    let mut parts: Vec<String> = Vec::new();
    if let Some(brand) = &brand {
        parts.push(brand.clone());
    }
    if let Some(color) = &color {
        parts.push(color.clone());
    }
    if let Some(bag_type) = &bag_type {
        parts.push(bag_type.to_lowercase());
    }
    parts.push("handbag".to_string());
    let search_text = parts.join(" ");

    ParsedQuery {
        search_text,
        brand,
        color,
        bag_type,
        occasion,
        min_price,
        max_price,
    }
}
