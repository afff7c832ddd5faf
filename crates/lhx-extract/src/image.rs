//! Best-effort product image selection.
//!
//! Providers often omit the image field, so the assembler falls through:
//! provider image → image URL scraped from crawled body text → deterministic
//! stock-photo placeholder keyed by brand and product-URL hash.

use std::sync::LazyLock;

use regex::Regex;

static IMAGE_URL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r#"(?i)https?://[^\s"'<>]+\.(?:jpg|jpeg|png|webp|gif)(?:\?[^\s"'<>]*)?"#,
        r#"(?i)https?://[^\s"'<>]*(?:image|img|photo|pic)[^\s"'<>]*\.(?:jpg|jpeg|png|webp)"#,
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("image pattern must compile"))
    .collect()
});

/// Chrome that is never a product shot.
const REJECTED_TOKENS: &[&str] = &["logo", "icon", "avatar", "placeholder"];

/// Tokens that suggest a URL really is the product image.
const PRODUCT_TOKENS: &[&str] = &["product", "bag", "item"];

/// Scrapes the first plausible product-image URL out of crawled body text.
///
/// A candidate is accepted when it carries a product-ish token, or when it is
/// one of the first three image URLs on the page (hero images usually come
/// first). Logo/icon/avatar/placeholder URLs are always skipped.
#[must_use]
pub fn extract_image_from_text(text: &str) -> Option<String> {
    for pattern in IMAGE_URL_PATTERNS.iter() {
        let matches: Vec<&str> = pattern.find_iter(text).map(|m| m.as_str()).collect();
        let valid = matches.iter().enumerate().find(|(index, candidate)| {
            let lower = candidate.to_lowercase();
            if REJECTED_TOKENS.iter().any(|token| lower.contains(token)) {
                return false;
            }
            PRODUCT_TOKENS.iter().any(|token| lower.contains(token)) || *index < 3
        });
        if let Some((_, found)) = valid {
            return Some((*found).to_string());
        }
    }
    None
}

/// Deterministic stock-photo placeholder for listings with no usable image.
///
/// Keyed by brand and a product-URL hash so the same listing always renders
/// the same placeholder, and two different listings rarely share one.
#[must_use]
pub fn placeholder_image(brand: &str, url_hash: u64) -> String {
    format!(
        "https://source.unsplash.com/600x600/?luxury,handbag,{},{}",
        brand.to_lowercase(),
        url_hash % 1000
    )
}
