//! Raw search results → normalized, de-duplicated, filtered listings.
//!
//! The pipeline: drop non-product pages, de-duplicate by normalized title
//! and product URL, run the extractors over the crawled text, convert the
//! price into the requested display currency, then apply the request's
//! post-hoc filter predicates against the derived fields.

use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use sha2::{Digest, Sha256};

use lhx_core::{Listing, Price, RawSearchResult};

use crate::attributes::{extract_attributes, extract_bag_type, extract_brand, extract_condition};
use crate::currency::{convert_price, detect_price, format_price};
use crate::image::{extract_image_from_text, placeholder_image};
use crate::retailer::{classify_host, is_product_page};

/// Request-level filter parameters applied after normalization.
///
/// Brand/type predicates are substring checks on the already-derived fields,
/// not re-queries; a listing with no detected price always passes the price
/// bounds.
#[derive(Debug, Clone)]
pub struct ListingFilters {
    pub brands: Vec<String>,
    pub bag_types: Vec<String>,
    pub countries: Vec<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Display currency for converted prices.
    pub currency: String,
}

impl Default for ListingFilters {
    fn default() -> Self {
        Self {
            brands: Vec::new(),
            bag_types: Vec::new(),
            countries: Vec::new(),
            min_price: None,
            max_price: None,
            currency: "USD".to_string(),
        }
    }
}

/// Derives a stable u64 from a product URL.
///
/// Takes the first 8 bytes of SHA-256(url) as a big-endian u64; the same URL
/// always produces the same value, which keys both listing IDs and image
/// placeholders.
#[must_use]
pub fn url_hash(url: &str) -> u64 {
    let digest = Sha256::digest(url.as_bytes());
    let bytes: [u8; 8] = digest[..8].try_into().expect("SHA-256 is at least 8 bytes");
    u64::from_be_bytes(bytes)
}

/// De-duplication key: lowercase, ASCII alphanumerics only, first 40 chars.
fn title_key(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(40)
        .collect()
}

static RETAILER_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\s*[-|]\s*(Farfetch|The RealReal|Fashionphile|Rebag|SSENSE|Mytheresa|Net-a-Porter|Vestiaire Collective|24S|Cettire).*$",
    )
    .expect("suffix pattern must compile")
});

static PIPE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\|\s*.*$").expect("pipe pattern must compile"));

static BUY_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Buy\s+").expect("buy pattern must compile"));

static SHOP_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Shop\s+").expect("shop pattern must compile"));

/// Strips retailer suffixes (` - Farfetch`, `| Anything`) and storefront
/// verb prefixes (`Buy `, `Shop `) from a crawled page title.
#[must_use]
pub fn clean_title(title: &str) -> String {
    let cleaned = RETAILER_SUFFIX.replace(title, "");
    let cleaned = PIPE_SUFFIX.replace(&cleaned, "");
    let cleaned = BUY_PREFIX.replace(&cleaned, "");
    let cleaned = SHOP_PREFIX.replace(&cleaned, "");
    cleaned.trim().to_string()
}

/// Builds normalized listings from raw provider results.
///
/// Order is preserved from the input; the first occurrence wins every
/// de-duplication tie.
#[must_use]
pub fn assemble(raw_results: &[RawSearchResult], filters: &ListingFilters) -> Vec<Listing> {
    let mut seen_titles: HashSet<String> = HashSet::new();
    let mut seen_urls: HashSet<String> = HashSet::new();
    let mut seen_images: HashSet<String> = HashSet::new();
    let mut listings = Vec::new();

    for raw in raw_results {
        if raw.url.is_empty() || !is_product_page(&raw.url) {
            continue;
        }
        if !seen_urls.insert(raw.url.to_lowercase()) {
            continue;
        }
        let key = title_key(raw.title.as_deref().unwrap_or(""));
        if !key.is_empty() && !seen_titles.insert(key) {
            continue;
        }

        let title = raw.title.as_deref().unwrap_or("");
        let combined = raw.combined_text();

        let detected = detect_price(&combined);
        let brand = extract_brand(&combined, title).unwrap_or("Designer");
        let bag_type = extract_bag_type(&combined, title);
        let retailer = classify_host(&raw.url);
        let attributes = extract_attributes(&combined);
        let condition = extract_condition(&combined, &raw.url);

        let (amount, currency) = match detected.amount {
            Some(value) if filters.currency != detected.currency => (
                Some(convert_price(value, &detected.currency, &filters.currency)),
                filters.currency.clone(),
            ),
            other => (other, detected.currency.clone()),
        };
        let price_display = format_price(amount, &currency);

        let hash = url_hash(&raw.url);
        let image_url = choose_image(raw, brand, hash, &seen_images);
        seen_images.insert(image_url.clone());

        listings.push(Listing {
            id: format!("product-{hash}-{}", listings.len()),
            title: clean_title(title),
            brand: brand.to_string(),
            bag_type,
            retailer: retailer.name,
            retailer_country: retailer.country,
            price: Price { amount, currency },
            price_display,
            image_url,
            product_url: raw.url.clone(),
            condition,
            attributes,
            scraped_at: Utc::now(),
        });
    }

    tracing::debug!(
        raw = raw_results.len(),
        normalized = listings.len(),
        "assembled listings"
    );

    apply_filters(listings, filters)
}

/// Image fallback chain: provider image → URL scraped from body text →
/// placeholder. A URL already used by an earlier listing falls through to
/// the next step.
fn choose_image(
    raw: &RawSearchResult,
    brand: &str,
    url_hash: u64,
    seen_images: &HashSet<String>,
) -> String {
    let mut image_url = raw.image.clone();

    if image_url.as_ref().is_none_or(|u| seen_images.contains(u)) {
        if let Some(extracted) = extract_image_from_text(raw.text.as_deref().unwrap_or("")) {
            if !seen_images.contains(&extracted) {
                image_url = Some(extracted);
            }
        }
    }

    if image_url.as_ref().is_none_or(|u| seen_images.contains(u)) {
        image_url = Some(placeholder_image(brand, url_hash));
    }

    image_url.unwrap_or_default()
}

fn apply_filters(listings: Vec<Listing>, filters: &ListingFilters) -> Vec<Listing> {
    listings
        .into_iter()
        .filter(|listing| {
            let brand_lower = listing.brand.to_lowercase();
            let bag_type_lower = listing.bag_type.to_lowercase();
            let title_lower = listing.title.to_lowercase();

            if !filters.brands.is_empty()
                && !filters.brands.iter().any(|wanted| {
                    let wanted = wanted.to_lowercase();
                    brand_lower.contains(&wanted) || title_lower.contains(&wanted)
                })
            {
                return false;
            }

            if !filters.bag_types.is_empty()
                && !filters.bag_types.iter().any(|wanted| {
                    let wanted = wanted.to_lowercase();
                    bag_type_lower.contains(&wanted) || title_lower.contains(&wanted)
                })
            {
                return false;
            }

            if !filters.countries.is_empty()
                && !filters.countries.contains(&listing.retailer_country)
            {
                return false;
            }

            // Unknown prices are "don't exclude", never filtered out.
            if let Some(amount) = listing.price.amount {
                if filters.min_price.is_some_and(|min| amount < min) {
                    return false;
                }
                if filters.max_price.is_some_and(|max| amount > max) {
                    return false;
                }
            }

            true
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(url: &str, title: &str, text: &str) -> RawSearchResult {
        RawSearchResult {
            url: url.to_string(),
            title: Some(title.to_string()),
            text: Some(text.to_string()),
            image: None,
            highlights: Vec::new(),
        }
    }

    fn product_url(slug: &str, id: u32) -> String {
        format!("https://www.therealreal.com/products/accessories/handbags/{slug}-{id}")
    }

    // -----------------------------------------------------------------------
    // url_hash / title_key / clean_title
    // -----------------------------------------------------------------------

    #[test]
    fn url_hash_is_stable() {
        let url = "https://www.rebag.com/infinity/chanel-flap";
        assert_eq!(url_hash(url), url_hash(url));
    }

    #[test]
    fn url_hash_differs_for_different_urls() {
        assert_ne!(
            url_hash("https://example.com/a"),
            url_hash("https://example.com/b")
        );
    }

    #[test]
    fn title_key_strips_case_and_punctuation() {
        assert_eq!(
            title_key("Chanel: Classic Flap!"),
            title_key("chanel classic flap")
        );
    }

    #[test]
    fn title_key_truncates_to_forty_chars() {
        let long = "x".repeat(100);
        assert_eq!(title_key(&long).len(), 40);
    }

    #[test]
    fn clean_title_strips_retailer_suffix() {
        assert_eq!(
            clean_title("Chanel Classic Flap - Farfetch Designer Bags"),
            "Chanel Classic Flap"
        );
    }

    #[test]
    fn clean_title_strips_pipe_suffix() {
        assert_eq!(clean_title("Hermès Kelly 28 | Luxury Resale"), "Hermès Kelly 28");
    }

    #[test]
    fn clean_title_strips_buy_and_shop_prefixes() {
        assert_eq!(clean_title("Buy Gucci Marmont"), "Gucci Marmont");
        assert_eq!(clean_title("Shop Prada Galleria"), "Prada Galleria");
    }

    // -----------------------------------------------------------------------
    // assemble
    // -----------------------------------------------------------------------

    #[test]
    fn assemble_builds_listing_from_raw_result() {
        let results = vec![raw(
            &product_url("chanel-classic-flap", 12345),
            "Chanel Classic Flap Medium - Farfetch",
            "Black caviar leather, $8,500, excellent condition",
        )];
        let listings = assemble(&results, &ListingFilters::default());
        assert_eq!(listings.len(), 1);
        let listing = &listings[0];
        assert_eq!(listing.title, "Chanel Classic Flap Medium");
        assert_eq!(listing.brand, "Chanel");
        assert_eq!(listing.bag_type, "Classic flap");
        assert_eq!(listing.retailer, "The RealReal");
        assert_eq!(listing.retailer_country, "US");
        assert_eq!(listing.price.amount, Some(8500.0));
        assert_eq!(listing.price.currency, "USD");
        assert_eq!(listing.price_display, "$8,500");
        assert_eq!(listing.condition, "Like New");
        assert_eq!(listing.attributes.color.as_deref(), Some("black"));
        assert!(listing.id.starts_with("product-"));
    }

    #[test]
    fn assemble_drops_category_pages() {
        let results = vec![raw(
            "https://www.farfetch.com/shopping/women/bags",
            "Designer Bags",
            "",
        )];
        assert!(assemble(&results, &ListingFilters::default()).is_empty());
    }

    #[test]
    fn assemble_dedups_by_normalized_title() {
        let results = vec![
            raw(
                &product_url("chanel-flap", 11111),
                "Chanel Classic Flap!",
                "$8,000",
            ),
            raw(
                &product_url("chanel-flap-again", 22222),
                "chanel classic flap",
                "$8,100",
            ),
        ];
        let listings = assemble(&results, &ListingFilters::default());
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].price.amount, Some(8000.0));
    }

    #[test]
    fn assemble_dedups_by_product_url() {
        let url = product_url("kelly", 33333);
        let results = vec![
            raw(&url, "Hermès Kelly 28", "$22,000"),
            raw(&url, "Hermes Kelly 28 Sellier", "$23,000"),
        ];
        let listings = assemble(&results, &ListingFilters::default());
        assert_eq!(listings.len(), 1);
    }

    #[test]
    fn assemble_falls_back_to_designer_and_handbag() {
        let results = vec![raw(
            &product_url("mystery-purse", 44444),
            "A lovely purse",
            "no recognizable words",
        )];
        let listings = assemble(&results, &ListingFilters::default());
        assert_eq!(listings[0].brand, "Designer");
        assert_eq!(listings[0].bag_type, "Handbag");
        assert_eq!(listings[0].price.amount, None);
        assert_eq!(listings[0].price_display, "Price on request");
    }

    #[test]
    fn assemble_converts_to_requested_currency() {
        let filters = ListingFilters {
            currency: "EUR".to_string(),
            ..ListingFilters::default()
        };
        let results = vec![raw(
            &product_url("gucci-marmont", 55555),
            "Gucci Marmont",
            "$1,000 shoulder bag",
        )];
        let listings = assemble(&results, &filters);
        assert_eq!(listings[0].price.currency, "EUR");
        assert_eq!(listings[0].price.amount, Some(920.0));
        assert_eq!(listings[0].price_display, "€920");
    }

    #[test]
    fn assemble_keeps_detected_currency_when_it_matches() {
        let results = vec![raw(
            &product_url("ysl-loulou", 66666),
            "YSL Loulou",
            "€2,300 in store",
        )];
        let filters = ListingFilters {
            currency: "EUR".to_string(),
            ..ListingFilters::default()
        };
        let listings = assemble(&results, &filters);
        assert_eq!(listings[0].price.amount, Some(2300.0));
        assert_eq!(listings[0].price.currency, "EUR");
    }

    #[test]
    fn brand_filter_matches_derived_field_or_title() {
        let filters = ListingFilters {
            brands: vec!["Chanel".to_string()],
            ..ListingFilters::default()
        };
        let results = vec![
            raw(&product_url("chanel-flap", 77777), "Classic Flap", "Chanel, $8,000"),
            raw(&product_url("gucci-tote", 88888), "Gucci Tote", "$1,500"),
        ];
        let listings = assemble(&results, &filters);
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].brand, "Chanel");
    }

    #[test]
    fn country_filter_uses_exact_codes() {
        let filters = ListingFilters {
            countries: vec!["FR".to_string()],
            ..ListingFilters::default()
        };
        let results = vec![
            raw(
                "https://www.vestiairecollective.com/women-bags/chanel-bag-10872624.shtml",
                "Chanel Bag",
                "$3,000",
            ),
            raw(&product_url("chanel-flap", 99999), "Chanel Flap", "$8,000"),
        ];
        let listings = assemble(&results, &filters);
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].retailer, "Vestiaire Collective");
    }

    #[test]
    fn unknown_price_passes_price_bounds() {
        let filters = ListingFilters {
            min_price: Some(1000.0),
            max_price: Some(5000.0),
            ..ListingFilters::default()
        };
        let results = vec![
            raw(&product_url("no-price", 10101), "Birkin 30", "price on request"),
            raw(&product_url("too-cheap", 20202), "Canvas Tote", "$400"),
            raw(&product_url("in-range", 30303), "Gucci Marmont", "$2,400"),
        ];
        let listings = assemble(&results, &filters);
        assert_eq!(listings.len(), 2);
        assert!(listings.iter().any(|l| l.price.amount.is_none()));
        assert!(listings.iter().any(|l| l.price.amount == Some(2400.0)));
    }

    #[test]
    fn duplicate_provider_images_fall_through_to_placeholder() {
        let shared = "https://cdn.example.com/products/shared-shot.jpg".to_string();
        let mut first = raw(&product_url("first", 40404), "Dior Saddle", "$3,900");
        first.image = Some(shared.clone());
        let mut second = raw(&product_url("second", 50505), "Fendi Baguette", "$2,800");
        second.image = Some(shared.clone());

        let listings = assemble(&[first, second], &ListingFilters::default());
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].image_url, shared);
        assert_ne!(listings[1].image_url, shared);
        assert!(listings[1].image_url.contains("unsplash"));
    }

    #[test]
    fn listing_ids_are_unique_within_a_result_set() {
        let results = vec![
            raw(&product_url("one", 60606), "Bag One", "$1,000"),
            raw(&product_url("two", 70707), "Bag Two", "$2,000"),
        ];
        let listings = assemble(&results, &ListingFilters::default());
        assert_ne!(listings[0].id, listings[1].id);
    }
}
