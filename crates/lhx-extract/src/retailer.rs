//! Retailer identification and product-page classification from URLs.
//!
//! `classify_host` maps a listing's hostname to a display name and country
//! through a static table. `is_product_page` separates specific product
//! pages from category/search/listing pages so noisy provider results can be
//! dropped before normalization. Both are total: malformed URLs classify to
//! safe defaults instead of erroring.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// A retailer resolved from a listing hostname.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retailer {
    pub name: String,
    /// Two-letter country code.
    pub country: String,
}

/// hostname → (display name, country). Multi-brand retailers first, then
/// resale marketplaces, then house boutiques.
const RETAILERS: &[(&str, &str, &str)] = &[
    ("farfetch.com", "Farfetch", "UK"),
    ("net-a-porter.com", "Net-a-Porter", "UK"),
    ("mytheresa.com", "Mytheresa", "DE"),
    ("ssense.com", "SSENSE", "CA"),
    ("nordstrom.com", "Nordstrom", "US"),
    ("saks.com", "Saks Fifth Avenue", "US"),
    ("neimanmarcus.com", "Neiman Marcus", "US"),
    ("bergdorfgoodman.com", "Bergdorf Goodman", "US"),
    ("therealreal.com", "The RealReal", "US"),
    ("vestiairecollective.com", "Vestiaire Collective", "FR"),
    ("rebag.com", "Rebag", "US"),
    ("fashionphile.com", "Fashionphile", "US"),
    ("tradesy.com", "Tradesy", "US"),
    ("yoogiscloset.com", "Yoogi's Closet", "US"),
    ("collectorsquare.com", "Collector Square", "FR"),
    ("labellov.com", "LabelLOV", "BE"),
    ("24s.com", "24S", "FR"),
    ("matchesfashion.com", "Matches Fashion", "UK"),
    ("bloomingdales.com", "Bloomingdale's", "US"),
    ("selfridges.com", "Selfridges", "UK"),
    ("harrods.com", "Harrods", "UK"),
    ("luisaviaroma.com", "LUISAVIAROMA", "IT"),
    ("brownsfashion.com", "Browns Fashion", "UK"),
    ("italist.com", "Italist", "IT"),
    ("cettire.com", "Cettire", "AU"),
    ("modesens.com", "ModeSens", "US"),
    ("jomashop.com", "Jomashop", "US"),
    ("stockx.com", "StockX", "US"),
    ("ebay.com", "eBay", "US"),
    ("louisvuitton.com", "Louis Vuitton", "FR"),
    ("chanel.com", "Chanel", "FR"),
    ("hermes.com", "Hermès", "FR"),
    ("gucci.com", "Gucci", "IT"),
    ("prada.com", "Prada", "IT"),
    ("dior.com", "Dior", "FR"),
    ("celine.com", "Celine", "FR"),
    ("bottegaveneta.com", "Bottega Veneta", "IT"),
    ("balenciaga.com", "Balenciaga", "FR"),
    ("ysl.com", "Saint Laurent", "FR"),
    ("fendi.com", "Fendi", "IT"),
    ("loewe.com", "Loewe", "ES"),
    ("chloe.com", "Chloé", "FR"),
];

/// Resolves the retailer behind a listing URL.
///
/// Unknown hosts fall back to a capitalized first hostname label and `"US"`;
/// unparseable URLs classify as a generic `"Online Store"`.
#[must_use]
pub fn classify_host(url: &str) -> Retailer {
    let Some(hostname) = Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(ToOwned::to_owned))
    else {
        return Retailer {
            name: "Online Store".to_string(),
            country: "US".to_string(),
        };
    };

    let hostname = hostname.strip_prefix("www.").unwrap_or(&hostname);

    if let Some((_, name, country)) = RETAILERS.iter().find(|(host, _, _)| *host == hostname) {
        return Retailer {
            name: (*name).to_string(),
            country: (*country).to_string(),
        };
    }

    let first_label = hostname.split('.').next().unwrap_or(hostname);
    Retailer {
        name: capitalize(first_label),
        country: "US".to_string(),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => "Online Store".to_string(),
    }
}

/// Paths that are category/search/browse pages regardless of anything else.
static CATEGORY_ONLY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^/(women|men|bags|handbags|accessories|shop|collection|category|search|browse|sale|new-arrivals?|designers?)/?$",
        r"^/(women|men)/(bags|handbags|accessories)/?$",
        r"^/(shop|browse|shopping)/(women|men|bags|handbags)/?$",
        r"^/(women|men)/(bags|handbags)/[a-z-]+/?$",
        r"/search\?",
        r"/browse/",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("category pattern must compile"))
    .collect()
});

/// Generic "this path carries a product identifier" shapes.
static PRODUCT_ID_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\d{5,}",
        r"-\d{4,}$",
        r"-\d{4,}\.",
        r"(?i)item-\d+",
        r"(?i)-p\d{3,}",
        r"(?i)/p/[a-z0-9]+",
        r"(?i)sku[=:][a-z0-9]+",
        r"(?i)productid[=:]\d+",
        r"\.shtml$",
        r"(?i)-[a-f0-9]{8,}",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("product-id pattern must compile"))
    .collect()
});

/// Retailers with bespoke URL grammars. When the hostname matches one of
/// these, its pattern is the sole authority: a non-matching path is NOT a
/// product page even if a later generic heuristic would have accepted it.
static RETAILER_PRODUCT_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("therealreal.com", r"/products/[^/]+/[^/]+/[^/]+-\d+"),
        ("fashionphile.com", r"/(product|p)/[a-z0-9-]+-\d+"),
        ("rebag.com", r"/infinity/[a-z0-9-]+|/clair/[a-z0-9-]+"),
        ("vestiairecollective.com", r"[a-z-]+-\d+\.shtml"),
        ("farfetch.com", r"/shopping/[^/]+/item-\d+"),
        ("mytheresa.com", r"[a-z-]+-p\d+"),
        ("net-a-porter.com", r"/product/\d+"),
        ("ssense.com", r"/[a-z]+/[a-z]+/[a-z0-9-]+-\d+"),
        ("24s.com", r"[a-z-]+-\d{5,}"),
        ("cettire.com", r"[a-z-]+-\d{5,}"),
    ]
    .into_iter()
    .map(|(domain, p)| {
        (
            domain,
            Regex::new(p).expect("retailer pattern must compile"),
        )
    })
    .collect()
});

/// Last-resort product/item/slug shapes for unknown retailers.
static GENERIC_PRODUCT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)/product/[a-z0-9-]+$",
        r"(?i)/item/[a-z0-9-]+$",
        r"(?i)/p/[a-z0-9]+$",
        r"[a-z]+-[a-z]+-[a-z0-9]+-\d{3,}$",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("generic pattern must compile"))
    .collect()
});

/// Classifies whether a URL points at a specific product page.
///
/// Stages run in order with early return:
/// 1. Root paths and paths with fewer than two segments are not product pages.
/// 2. Known category/search shapes are not product pages.
/// 3. A generic product-identifier shape in the path (or its last segment, or
///    the query string) is a product page.
/// 4. A retailer with a bespoke URL grammar is judged by that grammar alone.
/// 5. Otherwise, generic product/item/slug suffixes decide.
#[must_use]
pub fn is_product_page(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };

    let pathname = parsed.path().to_lowercase();
    let hostname = parsed.host_str().unwrap_or("").to_lowercase();
    let full = match parsed.query() {
        Some(query) => format!("{pathname}?{}", query.to_lowercase()),
        None => pathname.clone(),
    };

    if pathname == "/" || pathname.is_empty() {
        return false;
    }

    let segments: Vec<&str> = pathname.split('/').filter(|s| !s.is_empty()).collect();
    if segments.len() < 2 {
        return false;
    }

    if CATEGORY_ONLY_PATTERNS
        .iter()
        .any(|p| p.is_match(&pathname) || p.is_match(&full))
    {
        return false;
    }

    let last_segment = segments.last().copied().unwrap_or("");
    if PRODUCT_ID_PATTERNS
        .iter()
        .any(|p| p.is_match(&full) || p.is_match(last_segment))
    {
        return true;
    }

    for (domain, pattern) in RETAILER_PRODUCT_PATTERNS.iter() {
        if hostname.contains(domain) {
            return pattern.is_match(&pathname);
        }
    }

    GENERIC_PRODUCT_PATTERNS
        .iter()
        .any(|p| p.is_match(&pathname))
}
