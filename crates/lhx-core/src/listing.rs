use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A monetary value attached to a listing.
///
/// `amount` is `None` when no price could be detected in the source text;
/// downstream filters treat an unknown price as "don't exclude".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub amount: Option<f64>,
    /// ISO 4217 currency code (e.g., `"USD"`).
    pub currency: String,
}

impl Price {
    /// Returns `true` when no amount was detected ("price on request").
    #[must_use]
    pub fn is_on_request(&self) -> bool {
        self.amount.is_none()
    }
}

/// Optional product attributes detected from listing text.
///
/// Each field is detected independently; absent fields are omitted from the
/// serialized JSON rather than rendered as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
}

/// A normalized handbag listing built from one raw search-provider result.
///
/// Listings are constructed fresh per request and discarded after the
/// response is sent; nothing in this layer persists them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    /// `product-<hash>-<index>`; the hash is stable per product URL, the
    /// index disambiguates within one result set.
    pub id: String,
    /// Display title with retailer suffixes and Buy/Shop prefixes stripped.
    pub title: String,
    /// Canonical brand name, or the `"Designer"` sentinel when none matched.
    pub brand: String,
    /// Bag category, `"Handbag"` when none matched.
    pub bag_type: String,
    pub retailer: String,
    /// Two-letter country code of the retailer.
    pub retailer_country: String,
    pub price: Price,
    /// Human-readable price, `"Price on request"` when no amount is known.
    pub price_display: String,
    pub image_url: String,
    pub product_url: String,
    /// `"New"`, `"Pre-owned"`, `"Vintage"`, `"Like New"`, or `"Good"`.
    pub condition: String,
    #[serde(default)]
    pub attributes: ListingAttributes,
    pub scraped_at: DateTime<Utc>,
}

impl Listing {
    /// Text fed to the embedding model when indexing this listing for
    /// similarity search.
    #[must_use]
    pub fn embedding_text(&self) -> String {
        format!(
            "{} {} {} {}",
            self.title, self.brand, self.bag_type, self.retailer
        )
    }
}
