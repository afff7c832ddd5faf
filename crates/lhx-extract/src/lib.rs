//! Listing normalization and query interpretation.
//!
//! Turns raw search-provider results into normalized [`lhx_core::Listing`]
//! records (price/brand/type/condition extraction, retailer classification,
//! de-duplication, filtering) and free-text utterances into structured
//! [`ParsedQuery`] filters. Every function here is total: malformed input
//! degrades to a defined fallback value, never an error.

pub mod assemble;
pub mod attributes;
pub mod currency;
pub mod image;
pub mod query;
pub mod retailer;
pub mod vocab;

pub use assemble::{assemble, ListingFilters};
pub use attributes::{extract_attributes, extract_bag_type, extract_brand, extract_condition};
pub use currency::{convert_price, detect_price, format_price, PriceDetection};
pub use query::{parse_conversational_query, ParsedQuery};
pub use retailer::{classify_host, is_product_page, Retailer};
