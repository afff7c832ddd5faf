//! Request/response shapes shared by the provider clients.

use serde::{Deserialize, Serialize};

/// Knobs for one hosted-search call.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub num_results: usize,
    /// Restrict results to these domains; empty means no restriction.
    pub include_domains: Vec<String>,
    /// How much crawled body text to request per result.
    pub max_text_chars: usize,
    pub highlight_sentences: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            num_results: 25,
            include_domains: Vec::new(),
            max_text_chars: 1500,
            highlight_sentences: 3,
        }
    }
}

/// Metadata filter for vector queries. Equality on the categorical fields,
/// range bounds on the stored price amount.
#[derive(Debug, Clone, Default)]
pub struct VectorFilter {
    pub brand: Option<String>,
    pub bag_type: Option<String>,
    pub retailer_country: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl VectorFilter {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.brand.is_none()
            && self.bag_type.is_none()
            && self.retailer_country.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
    }

    /// Renders the filter in the index's `$eq`/`$gte`/`$lte` grammar, or
    /// `None` when no constraint is set.
    #[must_use]
    pub fn to_index_filter(&self) -> Option<serde_json::Value> {
        let mut filter = serde_json::Map::new();
        if let Some(brand) = &self.brand {
            filter.insert("brand".into(), serde_json::json!({ "$eq": brand }));
        }
        if let Some(bag_type) = &self.bag_type {
            filter.insert("bag_type".into(), serde_json::json!({ "$eq": bag_type }));
        }
        if let Some(country) = &self.retailer_country {
            filter.insert(
                "retailer_country".into(),
                serde_json::json!({ "$eq": country }),
            );
        }
        if self.min_price.is_some() || self.max_price.is_some() {
            let mut bounds = serde_json::Map::new();
            if let Some(min) = self.min_price {
                bounds.insert("$gte".into(), serde_json::json!(min));
            }
            if let Some(max) = self.max_price {
                bounds.insert("$lte".into(), serde_json::json!(max));
            }
            filter.insert("price_amount".into(), serde_json::Value::Object(bounds));
        }

        if filter.is_empty() {
            None
        } else {
            Some(serde_json::Value::Object(filter))
        }
    }
}

/// Listing metadata stored alongside each vector in the index.
///
/// `price_amount` is stored as `0.0` for price-on-request listings because
/// the index cannot represent null metadata numbers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VectorRecord {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub bag_type: String,
    #[serde(default)]
    pub retailer: String,
    #[serde(default)]
    pub retailer_country: String,
    #[serde(default)]
    pub price_amount: f64,
    #[serde(default)]
    pub price_currency: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub product_url: String,
    #[serde(default)]
    pub scraped_at: String,
}

/// One similarity hit: the stored record plus its match score.
#[derive(Debug, Clone)]
pub struct VectorMatch {
    pub id: String,
    pub score: f32,
    pub record: VectorRecord,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_renders_to_none() {
        assert!(VectorFilter::default().to_index_filter().is_none());
        assert!(VectorFilter::default().is_empty());
    }

    #[test]
    fn categorical_filter_uses_eq() {
        let filter = VectorFilter {
            brand: Some("Chanel".to_string()),
            ..VectorFilter::default()
        };
        let rendered = filter.to_index_filter().expect("filter");
        assert_eq!(rendered["brand"]["$eq"], "Chanel");
    }

    #[test]
    fn price_bounds_render_as_range() {
        let filter = VectorFilter {
            min_price: Some(1000.0),
            max_price: Some(5000.0),
            ..VectorFilter::default()
        };
        let rendered = filter.to_index_filter().expect("filter");
        assert_eq!(rendered["price_amount"]["$gte"], 1000.0);
        assert_eq!(rendered["price_amount"]["$lte"], 5000.0);
    }

    #[test]
    fn vector_record_tolerates_missing_fields() {
        let record: VectorRecord = serde_json::from_str(r#"{"title":"Kelly 28"}"#).expect("parse");
        assert_eq!(record.title, "Kelly 28");
        assert_eq!(record.brand, "");
        assert!((record.price_amount - 0.0).abs() < f64::EPSILON);
    }
}
