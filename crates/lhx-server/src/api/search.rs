use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use lhx_core::Listing;
use lhx_extract::assemble::{assemble, ListingFilters};
use lhx_providers::SearchOptions;

use crate::middleware::RequestId;

use super::{map_provider_error, normalize_page, normalize_per_page, ApiError, ApiResponse, AppState};

/// Domains the hosted search is restricted to; keeps results on real
/// retailer product pages instead of blogs and forums.
const RETAILER_DOMAINS: &[&str] = &[
    "therealreal.com",
    "fashionphile.com",
    "rebag.com",
    "vestiairecollective.com",
    "farfetch.com",
    "mytheresa.com",
    "net-a-porter.com",
    "ssense.com",
    "24s.com",
    "cettire.com",
];

#[derive(Debug, Deserialize)]
pub(super) struct SearchQuery {
    pub q: Option<String>,
    /// Comma-separated brand names.
    pub brands: Option<String>,
    /// Comma-separated bag types.
    pub bag_type: Option<String>,
    /// Comma-separated two-letter country codes.
    pub country: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub currency: Option<String>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(super) struct SearchData {
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub results: Vec<Listing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

fn split_csv(raw: Option<&str>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned)
            .collect()
    })
    .unwrap_or_default()
}

/// Synthesizes the provider query from the request. A brand filter beats the
/// free-text query, and the first requested bag type is appended.
fn build_search_query(q: Option<&str>, brands: &[String], bag_types: &[String]) -> String {
    let mut query = if let Some(brand) = brands.first() {
        format!("{brand} handbag bag for sale")
    } else if let Some(q) = q.filter(|s| !s.trim().is_empty()) {
        format!("{q} luxury handbag for sale price")
    } else {
        "luxury designer handbag for sale price authentic".to_string()
    };

    if let Some(bag_type) = bag_types.first() {
        query.push(' ');
        query.push_str(bag_type);
    }

    query
}

pub(super) async fn search_listings(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<SearchData>>, ApiError> {
    let page = normalize_page(query.page);
    let per_page = normalize_per_page(query.per_page);

    let brands = split_csv(query.brands.as_deref());
    let bag_types = split_csv(query.bag_type.as_deref());
    let countries = split_csv(query.country.as_deref());

    let Some(search) = &state.search else {
        let data = SearchData {
            page,
            per_page,
            total: 0,
            results: Vec::new(),
            message: Some("Search requires EXA_API_KEY configuration."),
        };
        return Ok(Json(ApiResponse::new(data, req_id.0)));
    };

    let search_query = build_search_query(query.q.as_deref(), &brands, &bag_types);
    let options = SearchOptions {
        num_results: state.config.search_num_results,
        include_domains: RETAILER_DOMAINS.iter().map(ToString::to_string).collect(),
        ..SearchOptions::default()
    };

    let raw_results = search
        .search(&search_query, &options)
        .await
        .map_err(|e| map_provider_error(req_id.0.clone(), &e))?;

    let filters = ListingFilters {
        brands,
        bag_types,
        countries,
        min_price: query.min_price,
        max_price: query.max_price,
        currency: query.currency.unwrap_or_else(|| "USD".to_string()),
    };
    let listings = assemble(&raw_results, &filters);

    let total = listings.len();
    let results: Vec<Listing> = listings
        .into_iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .collect();

    tracing::info!(
        query = %search_query,
        total,
        returned = results.len(),
        "search request served"
    );

    let data = SearchData {
        page,
        per_page,
        total,
        results,
        message: None,
    };
    Ok(Json(ApiResponse::new(data, req_id.0)))
}
