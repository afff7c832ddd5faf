use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use lhx_core::{Listing, ListingAttributes, Price};
use lhx_extract::currency::format_price;
use lhx_providers::{VectorFilter, VectorMatch};

use crate::middleware::RequestId;

use super::{map_provider_error, ApiError, ApiResponse, AppState};

const NO_RESULTS_MESSAGE: &str =
    "No similar products found. Vector search requires indexed products.";

#[derive(Debug, Deserialize)]
pub(super) struct SimilarQuery {
    /// Anchor listing ID; mutually optional with `q`, one is required.
    pub id: Option<String>,
    /// Free-text query, embedded before the nearest-neighbor lookup.
    pub q: Option<String>,
    pub top_k: Option<usize>,
    pub brand: Option<String>,
    pub bag_type: Option<String>,
    pub country: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

/// A similarity hit shaped like a listing. Attribute detection never ran on
/// the stored metadata, so `attributes` is always empty here.
#[derive(Debug, Serialize)]
pub(super) struct SimilarItem {
    pub id: String,
    pub title: String,
    pub brand: String,
    pub bag_type: String,
    pub retailer: String,
    pub retailer_country: String,
    pub price: Price,
    pub price_display: String,
    pub image_url: String,
    pub product_url: String,
    pub scraped_at: String,
    pub attributes: ListingAttributes,
}

#[derive(Debug, Serialize)]
pub(super) struct SimilarData {
    pub results: Vec<SimilarItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub(super) struct IndexData {
    pub indexed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

fn similar_item(vector_match: VectorMatch) -> SimilarItem {
    let record = vector_match.record;
    // The index stores 0.0 for price-on-request listings.
    let amount = (record.price_amount > 0.0).then_some(record.price_amount);
    let currency = if record.price_currency.is_empty() {
        "USD".to_string()
    } else {
        record.price_currency
    };
    SimilarItem {
        id: vector_match.id,
        title: record.title,
        brand: record.brand,
        bag_type: record.bag_type,
        retailer: record.retailer,
        retailer_country: record.retailer_country,
        price_display: format_price(amount, &currency),
        price: Price { amount, currency },
        image_url: record.image_url,
        product_url: record.product_url,
        scraped_at: record.scraped_at,
        attributes: ListingAttributes::default(),
    }
}

fn empty_response(req_id: String) -> Json<ApiResponse<SimilarData>> {
    let data = SimilarData {
        results: Vec::new(),
        message: Some(NO_RESULTS_MESSAGE),
    };
    Json(ApiResponse::new(data, req_id))
}

pub(super) async fn find_similar(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<SimilarQuery>,
) -> Result<Json<ApiResponse<SimilarData>>, ApiError> {
    let anchor_id = query.id.as_deref().filter(|s| !s.is_empty());
    let text_query = query.q.as_deref().filter(|s| !s.is_empty());

    if anchor_id.is_none() && text_query.is_none() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "either id or q parameter is required",
        ));
    }

    let top_k = query.top_k.unwrap_or(5).clamp(1, 50);

    let Some(vectors) = &state.vectors else {
        return Ok(empty_response(req_id.0));
    };

    let matches = if let Some(id) = anchor_id {
        let Some(anchor_vector) = vectors
            .fetch_vector(id)
            .await
            .map_err(|e| map_provider_error(req_id.0.clone(), &e))?
        else {
            return Ok(empty_response(req_id.0));
        };

        // Over-fetch by one so the anchor itself can be dropped.
        let neighbors = vectors
            .query(&anchor_vector, top_k + 1, &VectorFilter::default())
            .await
            .map_err(|e| map_provider_error(req_id.0.clone(), &e))?;
        neighbors
            .into_iter()
            .filter(|m| m.id != id)
            .take(top_k)
            .collect::<Vec<_>>()
    } else {
        let Some(embeddings) = &state.embeddings else {
            return Ok(empty_response(req_id.0));
        };
        let text = text_query.unwrap_or_default();
        let vector = embeddings
            .embed(text)
            .await
            .map_err(|e| map_provider_error(req_id.0.clone(), &e))?;

        let filter = VectorFilter {
            brand: query.brand.clone(),
            bag_type: query.bag_type.clone(),
            retailer_country: query.country.clone(),
            min_price: query.min_price,
            max_price: query.max_price,
        };
        vectors
            .query(&vector, top_k, &filter)
            .await
            .map_err(|e| map_provider_error(req_id.0.clone(), &e))?
    };

    if matches.is_empty() {
        return Ok(empty_response(req_id.0));
    }

    let data = SimilarData {
        results: matches.into_iter().map(similar_item).collect(),
        message: None,
    };
    Ok(Json(ApiResponse::new(data, req_id.0)))
}

pub(super) async fn index_listing(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(listing): Json<Listing>,
) -> Result<Json<ApiResponse<IndexData>>, ApiError> {
    let (Some(embeddings), Some(vectors)) = (&state.embeddings, &state.vectors) else {
        let data = IndexData {
            indexed: false,
            message: Some("Indexing requires OPENAI_API_KEY and PINECONE_API_KEY."),
        };
        return Ok(Json(ApiResponse::new(data, req_id.0)));
    };

    let vector = embeddings
        .embed(&listing.embedding_text())
        .await
        .map_err(|e| map_provider_error(req_id.0.clone(), &e))?;
    vectors
        .upsert(&listing, &vector)
        .await
        .map_err(|e| map_provider_error(req_id.0.clone(), &e))?;

    tracing::info!(listing_id = %listing.id, "listing indexed for similarity search");

    let data = IndexData {
        indexed: true,
        message: None,
    };
    Ok(Json(ApiResponse::new(data, req_id.0)))
}
