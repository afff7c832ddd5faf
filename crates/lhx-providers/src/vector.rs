//! Pinecone vector index client for listing similarity search.
//!
//! Speaks the data-plane REST API of a single index host: `/query` for
//! nearest neighbors, `/vectors/fetch` to recover a stored vector by listing
//! ID, and `/vectors/upsert` to index a listing.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use lhx_core::Listing;

use crate::error::ProviderError;
use crate::types::{VectorFilter, VectorMatch, VectorRecord};

/// Nearest-neighbor store for listing vectors.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Returns the `top_k` stored listings closest to `vector`, optionally
    /// constrained by a metadata filter.
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: &VectorFilter,
    ) -> Result<Vec<VectorMatch>, ProviderError>;

    /// Fetches the stored vector for a listing ID, or `None` if unindexed.
    async fn fetch_vector(&self, id: &str) -> Result<Option<Vec<f32>>, ProviderError>;

    /// Stores a listing and its embedding, overwriting any previous entry
    /// with the same ID.
    async fn upsert(&self, listing: &Listing, vector: &[f32]) -> Result<(), ProviderError>;
}

/// Client for one Pinecone index's data-plane host.
pub struct PineconeClient {
    client: Client,
    api_key: String,
    index_host: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<VectorRecord>,
}

#[derive(Deserialize)]
struct FetchResponse {
    #[serde(default)]
    vectors: HashMap<String, FetchedVector>,
}

#[derive(Deserialize)]
struct FetchedVector {
    #[serde(default)]
    values: Vec<f32>,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: Vec<UpsertVector<'a>>,
}

#[derive(Serialize)]
struct UpsertVector<'a> {
    id: &'a str,
    values: &'a [f32],
    metadata: VectorRecord,
}

impl PineconeClient {
    /// Creates a client for the given index host.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: &str,
        index_host: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            index_host: index_host.trim_end_matches('/').to_owned(),
        })
    }

    async fn check_status(
        response: reqwest::Response,
        context: &str,
    ) -> Result<String, ProviderError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                provider: "Pinecone",
                status: status.as_u16(),
                message: format!("{context}: {message}"),
            });
        }
        Ok(response.text().await?)
    }
}

fn record_for(listing: &Listing) -> VectorRecord {
    VectorRecord {
        title: listing.title.clone(),
        brand: listing.brand.clone(),
        bag_type: listing.bag_type.clone(),
        retailer: listing.retailer.clone(),
        retailer_country: listing.retailer_country.clone(),
        // The index cannot store null metadata numbers; price-on-request
        // listings are stored as 0.0.
        price_amount: listing.price.amount.unwrap_or(0.0),
        price_currency: listing.price.currency.clone(),
        image_url: listing.image_url.clone(),
        product_url: listing.product_url.clone(),
        scraped_at: listing.scraped_at.to_rfc3339(),
    }
}

#[async_trait]
impl VectorIndex for PineconeClient {
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: &VectorFilter,
    ) -> Result<Vec<VectorMatch>, ProviderError> {
        let url = format!("{}/query", self.index_host);
        let request = QueryRequest {
            vector,
            top_k,
            include_metadata: true,
            filter: filter.to_index_filter(),
        };

        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(&request)
            .send()
            .await?;
        let body = Self::check_status(response, "query").await?;

        let envelope: QueryResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::Deserialize {
                context: "vector query".to_string(),
                source: e,
            })?;

        Ok(envelope
            .matches
            .into_iter()
            .map(|m| VectorMatch {
                id: m.id,
                score: m.score,
                record: m.metadata.unwrap_or_default(),
            })
            .collect())
    }

    async fn fetch_vector(&self, id: &str) -> Result<Option<Vec<f32>>, ProviderError> {
        let url = format!("{}/vectors/fetch", self.index_host);
        let response = self
            .client
            .get(&url)
            .header("Api-Key", &self.api_key)
            .query(&[("ids", id)])
            .send()
            .await?;
        let body = Self::check_status(response, "fetch").await?;

        let envelope: FetchResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::Deserialize {
                context: format!("vector fetch(id={id})"),
                source: e,
            })?;

        Ok(envelope
            .vectors
            .into_iter()
            .find(|(key, _)| key == id)
            .map(|(_, fetched)| fetched.values)
            .filter(|values| !values.is_empty()))
    }

    async fn upsert(&self, listing: &Listing, vector: &[f32]) -> Result<(), ProviderError> {
        let url = format!("{}/vectors/upsert", self.index_host);
        let request = UpsertRequest {
            vectors: vec![UpsertVector {
                id: &listing.id,
                values: vector,
                metadata: record_for(listing),
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(&request)
            .send()
            .await?;
        Self::check_status(response, "upsert").await?;
        tracing::debug!(listing_id = %listing.id, "indexed listing vector");
        Ok(())
    }
}
