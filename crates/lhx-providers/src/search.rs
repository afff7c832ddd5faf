//! HTTP client for the Exa neural search API.
//!
//! Wraps `reqwest` with typed request/response envelopes and surfaces
//! non-success statuses as [`ProviderError::Api`]. One attempt per call;
//! the caller decides what a failed search means for its response.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use lhx_core::RawSearchResult;

use crate::error::ProviderError;
use crate::types::SearchOptions;

const DEFAULT_BASE_URL: &str = "https://api.exa.ai";

/// Hosted full-text/neural search over retailer product pages.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Runs one search and returns the provider's raw results.
    async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<RawSearchResult>, ProviderError>;
}

/// Client for the Exa `/search` endpoint.
///
/// Use [`ExaClient::new`] for production or [`ExaClient::with_base_url`] to
/// point at a mock server in tests.
pub struct ExaClient {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExaSearchRequest<'a> {
    query: &'a str,
    #[serde(rename = "type")]
    search_type: &'a str,
    num_results: usize,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    include_domains: &'a [String],
    livecrawl: &'a str,
    contents: ExaContents,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExaContents {
    text: ExaTextOptions,
    highlights: ExaHighlightOptions,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExaTextOptions {
    max_characters: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExaHighlightOptions {
    num_sentences: usize,
}

#[derive(Deserialize)]
struct ExaSearchResponse {
    results: Vec<RawSearchResult>,
}

impl ExaClient {
    /// Creates a client pointed at the production Exa API.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, ProviderError> {
        Self::with_base_url(api_key, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }
}

#[async_trait]
impl SearchProvider for ExaClient {
    async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<RawSearchResult>, ProviderError> {
        let url = format!("{}/search", self.base_url);
        let request = ExaSearchRequest {
            query,
            search_type: "neural",
            num_results: options.num_results,
            include_domains: &options.include_domains,
            livecrawl: "always",
            contents: ExaContents {
                text: ExaTextOptions {
                    max_characters: options.max_text_chars,
                },
                highlights: ExaHighlightOptions {
                    num_sentences: options.highlight_sentences,
                },
            },
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                provider: "Exa",
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let envelope: ExaSearchResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::Deserialize {
                context: format!("search(query={query})"),
                source: e,
            })?;

        tracing::debug!(
            query,
            result_count = envelope.results.len(),
            "search provider returned results"
        );
        Ok(envelope.results)
    }
}
