//! Clients for the hosted services this application delegates to: neural
//! search, embedding generation, chat completion, and vector similarity.
//!
//! Each collaborator sits behind a single-method trait so request handlers
//! take an injected `Arc<dyn …>` instead of a concrete SDK type. Calls are
//! single-attempt: failures surface as one [`ProviderError`] and are never
//! retried here.

pub mod chat;
pub mod embedding;
pub mod error;
pub mod search;
pub mod types;
pub mod vector;

pub use chat::{ChatProvider, OpenAiChat};
pub use embedding::{EmbeddingProvider, OpenAiEmbeddings};
pub use error::ProviderError;
pub use search::{ExaClient, SearchProvider};
pub use types::{SearchOptions, VectorFilter, VectorMatch, VectorRecord};
pub use vector::{PineconeClient, VectorIndex};
