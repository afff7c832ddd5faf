mod api;
mod middleware;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use lhx_providers::{
    ChatProvider, EmbeddingProvider, ExaClient, OpenAiChat, OpenAiEmbeddings, PineconeClient,
    SearchProvider, VectorIndex,
};

use crate::{
    api::{build_app, default_rate_limiter, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(lhx_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let state = build_state(Arc::clone(&config))?;

    let is_development = matches!(config.env, lhx_core::Environment::Development);
    let auth = AuthState::new(&config.api_keys, is_development)?;
    let app = build_app(state, auth, default_rate_limiter());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Constructs the once-per-process provider clients from configuration.
///
/// A missing API key disables that provider with a warning; the routes it
/// backs degrade gracefully instead of failing at startup.
fn build_state(config: Arc<lhx_core::AppConfig>) -> anyhow::Result<AppState> {
    let timeout = config.provider_timeout_secs;
    let user_agent = config.user_agent.clone();

    let search: Option<Arc<dyn SearchProvider>> = match &config.exa_api_key {
        Some(key) => Some(Arc::new(ExaClient::new(key, timeout, &user_agent)?)),
        None => {
            tracing::warn!("EXA_API_KEY not set; listing search disabled");
            None
        }
    };

    let embeddings: Option<Arc<dyn EmbeddingProvider>> = match &config.openai_api_key {
        Some(key) => Some(Arc::new(OpenAiEmbeddings::new(key, timeout, &user_agent)?)),
        None => {
            tracing::warn!("OPENAI_API_KEY not set; embeddings disabled");
            None
        }
    };

    let chat: Option<Arc<dyn ChatProvider>> = match &config.openai_api_key {
        Some(key) => Some(Arc::new(OpenAiChat::new(key, timeout, &user_agent)?)),
        None => None,
    };

    let vectors: Option<Arc<dyn VectorIndex>> =
        match (&config.pinecone_api_key, &config.pinecone_index_host) {
            (Some(key), Some(host)) => {
                Some(Arc::new(PineconeClient::new(key, host, timeout, &user_agent)?))
            }
            (Some(_), None) => {
                tracing::warn!(
                    "PINECONE_API_KEY set but PINECONE_INDEX_HOST missing; similarity disabled"
                );
                None
            }
            _ => {
                tracing::warn!("PINECONE_API_KEY not set; similarity search disabled");
                None
            }
        };

    Ok(AppState {
        config,
        search,
        embeddings,
        chat,
        vectors,
    })
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c()
        .await
        .expect("failed to listen for ctrl-c");

    tracing::info!("shutdown signal received, draining connections");
}
