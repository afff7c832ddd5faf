use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Bearer tokens accepted by the API; empty disables auth in development.
    pub api_keys: Vec<String>,
    /// Exa search API key; `None` disables the search provider.
    pub exa_api_key: Option<String>,
    /// OpenAI API key; `None` disables embeddings and the concierge LLM.
    pub openai_api_key: Option<String>,
    /// Pinecone API key; `None` disables similarity search.
    pub pinecone_api_key: Option<String>,
    /// Data-plane host of the Pinecone index (e.g. `https://idx-abc.svc.pinecone.io`).
    pub pinecone_index_host: Option<String>,
    pub provider_timeout_secs: u64,
    pub user_agent: String,
    /// How many raw results to request from the search provider per query.
    pub search_num_results: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("api_keys", &format!("[redacted; {}]", self.api_keys.len()))
            .field("exa_api_key", &self.exa_api_key.as_ref().map(|_| "[redacted]"))
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "pinecone_api_key",
                &self.pinecone_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("pinecone_index_host", &self.pinecone_index_host)
            .field("provider_timeout_secs", &self.provider_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("search_num_results", &self.search_num_results)
            .finish()
    }
}
