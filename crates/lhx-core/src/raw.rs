use serde::{Deserialize, Serialize};

/// One raw result from the hosted search provider, before normalization.
///
/// Only `url` is guaranteed; everything else is best-effort text the provider
/// happened to crawl.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSearchResult {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
}

impl RawSearchResult {
    /// Title, body text, and highlight sentences concatenated for extraction.
    #[must_use]
    pub fn combined_text(&self) -> String {
        format!(
            "{} {} {}",
            self.title.as_deref().unwrap_or(""),
            self.text.as_deref().unwrap_or(""),
            self.highlights.join(" ")
        )
    }
}
