//! Wikipedia client over the MediaWiki action API
//!
//! A lookup runs one full-text search, then fetches the plain-text intro of
//! each hit and stitches them into `Page: … / Summary: …` blocks.

use std::time::Duration;

use async_trait::async_trait;
use mathsolver_core::ToolError;
use reqwest::Client;
use serde::Deserialize;

use super::EncyclopediaClient;

/// Returned when the search finds nothing usable
pub const NO_RESULT: &str = "No good Wikipedia Search Result was found";

const MAX_QUERY_CHARS: usize = 300;

/// Wikipedia client configuration
#[derive(Clone, Debug)]
pub struct WikipediaConfig {
    /// Language edition, e.g. `en`
    pub lang: String,

    /// Explicit API endpoint; derived from `lang` when `None`
    pub api_url: Option<String>,

    /// How many search hits to summarise
    pub top_k_results: usize,

    /// Output is cut to this many characters
    pub doc_content_chars_max: usize,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for WikipediaConfig {
    fn default() -> Self {
        Self {
            lang: "en".into(),
            api_url: None,
            top_k_results: 3,
            doc_content_chars_max: 4000,
            timeout_secs: 30,
        }
    }
}

impl WikipediaConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            lang: std::env::var("WIKIPEDIA_LANG").unwrap_or(defaults.lang),
            api_url: std::env::var("WIKIPEDIA_API_URL").ok(),
            ..defaults
        }
    }

    fn endpoint(&self) -> String {
        self.api_url
            .clone()
            .unwrap_or_else(|| format!("https://{}.wikipedia.org/w/api.php", self.lang))
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    query: Option<ExtractQuery>,
}

#[derive(Debug, Deserialize)]
struct ExtractQuery {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    title: String,
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    missing: bool,
}

/// MediaWiki-backed encyclopedia
pub struct WikipediaClient {
    client: Client,
    config: WikipediaConfig,
    endpoint: String,
}

impl WikipediaClient {
    pub fn new(config: WikipediaConfig) -> Result<Self, ToolError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("mathsolver/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ToolError::ServiceUnavailable(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint(),
            config,
        })
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        params: &[(&str, &str)],
    ) -> Result<T, ToolError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("format", "json"), ("formatversion", "2")])
            .query(params)
            .send()
            .await
            .map_err(|e| ToolError::ServiceUnavailable(e.to_string()))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(ToolError::ServiceUnavailable(format!("Wikipedia returned {status}")));
        }
        if !status.is_success() {
            return Err(ToolError::Lookup(format!("Wikipedia returned {status}")));
        }

        response
            .json()
            .await
            .map_err(|e| ToolError::Lookup(format!("Unexpected Wikipedia response: {e}")))
    }

    async fn search(&self, query: &str) -> Result<Vec<String>, ToolError> {
        let limit = self.config.top_k_results.to_string();
        let response: SearchResponse = self
            .get(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", limit.as_str()),
            ])
            .await?;

        Ok(response
            .query
            .map(|q| q.search.into_iter().map(|hit| hit.title).collect())
            .unwrap_or_default())
    }

    async fn summary(&self, title: &str) -> Result<Option<String>, ToolError> {
        let response: ExtractResponse = self
            .get(&[
                ("action", "query"),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("titles", title),
            ])
            .await?;

        Ok(response
            .query
            .and_then(|q| q.pages.into_iter().find(|p| !p.missing))
            .and_then(|page| {
                page.extract
                    .filter(|text| !text.trim().is_empty())
                    .map(|text| format!("Page: {}\nSummary: {}", page.title, text.trim()))
            }))
    }
}

#[async_trait]
impl EncyclopediaClient for WikipediaClient {
    async fn lookup(&self, query: &str) -> Result<String, ToolError> {
        let query: String = query.chars().take(MAX_QUERY_CHARS).collect();
        let titles = self.search(&query).await?;
        tracing::debug!(query = %query, hits = titles.len(), "Wikipedia search");

        let mut summaries = Vec::new();
        for title in titles.iter().take(self.config.top_k_results) {
            match self.summary(title).await {
                Ok(Some(summary)) => summaries.push(summary),
                Ok(None) => {}
                // A single broken page should not sink the whole lookup
                Err(ToolError::Lookup(e)) => {
                    tracing::warn!(title = %title, error = %e, "Skipping page");
                }
                Err(e) => return Err(e),
            }
        }

        if summaries.is_empty() {
            return Ok(NO_RESULT.into());
        }

        Ok(summaries
            .join("\n\n")
            .chars()
            .take(self.config.doc_content_chars_max)
            .collect())
    }

    fn name(&self) -> &str {
        "Wikipedia"
    }
}
