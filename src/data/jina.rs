//! Jina Reader client for full-text retrieval
//!
//! Jina Reader (`r.jina.ai`) renders a web page as plain text suitable for
//! analysis. Given an arXiv ID the client targets the abstract page; any
//! other URL is passed through as-is.

use std::time::Duration;

use reqwest::Client;
use thiserror::Error;

use super::{extract_paper_id, ARXIV_BASE};
use crate::cache::{ResponseCache, Signature, TtlClass};

/// Base URL of the Jina Reader proxy
const JINA_READER: &str = "https://r.jina.ai";

/// Rendering a full paper page can be slow, so this timeout is generous.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Errors that can occur when fetching page text
#[derive(Debug, Error)]
pub enum ReaderError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Client for fetching page text through Jina Reader.
pub struct ReaderClient {
    client: Client,
    cache: Option<ResponseCache>,
}

impl Default for ReaderClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ReaderClient {
    /// Creates a client without caching.
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            cache: None,
        }
    }

    /// Attaches a response cache consulted before every network call.
    pub fn with_cache(mut self, cache: ResponseCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Fetches the plain-text rendering of a paper or URL.
    pub async fn content(&self, id_or_url: &str) -> Result<String, ReaderError> {
        let target = match extract_paper_id(id_or_url) {
            Some(id) => format!("{ARXIV_BASE}/abs/{id}"),
            None if id_or_url.starts_with("http") => id_or_url.to_string(),
            None => format!("{ARXIV_BASE}/abs/{id_or_url}"),
        };

        let key = Signature::new("content").param("url", &target).key();
        if let Some(text) = self.cache.as_ref().and_then(|c| c.get(&key)) {
            return Ok(text);
        }

        let url = format!("{JINA_READER}/{target}");
        let text = self
            .client
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        if let Some(cache) = &self.cache {
            cache.put(&key, &text, TtlClass::Content);
        }
        Ok(text)
    }
}
