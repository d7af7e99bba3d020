//! Semantic Scholar Graph API client
//!
//! Provides citation counts, reference lists, and paper recommendations for
//! arXiv papers. The free tier allows roughly 100 requests per 5 minutes, so
//! the client spaces requests out and caches every answer. Papers unknown to
//! Semantic Scholar (HTTP 404) are reported as absent, not as errors.

use std::time::{Duration, Instant};

use log::debug;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::Mutex;

use super::{CitationStats, Paper, Reference, ARXIV_BASE};
use crate::cache::{ResponseCache, Signature, TtlClass};

/// Base URL for the Semantic Scholar Graph API
const API_BASE: &str = "https://api.semanticscholar.org/graph/v1";

/// Per-request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Minimum gap between requests (~100 requests per 5 minutes)
const POLITENESS_DELAY: Duration = Duration::from_millis(500);

/// Fixed wait before the single retry after an HTTP 429
const RATE_LIMIT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Errors that can occur when talking to Semantic Scholar
#[derive(Debug, Error)]
pub enum SemanticScholarError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Response body was not the expected JSON shape
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Client for the Semantic Scholar Graph API.
pub struct SemanticScholarClient {
    client: Client,
    api_key: Option<String>,
    cache: Option<ResponseCache>,
    last_request: Mutex<Option<Instant>>,
}

impl Default for SemanticScholarClient {
    fn default() -> Self {
        Self::new()
    }
}

impl SemanticScholarClient {
    /// Creates a client without caching or an API key.
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            api_key: None,
            cache: None,
            last_request: Mutex::new(None),
        }
    }

    /// Uses an API key (sent as `x-api-key`) for a higher rate limit.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Attaches a response cache consulted before every network call.
    pub fn with_cache(mut self, cache: ResponseCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Fetches citation counts for an arXiv paper. `None` when Semantic
    /// Scholar doesn't know the paper.
    pub async fn citations(
        &self,
        arxiv_id: &str,
    ) -> Result<Option<CitationStats>, SemanticScholarError> {
        let key = Signature::new("citations").param("id", arxiv_id).key();
        if let Some(stats) = self.cache.as_ref().and_then(|c| c.get_json(&key)) {
            return Ok(Some(stats));
        }

        let url = format!("{API_BASE}/paper/arXiv:{arxiv_id}");
        let Some(body) = self
            .get(&url, &[("fields", "citationCount,influentialCitationCount")])
            .await?
        else {
            return Ok(None);
        };

        let response: PaperResponse = serde_json::from_str(&body)?;
        let stats = CitationStats {
            citation_count: response.citation_count.unwrap_or(0),
            influential_citation_count: response.influential_citation_count.unwrap_or(0),
        };

        if let Some(cache) = &self.cache {
            cache.put_json(&key, &stats, TtlClass::Citations);
        }
        Ok(Some(stats))
    }

    /// Fetches the reference list (papers cited by) an arXiv paper.
    pub async fn references(
        &self,
        arxiv_id: &str,
        limit: usize,
    ) -> Result<Vec<Reference>, SemanticScholarError> {
        let key = Signature::new("references")
            .param("id", arxiv_id)
            .param("limit", &limit.to_string())
            .key();
        if let Some(refs) = self.cache.as_ref().and_then(|c| c.get_json(&key)) {
            return Ok(refs);
        }

        let url = format!("{API_BASE}/paper/arXiv:{arxiv_id}/references");
        let Some(body) = self
            .get(
                &url,
                &[
                    ("fields", "externalIds,title,authors,year"),
                    ("limit", &limit.to_string()),
                ],
            )
            .await?
        else {
            return Ok(Vec::new());
        };

        let response: ReferencesResponse = serde_json::from_str(&body)?;
        let references: Vec<Reference> = response
            .data
            .into_iter()
            .map(|entry| entry.cited_paper.into_reference())
            .collect();

        if let Some(cache) = &self.cache {
            cache.put_json(&key, &references, TtlClass::References);
        }
        Ok(references)
    }

    /// Fetches papers similar to an arXiv paper.
    pub async fn recommendations(
        &self,
        arxiv_id: &str,
        limit: usize,
    ) -> Result<Vec<Paper>, SemanticScholarError> {
        let key = Signature::new("similar")
            .param("id", arxiv_id)
            .param("limit", &limit.to_string())
            .key();
        if let Some(papers) = self.cache.as_ref().and_then(|c| c.get_json(&key)) {
            return Ok(papers);
        }

        let url = format!("{API_BASE}/paper/arXiv:{arxiv_id}/recommendations");
        let Some(body) = self
            .get(
                &url,
                &[
                    ("fields", "externalIds,title,authors,citationCount,year"),
                    ("limit", &limit.to_string()),
                ],
            )
            .await?
        else {
            return Ok(Vec::new());
        };

        let response: RecommendationsResponse = serde_json::from_str(&body)?;
        let papers: Vec<Paper> = response
            .recommended_papers
            .into_iter()
            .map(|p| p.into_paper())
            .collect();

        if let Some(cache) = &self.cache {
            cache.put_json(&key, &papers, TtlClass::Search);
        }
        Ok(papers)
    }

    /// Fills in citation counts on a list of papers. Lookup failures leave
    /// the counts unset rather than failing the whole batch.
    pub async fn enrich_with_citations(&self, papers: &mut [Paper]) {
        for paper in papers.iter_mut() {
            if paper.arxiv_id.is_empty() {
                continue;
            }
            match self.citations(&paper.arxiv_id).await {
                Ok(Some(stats)) => {
                    paper.citation_count = Some(stats.citation_count);
                    paper.influential_citation_count = Some(stats.influential_citation_count);
                }
                Ok(None) => {}
                Err(e) => debug!("citation lookup failed for {}: {e}", paper.arxiv_id),
            }
        }
    }

    /// GET with throttling, optional API key, a single fixed retry on HTTP
    /// 429, and 404 mapped to `None`.
    async fn get(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<Option<String>, SemanticScholarError> {
        self.throttle().await;

        let mut response = self.request(url, query).send().await?;
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            debug!("Semantic Scholar rate limit hit, retrying once after fixed delay");
            tokio::time::sleep(RATE_LIMIT_RETRY_DELAY).await;
            response = self.request(url, query).send().await?;
        }

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(response.error_for_status()?.text().await?))
    }

    fn request(&self, url: &str, query: &[(&str, &str)]) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .get(url)
            .query(query)
            .timeout(REQUEST_TIMEOUT);
        if let Some(api_key) = &self.api_key {
            builder = builder.header("x-api-key", api_key);
        }
        builder
    }

    async fn throttle(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < POLITENESS_DELAY {
                tokio::time::sleep(POLITENESS_DELAY - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

/// Single-paper response with citation fields.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaperResponse {
    citation_count: Option<u64>,
    influential_citation_count: Option<u64>,
}

/// `/references` response wrapper.
#[derive(Debug, Deserialize)]
struct ReferencesResponse {
    #[serde(default)]
    data: Vec<ReferenceEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReferenceEntry {
    cited_paper: CitedPaper,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CitedPaper {
    #[serde(default)]
    external_ids: Option<ExternalIds>,
    title: Option<String>,
    #[serde(default)]
    authors: Vec<AuthorRef>,
    year: Option<i32>,
}

impl CitedPaper {
    fn into_reference(self) -> Reference {
        Reference {
            arxiv_id: self.external_ids.and_then(|ids| ids.arxiv),
            title: self.title.unwrap_or_else(|| "Unknown".to_string()),
            authors: self.authors.into_iter().filter_map(|a| a.name).collect(),
            year: self.year,
        }
    }
}

/// `/recommendations` response wrapper.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecommendationsResponse {
    #[serde(default)]
    recommended_papers: Vec<RecommendedPaper>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecommendedPaper {
    #[serde(default)]
    external_ids: Option<ExternalIds>,
    title: Option<String>,
    #[serde(default)]
    authors: Vec<AuthorRef>,
    citation_count: Option<u64>,
    year: Option<i32>,
}

impl RecommendedPaper {
    fn into_paper(self) -> Paper {
        let arxiv_id = self
            .external_ids
            .and_then(|ids| ids.arxiv)
            .unwrap_or_default();
        let (url_abstract, url_pdf) = if arxiv_id.is_empty() {
            (String::new(), String::new())
        } else {
            (
                format!("{ARXIV_BASE}/abs/{arxiv_id}"),
                format!("{ARXIV_BASE}/pdf/{arxiv_id}.pdf"),
            )
        };
        Paper {
            arxiv_id,
            title: self.title.unwrap_or_else(|| "Unknown".to_string()),
            abstract_text: String::new(),
            authors: self.authors.into_iter().filter_map(|a| a.name).collect(),
            categories: Vec::new(),
            url_abstract,
            url_pdf,
            published: self.year.map(|y| y.to_string()),
            citation_count: self.citation_count,
            influential_citation_count: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ExternalIds {
    #[serde(rename = "ArXiv")]
    arxiv: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthorRef {
    name: Option<String>,
}
