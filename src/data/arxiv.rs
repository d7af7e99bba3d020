//! arXiv export API client
//!
//! Fetches search results and paper metadata from the arXiv Atom feed API
//! (`export.arxiv.org/api/query`) and e-print source archives. arXiv asks
//! for at most one request every three seconds, so the client throttles
//! itself and consults the response cache before every call.

use std::time::{Duration, Instant};

use log::{debug, warn};
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tokio::sync::Mutex;

use super::{clean_text, Paper, PaperMetadata, ARXIV_BASE};
use crate::cache::{ResponseCache, Signature, TtlClass};

/// Base URL for the arXiv export API
const ARXIV_EXPORT: &str = "https://export.arxiv.org";

/// Per-request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Minimum gap between requests (arXiv asks for 1 request per 3 seconds)
const POLITENESS_DELAY: Duration = Duration::from_secs(3);

/// Fixed wait before the single retry after an HTTP 429
const RATE_LIMIT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// The export API caps page sizes at 100 results
const MAX_RESULTS_CAP: usize = 100;

/// Errors that can occur when talking to arXiv
#[derive(Debug, Error)]
pub enum ArxivError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The Atom feed could not be parsed
    #[error("Failed to parse Atom feed: {0}")]
    Feed(String),
}

/// Sort order for search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SortBy {
    /// Feed relevance ranking
    Relevance,
    /// Newest submissions first
    DateDesc,
    /// Oldest submissions first
    DateAsc,
    /// By citation count (fetched from Semantic Scholar, sorted locally)
    Citations,
}

impl SortBy {
    /// Stable name used in cache keys.
    pub fn as_str(self) -> &'static str {
        match self {
            SortBy::Relevance => "relevance",
            SortBy::DateDesc => "date_desc",
            SortBy::DateAsc => "date_asc",
            SortBy::Citations => "citations",
        }
    }

    /// Maps to the export API `sortBy`/`sortOrder` parameters. Citation
    /// sorting has no API equivalent, so it falls back to relevance and the
    /// caller re-sorts after enrichment.
    fn api_params(self) -> (&'static str, &'static str) {
        match self {
            SortBy::Relevance | SortBy::Citations => ("relevance", "descending"),
            SortBy::DateDesc => ("submittedDate", "descending"),
            SortBy::DateAsc => ("submittedDate", "ascending"),
        }
    }
}

/// Parameters for a paper search.
#[derive(Debug, Clone)]
pub struct SearchParams {
    /// Free-text query matched against all fields; may be empty when
    /// searching by author or category only
    pub query: String,
    /// Restrict to an arXiv category, e.g. "cs.LG"
    pub category: Option<String>,
    /// Restrict to an author name
    pub author: Option<String>,
    /// Result ordering
    pub sort: SortBy,
    /// Number of results to return (capped at 100)
    pub limit: usize,
    /// 1-based result page
    pub page: usize,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            query: String::new(),
            category: None,
            author: None,
            sort: SortBy::Relevance,
            limit: 10,
            page: 1,
        }
    }
}

impl SearchParams {
    /// Builds the export API `search_query` expression.
    fn search_query(&self) -> String {
        let mut parts = Vec::new();
        if !self.query.is_empty() {
            parts.push(format!("all:{}", self.query));
        }
        if let Some(author) = &self.author {
            parts.push(format!("au:{author}"));
        }
        if let Some(category) = &self.category {
            parts.push(format!("cat:{category}"));
        }
        if parts.is_empty() {
            "all:*".to_string()
        } else {
            parts.join(" AND ")
        }
    }

    /// Cache signature identifying this logical search.
    fn signature(&self) -> Signature {
        Signature::new("search")
            .param("q", &self.query)
            .opt_param("cat", self.category.as_deref())
            .opt_param("au", self.author.as_deref())
            .param("sort", self.sort.as_str())
            .param("limit", &self.limit.min(MAX_RESULTS_CAP).to_string())
            .param("page", &self.page.to_string())
    }
}

/// Client for the arXiv export API.
pub struct ArxivClient {
    client: Client,
    cache: Option<ResponseCache>,
    last_request: Mutex<Option<Instant>>,
}

impl Default for ArxivClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ArxivClient {
    /// Creates a client without caching.
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            cache: None,
            last_request: Mutex::new(None),
        }
    }

    /// Attaches a response cache consulted before every network call.
    pub fn with_cache(mut self, cache: ResponseCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Searches arXiv for papers.
    pub async fn search(&self, params: &SearchParams) -> Result<Vec<Paper>, ArxivError> {
        let key = params.signature().key();
        if let Some(papers) = self.cache.as_ref().and_then(|c| c.get_json::<Vec<Paper>>(&key)) {
            return Ok(papers);
        }

        let max_results = params.limit.min(MAX_RESULTS_CAP);
        let start = params.page.saturating_sub(1) * max_results;
        let (sort_by, sort_order) = params.sort.api_params();

        let text = self
            .get_text(&[
                ("search_query", params.search_query().as_str()),
                ("start", &start.to_string()),
                ("max_results", &max_results.to_string()),
                ("sortBy", sort_by),
                ("sortOrder", sort_order),
            ])
            .await?;

        let papers: Vec<Paper> = parse_atom_feed(&text)?
            .into_iter()
            .map(Paper::from)
            .collect();

        if let Some(cache) = &self.cache {
            cache.put_json(&key, &papers, TtlClass::Search);
        }
        Ok(papers)
    }

    /// Fetches recent papers in a category, newest first.
    pub async fn recent(&self, category: &str, limit: usize) -> Result<Vec<Paper>, ArxivError> {
        self.search(&SearchParams {
            category: Some(category.to_string()),
            sort: SortBy::DateDesc,
            limit,
            ..SearchParams::default()
        })
        .await
    }

    /// Fetches full metadata for a single paper. Returns `None` when the
    /// feed has no entry for the ID.
    pub async fn metadata(&self, arxiv_id: &str) -> Result<Option<PaperMetadata>, ArxivError> {
        let key = paper_key(arxiv_id);
        if let Some(meta) = self.cache.as_ref().and_then(|c| c.get_json(&key)) {
            return Ok(Some(meta));
        }

        let text = self.get_text(&[("id_list", arxiv_id)]).await?;
        let meta = parse_atom_feed(&text)?.into_iter().next();
        if let (Some(cache), Some(meta)) = (&self.cache, &meta) {
            cache.put_json(&key, meta, TtlClass::Metadata);
        }
        Ok(meta)
    }

    /// Fetches metadata for several papers in one feed request, serving
    /// already-cached papers from the cache. Unknown IDs are silently
    /// absent from the result.
    pub async fn metadata_batch(
        &self,
        arxiv_ids: &[String],
    ) -> Result<Vec<PaperMetadata>, ArxivError> {
        let mut found: Vec<PaperMetadata> = Vec::new();
        let mut missing: Vec<&str> = Vec::new();
        for id in arxiv_ids {
            match self.cache.as_ref().and_then(|c| c.get_json(&paper_key(id))) {
                Some(meta) => found.push(meta),
                None => missing.push(id),
            }
        }

        if !missing.is_empty() {
            let id_list = missing.join(",");
            let text = self
                .get_text(&[
                    ("id_list", id_list.as_str()),
                    ("max_results", &missing.len().to_string()),
                ])
                .await?;
            for meta in parse_atom_feed(&text)? {
                if let Some(cache) = &self.cache {
                    cache.put_json(&paper_key(&meta.arxiv_id), &meta, TtlClass::Metadata);
                }
                found.push(meta);
            }
        }

        // Return papers in the order they were asked for.
        let mut ordered = Vec::with_capacity(found.len());
        for id in arxiv_ids {
            if let Some(pos) = found.iter().position(|m| &m.arxiv_id == id) {
                ordered.push(found.swap_remove(pos));
            }
        }
        Ok(ordered)
    }

    /// Downloads the e-print source archive for a paper.
    ///
    /// Returns `None` when arXiv has no source for the paper (PDF-only
    /// submissions answer 403).
    pub async fn download_source(&self, arxiv_id: &str) -> Result<Option<Vec<u8>>, ArxivError> {
        self.throttle().await;

        let url = format!("{ARXIV_BASE}/e-print/{arxiv_id}");
        let response = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(60))
            .send()
            .await?;

        if !response.status().is_success() {
            warn!("no e-print source for {arxiv_id}: HTTP {}", response.status());
            return Ok(None);
        }
        Ok(Some(response.bytes().await?.to_vec()))
    }

    /// GET on the export API with throttling and a single fixed retry on
    /// HTTP 429.
    async fn get_text(&self, query: &[(&str, &str)]) -> Result<String, ArxivError> {
        self.throttle().await;

        let url = format!("{ARXIV_EXPORT}/api/query");
        let mut response = self
            .client
            .get(&url)
            .query(query)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            debug!("arXiv rate limit hit, retrying once after fixed delay");
            tokio::time::sleep(RATE_LIMIT_RETRY_DELAY).await;
            response = self
                .client
                .get(&url)
                .query(query)
                .timeout(REQUEST_TIMEOUT)
                .send()
                .await?;
        }

        Ok(response.error_for_status()?.text().await?)
    }

    /// Enforces the gap between consecutive requests.
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

/// Cache key for a single paper's metadata.
fn paper_key(arxiv_id: &str) -> String {
    Signature::new("paper").param("id", arxiv_id).key()
}

/// Accumulator for one `<entry>` while walking the feed.
#[derive(Default)]
struct EntryBuilder {
    id: String,
    title: String,
    summary: String,
    authors: Vec<String>,
    current_author: String,
    categories: Vec<String>,
    published: String,
    updated: String,
    doi: String,
    journal_ref: String,
}

impl EntryBuilder {
    fn finish(self) -> Option<PaperMetadata> {
        let id_re = Regex::new(r"abs/(\d+\.\d+)").expect("static pattern");
        let arxiv_id = id_re.captures(&self.id)?[1].to_string();
        Some(PaperMetadata {
            arxiv_id,
            title: clean_text(&self.title),
            authors: self.authors,
            abstract_text: clean_text(&self.summary),
            categories: self.categories,
            published: self.published.trim().to_string(),
            updated: non_empty(self.updated),
            doi: non_empty(self.doi),
            journal_ref: non_empty(self.journal_ref),
        })
    }
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Parses an arXiv Atom feed into paper metadata. Entries without a
/// recognizable ID are skipped.
pub fn parse_atom_feed(xml: &str) -> Result<Vec<PaperMetadata>, ArxivError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);

    let mut papers = Vec::new();
    let mut entry: Option<EntryBuilder> = None;
    let mut in_author = false;
    // Name of the element whose text we are currently collecting.
    let mut field: Option<&'static str> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"entry" => entry = Some(EntryBuilder::default()),
                b"author" => in_author = true,
                b"id" => field = Some("id"),
                b"title" => field = Some("title"),
                b"summary" => field = Some("summary"),
                b"name" => field = Some("name"),
                b"published" => field = Some("published"),
                b"updated" => field = Some("updated"),
                b"doi" => field = Some("doi"),
                b"journal_ref" => field = Some("journal_ref"),
                b"category" => push_category_term(e, &mut entry),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => {
                if e.local_name().as_ref() == b"category" {
                    push_category_term(e, &mut entry);
                }
            }
            Ok(Event::Text(ref t)) => {
                if let (Some(entry), Some(field)) = (entry.as_mut(), field) {
                    let text = t
                        .unescape()
                        .map_err(|e| ArxivError::Feed(e.to_string()))?;
                    let target = match field {
                        "id" => Some(&mut entry.id),
                        "title" => Some(&mut entry.title),
                        "summary" => Some(&mut entry.summary),
                        "name" if in_author => Some(&mut entry.current_author),
                        "published" => Some(&mut entry.published),
                        "updated" => Some(&mut entry.updated),
                        "doi" => Some(&mut entry.doi),
                        "journal_ref" => Some(&mut entry.journal_ref),
                        _ => None,
                    };
                    if let Some(target) = target {
                        target.push_str(&text);
                    }
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"entry" => {
                    if let Some(done) = entry.take().and_then(EntryBuilder::finish) {
                        papers.push(done);
                    }
                }
                b"author" => {
                    in_author = false;
                    if let Some(entry) = entry.as_mut() {
                        let name = entry.current_author.trim().to_string();
                        if !name.is_empty() {
                            entry.authors.push(name);
                        }
                        entry.current_author.clear();
                    }
                }
                _ => field = None,
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(ArxivError::Feed(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(papers)
}

/// Reads the `term` attribute of a `<category>` element.
fn push_category_term(e: &quick_xml::events::BytesStart, entry: &mut Option<EntryBuilder>) {
    let Some(entry) = entry.as_mut() else {
        return;
    };
    for attr in e.attributes().flatten() {
        if attr.key.local_name().as_ref() == b"term" {
            if let Ok(term) = attr.unescape_value() {
                if !term.is_empty() {
                    entry.categories.push(term.to_string());
                }
            }
        }
    }
}
