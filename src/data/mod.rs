//! Core data models and API clients
//!
//! This module contains the data types shared across the application for
//! representing papers, citation data, and references, plus one client
//! submodule per upstream service.

pub mod arxiv;
pub mod jina;
pub mod paper_id;
pub mod semantic_scholar;

pub use arxiv::{ArxivClient, ArxivError, SearchParams, SortBy};
pub use jina::{ReaderClient, ReaderError};
pub use paper_id::{clean_text, extract_paper_id};
pub use semantic_scholar::{SemanticScholarClient, SemanticScholarError};

use serde::{Deserialize, Serialize};

/// Base URL for arXiv paper pages
pub const ARXIV_BASE: &str = "https://arxiv.org";

/// An academic paper as presented in search results and listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paper {
    /// arXiv identifier, e.g. "2301.00001"
    pub arxiv_id: String,
    /// Paper title with whitespace normalized
    pub title: String,
    /// Abstract text, empty when the source view doesn't include one
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    /// Author names in publication order
    pub authors: Vec<String>,
    /// arXiv category tags, e.g. "cs.LG"
    pub categories: Vec<String>,
    /// Link to the abstract page
    pub url_abstract: String,
    /// Link to the PDF
    pub url_pdf: String,
    /// Publication date as reported by the feed, if known
    pub published: Option<String>,
    /// Total citation count from Semantic Scholar, once enriched
    pub citation_count: Option<u64>,
    /// Influential citation count from Semantic Scholar, once enriched
    pub influential_citation_count: Option<u64>,
}

/// Full paper metadata from the arXiv export API, as needed for citation
/// generation (includes DOI and journal reference, which search results
/// don't carry).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperMetadata {
    /// arXiv identifier
    pub arxiv_id: String,
    /// Paper title
    pub title: String,
    /// Author names in publication order
    pub authors: Vec<String>,
    /// Abstract text
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    /// arXiv category tags
    pub categories: Vec<String>,
    /// First-submission timestamp from the feed
    pub published: String,
    /// Last-update timestamp, if present
    pub updated: Option<String>,
    /// DOI, when the paper has one
    pub doi: Option<String>,
    /// Journal reference, when published outside arXiv
    pub journal_ref: Option<String>,
}

impl From<PaperMetadata> for Paper {
    fn from(meta: PaperMetadata) -> Self {
        let url_abstract = format!("{ARXIV_BASE}/abs/{}", meta.arxiv_id);
        let url_pdf = format!("{ARXIV_BASE}/pdf/{}.pdf", meta.arxiv_id);
        Paper {
            arxiv_id: meta.arxiv_id,
            title: meta.title,
            abstract_text: meta.abstract_text,
            authors: meta.authors,
            categories: meta.categories,
            url_abstract,
            url_pdf,
            published: Some(meta.published),
            citation_count: None,
            influential_citation_count: None,
        }
    }
}

/// Citation counts for one paper.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CitationStats {
    /// Total citations
    pub citation_count: u64,
    /// Citations judged influential by Semantic Scholar
    pub influential_citation_count: u64,
}

/// One entry in a paper's reference list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reference {
    /// arXiv ID of the cited paper, when Semantic Scholar knows it
    pub arxiv_id: Option<String>,
    /// Title of the cited paper
    pub title: String,
    /// Author names
    pub authors: Vec<String>,
    /// Publication year
    pub year: Option<i32>,
}
