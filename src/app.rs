//! Command execution
//!
//! [`App`] wires the API clients to the parsed CLI command and renders each
//! result to a string for printing. Each client gets its own clone of the
//! response cache; the cache maintenance commands operate on the cache
//! directly.

use anyhow::{anyhow, Context, Result};
use log::info;

use crate::cache::ResponseCache;
use crate::cite::CitationStyle;
use crate::cli::{CacheCommand, Cli, CiteCommand, Command, PromptCommand, TikzCommand};
use crate::data::{
    extract_paper_id, ArxivClient, Paper, PaperMetadata, ReaderClient, SearchParams,
    SemanticScholarClient, SortBy,
};
use crate::output::{format_papers, format_references};
use crate::prompts;
use crate::tikz::{self, TikzFigure};

/// Environment variable holding an optional Semantic Scholar API key
const S2_API_KEY_VAR: &str = "S2_API_KEY";

/// Holds the API clients and executes one parsed command.
pub struct App {
    arxiv: ArxivClient,
    scholar: SemanticScholarClient,
    reader: ReaderClient,
    cache: Option<ResponseCache>,
}

impl App {
    /// Builds the app from the global CLI flags: resolves the cache
    /// directory and hands each client its own cache handle.
    pub fn from_cli(cli: &Cli) -> Self {
        let cache = if cli.no_cache {
            None
        } else {
            match &cli.cache_dir {
                Some(dir) => Some(ResponseCache::open_at(dir.clone())),
                None => ResponseCache::open(),
            }
        };

        let mut scholar = SemanticScholarClient::new();
        if let Ok(api_key) = std::env::var(S2_API_KEY_VAR) {
            scholar = scholar.with_api_key(api_key);
        }

        let (arxiv, reader) = match &cache {
            Some(cache) => {
                scholar = scholar.with_cache(cache.clone());
                (
                    ArxivClient::new().with_cache(cache.clone()),
                    ReaderClient::new().with_cache(cache.clone()),
                )
            }
            None => (ArxivClient::new(), ReaderClient::new()),
        };

        Self {
            arxiv,
            scholar,
            reader,
            cache,
        }
    }

    /// Executes a command, returning the text to print on stdout.
    pub async fn run(&self, command: Command) -> Result<String> {
        match command {
            Command::Search {
                query,
                category,
                author,
                limit,
                sort,
                with_citations,
                format,
            } => {
                let params = SearchParams {
                    query: query.clone(),
                    category,
                    author,
                    sort,
                    limit,
                    ..SearchParams::default()
                };
                let mut papers = self.arxiv.search(&params).await?;
                if with_citations || sort == SortBy::Citations {
                    self.scholar.enrich_with_citations(&mut papers).await;
                }
                if sort == SortBy::Citations {
                    papers.sort_by(|a, b| {
                        b.citation_count
                            .unwrap_or(0)
                            .cmp(&a.citation_count.unwrap_or(0))
                    });
                }
                Ok(format_papers(&papers, format, &query))
            }

            Command::Paper {
                paper_id,
                with_citations,
            } => {
                let arxiv_id = resolve_id(&paper_id)?;
                let meta = self.require_metadata(&arxiv_id).await?;
                let mut paper = Paper::from(meta);
                if with_citations {
                    self.scholar
                        .enrich_with_citations(std::slice::from_mut(&mut paper))
                        .await;
                }
                serde_json::to_string_pretty(&paper).context("serializing paper")
            }

            Command::Recent {
                category,
                limit,
                with_citations,
                format,
            } => {
                let mut papers = self.arxiv.recent(&category, limit).await?;
                if with_citations {
                    self.scholar.enrich_with_citations(&mut papers).await;
                }
                Ok(format_papers(&papers, format, &category))
            }

            Command::Similar {
                paper_id,
                limit,
                format,
            } => {
                let arxiv_id = resolve_id(&paper_id)?;
                let papers = self.scholar.recommendations(&arxiv_id, limit).await?;
                Ok(format_papers(&papers, format, ""))
            }

            Command::References {
                paper_id,
                limit,
                format,
            } => {
                let arxiv_id = resolve_id(&paper_id)?;
                let references = self.scholar.references(&arxiv_id, limit).await?;
                Ok(format_references(&references, format, &arxiv_id))
            }

            Command::Content { paper_id } => Ok(self.reader.content(&paper_id).await?),

            Command::ByAuthor {
                author,
                limit,
                with_citations,
                format,
            } => {
                let params = SearchParams {
                    author: Some(author.clone()),
                    limit,
                    ..SearchParams::default()
                };
                let mut papers = self.arxiv.search(&params).await?;
                if with_citations {
                    self.scholar.enrich_with_citations(&mut papers).await;
                }
                Ok(format_papers(&papers, format, &author))
            }

            Command::Cite { command } => self.run_cite(command).await,
            Command::Tikz { command } => self.run_tikz(command).await,
            Command::Prompt { command } => self.run_prompt(command).await,
            Command::Cache { command } => self.run_cache(command),
        }
    }

    async fn run_cite(&self, command: CiteCommand) -> Result<String> {
        match command {
            CiteCommand::Bibtex { ref paper_id }
            | CiteCommand::Apa { ref paper_id }
            | CiteCommand::Ieee { ref paper_id }
            | CiteCommand::Acm { ref paper_id }
            | CiteCommand::Chicago { ref paper_id }
            | CiteCommand::Ris { ref paper_id } => {
                // style() is Some for exactly these variants.
                let style = command.style().unwrap_or(CitationStyle::Bibtex);
                let meta = self.require_metadata(&resolve_id(paper_id)?).await?;
                Ok(style.format(&meta))
            }
            CiteCommand::Batch { paper_ids, format } => {
                let ids = resolve_ids(&paper_ids)?;
                let metas = self.arxiv.metadata_batch(&ids).await?;
                let citations: Vec<String> =
                    metas.iter().map(|meta| format.format(meta)).collect();
                Ok(citations.join("\n\n"))
            }
            CiteCommand::All { paper_id } => {
                let meta = self.require_metadata(&resolve_id(&paper_id)?).await?;
                let sections: Vec<String> = CitationStyle::ALL
                    .iter()
                    .map(|style| format!("=== {} ===\n{}", style.name(), style.format(&meta)))
                    .collect();
                Ok(sections.join("\n\n"))
            }
            CiteCommand::Metadata { paper_id } => {
                let meta = self.require_metadata(&resolve_id(&paper_id)?).await?;
                serde_json::to_string_pretty(&meta).context("serializing metadata")
            }
        }
    }

    async fn run_tikz(&self, command: TikzCommand) -> Result<String> {
        match command {
            TikzCommand::Extract { paper_ids, format } => {
                let ids = resolve_ids(&paper_ids)?;
                let mut figures = Vec::new();
                for id in &ids {
                    figures.extend(self.extract_figures(id).await?);
                }
                let label = if ids.len() == 1 {
                    ids[0].clone()
                } else {
                    format!("{} papers", ids.len())
                };
                Ok(format.render(&label, &figures))
            }
            TikzCommand::List { paper_id, format } => {
                let arxiv_id = resolve_id(&paper_id)?;
                let figures = self.extract_figures(&arxiv_id).await?;
                Ok(format.render(&arxiv_id, &figures))
            }
            TikzCommand::Analyze {
                paper_id,
                prompt,
                format,
            } => {
                let arxiv_id = resolve_id(&paper_id)?;
                let figures = self.extract_figures(&arxiv_id).await?;
                if figures.is_empty() {
                    return Ok(format!("No TikZ figures found in {arxiv_id}"));
                }
                let rendered = format.render(&arxiv_id, &figures);
                Ok(prompts::tikz_analysis_request(
                    &arxiv_id,
                    figures.len(),
                    &rendered,
                    prompt,
                ))
            }
        }
    }

    async fn run_prompt(&self, command: PromptCommand) -> Result<String> {
        match command {
            PromptCommand::List => Ok(prompts::list_prompts()),
            PromptCommand::Get { prompt } => Ok(prompt.template().to_string()),
            PromptCommand::Analyze {
                paper_id,
                prompt,
                context,
            } => {
                let content = self.reader.content(&paper_id).await?;
                Ok(prompts::analysis_request(
                    &content,
                    prompt,
                    context.as_deref(),
                ))
            }
        }
    }

    fn run_cache(&self, command: CacheCommand) -> Result<String> {
        let cache = self
            .cache
            .as_ref()
            .ok_or_else(|| anyhow!("cache is disabled (--no-cache or no cache directory)"))?;
        match command {
            CacheCommand::Stats => {
                let stats = cache.stats();
                Ok(format!(
                    "Cache directory: {}\nEntries: {} ({} expired)\nSize: {} bytes",
                    stats.dir.display(),
                    stats.entries,
                    stats.expired,
                    stats.total_bytes
                ))
            }
            CacheCommand::Purge => {
                let removed = cache.purge_expired();
                Ok(format!("Removed {removed} expired cache entries"))
            }
            CacheCommand::Clear => {
                let removed = cache.clear();
                Ok(format!("Removed {removed} cache entries"))
            }
        }
    }

    /// Downloads a paper's source and extracts its TikZ figures. Papers
    /// without downloadable source yield no figures.
    async fn extract_figures(&self, arxiv_id: &str) -> Result<Vec<TikzFigure>> {
        info!("downloading source for {arxiv_id}");
        match self.arxiv.download_source(arxiv_id).await? {
            Some(archive) => {
                let figures = tikz::extract_from_archive(arxiv_id, &archive)?;
                info!("found {} TikZ figure(s) in {arxiv_id}", figures.len());
                Ok(figures)
            }
            None => Ok(Vec::new()),
        }
    }

    async fn require_metadata(&self, arxiv_id: &str) -> Result<PaperMetadata> {
        self.arxiv
            .metadata(arxiv_id)
            .await?
            .ok_or_else(|| anyhow!("no arXiv paper found for ID: {arxiv_id}"))
    }
}

/// Normalizes one ID-or-URL argument to a bare arXiv ID.
fn resolve_id(paper_id: &str) -> Result<String> {
    extract_paper_id(paper_id).ok_or_else(|| anyhow!("invalid arXiv ID or URL: {paper_id}"))
}

/// Normalizes a comma-separated ID list, rejecting the whole list when any
/// element is unrecognizable.
fn resolve_ids(paper_ids: &str) -> Result<Vec<String>> {
    paper_ids
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(resolve_id)
        .collect()
}
