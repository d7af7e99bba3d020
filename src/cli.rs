//! Command-line interface parsing
//!
//! This module defines the clap command tree. Every network-backed command
//! honors the global `--no-cache` and `--cache-dir` flags; formatting flags
//! default to the format most useful in a terminal for that command.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cite::CitationStyle;
use crate::data::SortBy;
use crate::output::OutputFormat;
use crate::prompts::{PaperPrompt, TikzPrompt};
use crate::tikz::TikzFormat;

/// arXiv literature research from the command line
#[derive(Parser, Debug)]
#[command(name = "arxscout")]
#[command(about = "Search, cite, and analyze arXiv papers")]
#[command(version)]
pub struct Cli {
    /// Bypass the response cache for this invocation
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Cache directory (defaults to the platform cache dir)
    #[arg(long, global = true, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search for papers
    Search {
        /// Search query
        query: String,
        /// Filter by category (e.g. cs.AI)
        #[arg(long, short)]
        category: Option<String>,
        /// Filter by author
        #[arg(long, short)]
        author: Option<String>,
        /// Number of results
        #[arg(long, short, default_value_t = 10)]
        limit: usize,
        /// Result ordering
        #[arg(long, value_enum, default_value_t = SortBy::Relevance)]
        sort: SortBy,
        /// Include citation counts from Semantic Scholar
        #[arg(long)]
        with_citations: bool,
        /// Output format
        #[arg(long, short, value_enum, default_value_t = OutputFormat::Brief)]
        format: OutputFormat,
    },

    /// Get details for one paper
    Paper {
        /// arXiv paper ID or URL
        paper_id: String,
        /// Include citation counts from Semantic Scholar
        #[arg(long)]
        with_citations: bool,
    },

    /// List recent papers in a category
    Recent {
        /// arXiv category (e.g. cs.AI)
        category: String,
        /// Number of results
        #[arg(long, short, default_value_t = 10)]
        limit: usize,
        /// Include citation counts from Semantic Scholar
        #[arg(long)]
        with_citations: bool,
        /// Output format
        #[arg(long, short, value_enum, default_value_t = OutputFormat::Brief)]
        format: OutputFormat,
    },

    /// Find papers similar to a given paper
    Similar {
        /// arXiv paper ID or URL
        paper_id: String,
        /// Number of results
        #[arg(long, short, default_value_t = 10)]
        limit: usize,
        /// Output format
        #[arg(long, short, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// List a paper's references
    References {
        /// arXiv paper ID or URL
        paper_id: String,
        /// Number of results
        #[arg(long, short, default_value_t = 50)]
        limit: usize,
        /// Output format
        #[arg(long, short, value_enum, default_value_t = OutputFormat::Brief)]
        format: OutputFormat,
    },

    /// Fetch a paper's full text
    Content {
        /// arXiv paper ID or URL
        paper_id: String,
    },

    /// Search papers by author
    ByAuthor {
        /// Author name
        author: String,
        /// Number of results
        #[arg(long, short, default_value_t = 10)]
        limit: usize,
        /// Include citation counts from Semantic Scholar
        #[arg(long)]
        with_citations: bool,
        /// Output format
        #[arg(long, short, value_enum, default_value_t = OutputFormat::Brief)]
        format: OutputFormat,
    },

    /// Generate citations
    Cite {
        #[command(subcommand)]
        command: CiteCommand,
    },

    /// Extract TikZ figures from paper sources
    Tikz {
        #[command(subcommand)]
        command: TikzCommand,
    },

    /// Analysis prompt templates
    Prompt {
        #[command(subcommand)]
        command: PromptCommand,
    },

    /// Inspect and maintain the response cache
    Cache {
        #[command(subcommand)]
        command: CacheCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum CiteCommand {
    /// BibTeX entry
    Bibtex { paper_id: String },
    /// APA 7th edition
    Apa { paper_id: String },
    /// IEEE style
    Ieee { paper_id: String },
    /// ACM reference format
    Acm { paper_id: String },
    /// Chicago author-date
    Chicago { paper_id: String },
    /// RIS for reference managers
    Ris { paper_id: String },
    /// Citations for multiple papers
    Batch {
        /// Comma-separated arXiv paper IDs
        paper_ids: String,
        /// Citation style
        #[arg(long, short, value_enum, default_value_t = CitationStyle::Bibtex)]
        format: CitationStyle,
    },
    /// Every citation style for one paper
    All { paper_id: String },
    /// Raw paper metadata as JSON
    Metadata { paper_id: String },
}

impl CiteCommand {
    /// The single-style commands, mapped to their style. Batch, all, and
    /// metadata return `None`.
    pub fn style(&self) -> Option<CitationStyle> {
        match self {
            CiteCommand::Bibtex { .. } => Some(CitationStyle::Bibtex),
            CiteCommand::Apa { .. } => Some(CitationStyle::Apa),
            CiteCommand::Ieee { .. } => Some(CitationStyle::Ieee),
            CiteCommand::Acm { .. } => Some(CitationStyle::Acm),
            CiteCommand::Chicago { .. } => Some(CitationStyle::Chicago),
            CiteCommand::Ris { .. } => Some(CitationStyle::Ris),
            _ => None,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum TikzCommand {
    /// Extract TikZ source code
    Extract {
        /// arXiv paper ID(s), comma-separated for batch
        paper_ids: String,
        /// Output format
        #[arg(long, short, value_enum, default_value_t = TikzFormat::Tikz)]
        format: TikzFormat,
    },
    /// Summarize the TikZ figures in a paper
    List {
        /// arXiv paper ID
        paper_id: String,
        /// Output format
        #[arg(long, short, value_enum, default_value_t = TikzFormat::Brief)]
        format: TikzFormat,
    },
    /// Extract figures and wrap them in an analysis prompt
    Analyze {
        /// arXiv paper ID
        paper_id: String,
        /// Type of analysis prompt
        #[arg(value_enum, default_value_t = TikzPrompt::Quick)]
        prompt: TikzPrompt,
        /// Figure rendering inside the prompt
        #[arg(long, short, value_enum, default_value_t = TikzFormat::Tikz)]
        format: TikzFormat,
    },
}

#[derive(Subcommand, Debug)]
pub enum PromptCommand {
    /// List available analysis prompts
    List,
    /// Print a specific prompt
    Get {
        /// Type of analysis prompt
        #[arg(value_enum)]
        prompt: PaperPrompt,
    },
    /// Fetch a paper's text and wrap it in an analysis prompt
    Analyze {
        /// arXiv paper ID or URL
        paper_id: String,
        /// Type of analysis prompt
        #[arg(value_enum, default_value_t = PaperPrompt::Quick)]
        prompt: PaperPrompt,
        /// Additional context for the analysis
        #[arg(long, short)]
        context: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum CacheCommand {
    /// Show entry counts and disk usage
    Stats,
    /// Delete entries past their TTL plus the grace period
    Purge,
    /// Delete all entries
    Clear,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_defaults() {
        let cli = Cli::parse_from(["arxscout", "search", "quantum computing"]);
        match cli.command {
            Command::Search {
                query,
                category,
                limit,
                sort,
                with_citations,
                format,
                ..
            } => {
                assert_eq!(query, "quantum computing");
                assert!(category.is_none());
                assert_eq!(limit, 10);
                assert_eq!(sort, SortBy::Relevance);
                assert!(!with_citations);
                assert_eq!(format, OutputFormat::Brief);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_search_with_filters() {
        let cli = Cli::parse_from([
            "arxscout",
            "search",
            "transformers",
            "--category",
            "cs.LG",
            "--author",
            "Vaswani",
            "--limit",
            "25",
            "--sort",
            "citations",
            "--with-citations",
            "--format",
            "markdown",
        ]);
        match cli.command {
            Command::Search {
                category,
                author,
                limit,
                sort,
                with_citations,
                format,
                ..
            } => {
                assert_eq!(category.as_deref(), Some("cs.LG"));
                assert_eq!(author.as_deref(), Some("Vaswani"));
                assert_eq!(limit, 25);
                assert_eq!(sort, SortBy::Citations);
                assert!(with_citations);
                assert_eq!(format, OutputFormat::Markdown);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_cache_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "arxscout",
            "paper",
            "2301.00001",
            "--no-cache",
            "--cache-dir",
            "/tmp/arx",
        ]);
        assert!(cli.no_cache);
        assert_eq!(cli.cache_dir.as_deref(), Some(std::path::Path::new("/tmp/arx")));
    }

    #[test]
    fn test_references_default_limit_is_higher() {
        let cli = Cli::parse_from(["arxscout", "references", "2301.00001"]);
        match cli.command {
            Command::References { limit, format, .. } => {
                assert_eq!(limit, 50);
                assert_eq!(format, OutputFormat::Brief);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_similar_defaults_to_json() {
        let cli = Cli::parse_from(["arxscout", "similar", "2301.00001"]);
        match cli.command {
            Command::Similar { format, limit, .. } => {
                assert_eq!(format, OutputFormat::Json);
                assert_eq!(limit, 10);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cite_style_subcommands_map_to_styles() {
        let cli = Cli::parse_from(["arxscout", "cite", "apa", "2301.00001"]);
        match cli.command {
            Command::Cite { command } => {
                assert_eq!(command.style(), Some(CitationStyle::Apa));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cite_batch_has_no_single_style() {
        let cli = Cli::parse_from([
            "arxscout",
            "cite",
            "batch",
            "2301.00001,2302.00002",
            "--format",
            "ris",
        ]);
        match cli.command {
            Command::Cite { command } => {
                assert!(command.style().is_none());
                match command {
                    CiteCommand::Batch { paper_ids, format } => {
                        assert_eq!(paper_ids, "2301.00001,2302.00002");
                        assert_eq!(format, CitationStyle::Ris);
                    }
                    other => panic!("unexpected cite command: {other:?}"),
                }
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_tikz_analyze_defaults() {
        let cli = Cli::parse_from(["arxscout", "tikz", "analyze", "2301.00001"]);
        match cli.command {
            Command::Tikz {
                command: TikzCommand::Analyze { prompt, format, .. },
            } => {
                assert_eq!(prompt, TikzPrompt::Quick);
                assert_eq!(format, TikzFormat::Tikz);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_prompt_analyze_with_context() {
        let cli = Cli::parse_from([
            "arxscout",
            "prompt",
            "analyze",
            "2301.00001",
            "critical",
            "--context",
            "focus on evaluation",
        ]);
        match cli.command {
            Command::Prompt {
                command: PromptCommand::Analyze {
                    paper_id,
                    prompt,
                    context,
                },
            } => {
                assert_eq!(paper_id, "2301.00001");
                assert_eq!(prompt, PaperPrompt::Critical);
                assert_eq!(context.as_deref(), Some("focus on evaluation"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cache_subcommands_parse() {
        for (arg, want_stats) in [("stats", true), ("purge", false), ("clear", false)] {
            let cli = Cli::parse_from(["arxscout", "cache", arg]);
            match cli.command {
                Command::Cache { command } => {
                    assert_eq!(matches!(command, CacheCommand::Stats), want_stats);
                }
                other => panic!("unexpected command: {other:?}"),
            }
        }
    }

    #[test]
    fn test_missing_subcommand_is_an_error() {
        assert!(Cli::try_parse_from(["arxscout"]).is_err());
    }

    #[test]
    fn test_invalid_sort_value_is_an_error() {
        assert!(Cli::try_parse_from(["arxscout", "search", "q", "--sort", "upside-down"]).is_err());
    }
}
