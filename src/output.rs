//! Output rendering for papers and references
//!
//! Every listing command supports the same four formats. JSON is the default
//! and is machine-readable; brief targets terminals, csv spreadsheets, and
//! markdown notes or reports.

use chrono::Local;
use clap::ValueEnum;

use crate::data::{Paper, Reference};

/// How paper and reference listings are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Machine-readable JSON
    #[default]
    Json,
    /// Compact terminal listing
    Brief,
    /// Comma-separated values with a header row
    Csv,
    /// Markdown table
    Markdown,
}

/// Renders a paper listing. `query` labels the markdown heading when the
/// papers came from a search.
pub fn format_papers(papers: &[Paper], format: OutputFormat, query: &str) -> String {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(papers).unwrap_or_else(|_| "[]".to_string())
        }
        OutputFormat::Brief => papers_brief(papers),
        OutputFormat::Csv => papers_csv(papers),
        OutputFormat::Markdown => papers_markdown(papers, query),
    }
}

/// Renders a reference listing. `source_id` labels the markdown heading.
pub fn format_references(references: &[Reference], format: OutputFormat, source_id: &str) -> String {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(references).unwrap_or_else(|_| "[]".to_string())
        }
        OutputFormat::Brief => references_brief(references),
        OutputFormat::Csv => references_csv(references),
        OutputFormat::Markdown => references_markdown(references, source_id),
    }
}

fn papers_brief(papers: &[Paper]) -> String {
    let mut lines = Vec::new();
    for paper in papers {
        let citations = match paper.citation_count {
            Some(count) if count > 0 => format!(" [{count} citations]"),
            _ => String::new(),
        };
        lines.push(format!("[{}] {}{}", paper.arxiv_id, paper.title, citations));

        let shown: Vec<&str> = paper.authors.iter().take(3).map(String::as_str).collect();
        let more = if paper.authors.len() > 3 { "..." } else { "" };
        lines.push(format!("  Authors: {}{}", shown.join(", "), more));
        lines.push(format!("  URL: {}", paper.url_abstract));
        lines.push(String::new());
    }
    lines.join("\n")
}

fn papers_csv(papers: &[Paper]) -> String {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let _ = writer.write_record([
        "arxiv_id",
        "title",
        "authors",
        "published",
        "citation_count",
        "categories",
        "url_abstract",
    ]);
    for paper in papers {
        let _ = writer.write_record([
            paper.arxiv_id.as_str(),
            paper.title.as_str(),
            &paper.authors.join("; "),
            paper.published.as_deref().unwrap_or(""),
            &paper
                .citation_count
                .map(|c| c.to_string())
                .unwrap_or_default(),
            &paper.categories.join("; "),
            paper.url_abstract.as_str(),
        ]);
    }
    writer
        .into_inner()
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

fn papers_markdown(papers: &[Paper], query: &str) -> String {
    let mut lines = Vec::new();
    if query.is_empty() {
        lines.push("## Papers\n".to_string());
    } else {
        lines.push(format!("## Search Results: \"{query}\"\n"));
    }

    lines.push("| # | Title | Authors | Date | Citations |".to_string());
    lines.push("|---|-------|---------|------|-----------|".to_string());

    for (i, paper) in papers.iter().enumerate() {
        let mut authors = paper
            .authors
            .iter()
            .take(2)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        if paper.authors.len() > 2 {
            authors.push_str(" et al.");
        }
        let date = paper
            .published
            .as_deref()
            .map(|d| d.chars().take(10).collect::<String>())
            .unwrap_or_default();
        let citations = match paper.citation_count {
            Some(count) if count > 0 => count.to_string(),
            _ => "-".to_string(),
        };
        lines.push(format!(
            "| {} | [{}]({}) | {} | {} | {} |",
            i + 1,
            clamp(&paper.title, 60),
            paper.url_abstract,
            authors,
            date,
            citations
        ));
    }

    lines.push(String::new());
    lines.push(format!(
        "---\nGenerated: {} | Results: {}",
        Local::now().format("%Y-%m-%d %H:%M"),
        papers.len()
    ));
    lines.join("\n")
}

fn references_brief(references: &[Reference]) -> String {
    let mut lines = Vec::new();
    for reference in references {
        let id = reference
            .arxiv_id
            .as_deref()
            .map(|id| format!("[{id}] "))
            .unwrap_or_default();
        let year = reference
            .year
            .map(|y| format!(" ({y})"))
            .unwrap_or_default();
        lines.push(format!("{}{}{}", id, reference.title, year));

        let mut authors = reference
            .authors
            .iter()
            .take(2)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        if reference.authors.len() > 2 {
            authors.push_str(" et al.");
        }
        if !authors.is_empty() {
            lines.push(format!("  {authors}"));
        }
        lines.push(String::new());
    }
    lines.join("\n")
}

fn references_csv(references: &[Reference]) -> String {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let _ = writer.write_record(["arxiv_id", "title", "authors", "year"]);
    for reference in references {
        let _ = writer.write_record([
            reference.arxiv_id.as_deref().unwrap_or(""),
            reference.title.as_str(),
            &reference.authors.join("; "),
            &reference.year.map(|y| y.to_string()).unwrap_or_default(),
        ]);
    }
    writer
        .into_inner()
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

fn references_markdown(references: &[Reference], source_id: &str) -> String {
    let mut lines = Vec::new();
    if source_id.is_empty() {
        lines.push("## References\n".to_string());
    } else {
        lines.push(format!("## References from {source_id}\n"));
    }

    lines.push("| # | Title | Authors | Year | arXiv ID |".to_string());
    lines.push("|---|-------|---------|------|----------|".to_string());

    for (i, reference) in references.iter().enumerate() {
        let mut authors = reference
            .authors
            .iter()
            .take(2)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        if reference.authors.len() > 2 {
            authors.push_str(" et al.");
        }
        lines.push(format!(
            "| {} | {} | {} | {} | {} |",
            i + 1,
            clamp(&reference.title, 50),
            authors,
            reference.year.map(|y| y.to_string()).unwrap_or_default(),
            reference.arxiv_id.as_deref().unwrap_or("")
        ));
    }

    lines.push(String::new());
    lines.push(format!(
        "---\nGenerated: {} | References: {}",
        Local::now().format("%Y-%m-%d %H:%M"),
        references.len()
    ));
    lines.join("\n")
}

/// Truncates to `max` characters, appending an ellipsis when clipped.
fn clamp(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let clipped: String = text.chars().take(max).collect();
        format!("{clipped}...")
    } else {
        text.to_string()
    }
}
