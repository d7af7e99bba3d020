//! Citation generation in common academic formats
//!
//! Renders arXiv paper metadata as BibTeX, APA 7th edition, IEEE, ACM,
//! Chicago, or RIS records. Author-name handling follows each style's
//! conventions (initials, "et al." thresholds, name inversion for the lead
//! author).

use regex::Regex;

use crate::data::PaperMetadata;

/// Supported citation styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CitationStyle {
    /// BibTeX `@article` entry
    Bibtex,
    /// APA 7th edition
    Apa,
    /// IEEE
    Ieee,
    /// ACM
    Acm,
    /// Chicago
    Chicago,
    /// RIS record (Zotero, Mendeley, EndNote)
    Ris,
}

impl CitationStyle {
    /// All styles, in the order `cite all` prints them.
    pub const ALL: [CitationStyle; 6] = [
        CitationStyle::Bibtex,
        CitationStyle::Apa,
        CitationStyle::Ieee,
        CitationStyle::Acm,
        CitationStyle::Chicago,
        CitationStyle::Ris,
    ];

    /// Display name for headers.
    pub fn name(self) -> &'static str {
        match self {
            CitationStyle::Bibtex => "BIBTEX",
            CitationStyle::Apa => "APA",
            CitationStyle::Ieee => "IEEE",
            CitationStyle::Acm => "ACM",
            CitationStyle::Chicago => "CHICAGO",
            CitationStyle::Ris => "RIS",
        }
    }

    /// Formats a citation for `paper` in this style.
    pub fn format(self, paper: &PaperMetadata) -> String {
        match self {
            CitationStyle::Bibtex => format_bibtex(paper),
            CitationStyle::Apa => format_apa(paper),
            CitationStyle::Ieee => format_ieee(paper),
            CitationStyle::Acm => format_acm(paper),
            CitationStyle::Chicago => format_chicago(paper),
            CitationStyle::Ris => format_ris(paper),
        }
    }
}

/// Extracts a four-digit year from the published date.
fn year_of(paper: &PaperMetadata) -> Option<String> {
    let re = Regex::new(r"(\d{4})").expect("static pattern");
    re.captures(&paper.published).map(|c| c[1].to_string())
}

/// "Ada Byron Lovelace" -> "Lovelace, A. B."
fn author_apa(name: &str) -> String {
    let parts: Vec<&str> = name.split_whitespace().collect();
    if parts.len() < 2 {
        return name.to_string();
    }
    let last = parts[parts.len() - 1];
    let initials: Vec<String> = parts[..parts.len() - 1]
        .iter()
        .filter_map(|p| p.chars().next())
        .map(|c| format!("{c}."))
        .collect();
    format!("{last}, {}", initials.join(" "))
}

/// "Ada Byron Lovelace" -> "A. B. Lovelace"
fn author_ieee(name: &str) -> String {
    let parts: Vec<&str> = name.split_whitespace().collect();
    if parts.len() < 2 {
        return name.to_string();
    }
    let last = parts[parts.len() - 1];
    let initials: Vec<String> = parts[..parts.len() - 1]
        .iter()
        .filter_map(|p| p.chars().next())
        .map(|c| format!("{c}."))
        .collect();
    format!("{} {last}", initials.join(" "))
}

/// Chicago inverts only the lead author's name.
fn author_chicago(name: &str, first: bool) -> String {
    let parts: Vec<&str> = name.split_whitespace().collect();
    if parts.len() < 2 {
        return name.to_string();
    }
    let last = parts[parts.len() - 1];
    let given = parts[..parts.len() - 1].join(" ");
    if first {
        format!("{last}, {given}")
    } else {
        format!("{given} {last}")
    }
}

/// BibTeX `@article` entry. The cite key is the first author's last name,
/// the year, and the first title word of at least four letters.
pub fn format_bibtex(paper: &PaperMetadata) -> String {
    let first_author = paper.authors.first().map(String::as_str).unwrap_or("Unknown");
    let last_name = first_author
        .split_whitespace()
        .last()
        .unwrap_or("unknown")
        .to_lowercase();

    let year = year_of(paper).unwrap_or_else(|| "2024".to_string());

    let word_re = Regex::new(r"\b[A-Za-z]{4,}\b").expect("static pattern");
    let first_word = word_re
        .find(&paper.title)
        .map(|m| m.as_str().to_lowercase())
        .unwrap_or_else(|| "paper".to_string());

    let cite_key = format!("{last_name}{year}{first_word}");
    let authors = paper.authors.join(" and ");
    let primary_class = paper
        .categories
        .first()
        .map(String::as_str)
        .unwrap_or("cs.AI");

    let mut bibtex = format!(
        "@article{{{cite_key},\n    title = {{{}}},\n    author = {{{authors}}},\n    year = {{{year}}},\n    eprint = {{{}}},\n    archivePrefix = {{arXiv}},\n    primaryClass = {{{primary_class}}}",
        paper.title, paper.arxiv_id
    );
    if let Some(doi) = &paper.doi {
        bibtex.push_str(&format!(",\n    doi = {{{doi}}}"));
    }
    if let Some(journal) = &paper.journal_ref {
        bibtex.push_str(&format!(",\n    journal = {{{journal}}}"));
    }
    bibtex.push_str("\n}");
    bibtex
}

/// APA 7th edition. Up to 20 authors are listed in full; beyond that the
/// first 19 are followed by an ellipsis and the final author.
pub fn format_apa(paper: &PaperMetadata) -> String {
    let authors = &paper.authors;
    let authors_str = match authors.len() {
        0 => String::new(),
        1 => author_apa(&authors[0]),
        2 => format!("{} & {}", author_apa(&authors[0]), author_apa(&authors[1])),
        n if n <= 20 => {
            let head: Vec<String> = authors[..n - 1].iter().map(|a| author_apa(a)).collect();
            format!("{}, & {}", head.join(", "), author_apa(&authors[n - 1]))
        }
        n => {
            let head: Vec<String> = authors[..19].iter().map(|a| author_apa(a)).collect();
            format!("{}, ... {}", head.join(", "), author_apa(&authors[n - 1]))
        }
    };

    let year = year_of(paper).unwrap_or_else(|| "n.d.".to_string());
    format!(
        "{authors_str} ({year}). {}. arXiv preprint arXiv:{}.",
        paper.title, paper.arxiv_id
    )
}

/// IEEE. More than three authors collapse to "et al.".
pub fn format_ieee(paper: &PaperMetadata) -> String {
    let authors_str = if paper.authors.len() <= 3 {
        paper
            .authors
            .iter()
            .map(|a| author_ieee(a))
            .collect::<Vec<_>>()
            .join(", ")
    } else {
        format!("{} et al.", author_ieee(&paper.authors[0]))
    };

    let year = year_of(paper).unwrap_or_default();
    format!(
        "{authors_str}, \"{},\" arXiv preprint arXiv:{}, {year}.",
        paper.title, paper.arxiv_id
    )
}

/// ACM. More than two authors collapse to "et al.".
pub fn format_acm(paper: &PaperMetadata) -> String {
    let authors_str = match paper.authors.len() {
        0 => String::new(),
        1 => paper.authors[0].clone(),
        2 => format!("{} and {}", paper.authors[0], paper.authors[1]),
        _ => format!("{} et al.", paper.authors[0]),
    };

    let year = year_of(paper).unwrap_or_default();
    format!(
        "{authors_str}. {year}. {}. arXiv preprint arXiv:{}.",
        paper.title, paper.arxiv_id
    )
}

/// Chicago. Up to ten authors are listed; beyond that "et al.".
pub fn format_chicago(paper: &PaperMetadata) -> String {
    let authors = &paper.authors;
    let authors_str = match authors.len() {
        0 => String::new(),
        1 => author_chicago(&authors[0], true),
        2 => format!(
            "{} and {}",
            author_chicago(&authors[0], true),
            author_chicago(&authors[1], false)
        ),
        n if n <= 10 => {
            let mut s = author_chicago(&authors[0], true);
            for author in &authors[1..n - 1] {
                s.push_str(&format!(", {}", author_chicago(author, false)));
            }
            s.push_str(&format!(", and {}", author_chicago(&authors[n - 1], false)));
            s
        }
        _ => format!("{} et al.", author_chicago(&authors[0], true)),
    };

    let year = year_of(paper).unwrap_or_default();
    format!(
        "{authors_str}. \"{}.\" arXiv preprint arXiv:{} ({year}).",
        paper.title, paper.arxiv_id
    )
}

/// RIS record for reference managers.
pub fn format_ris(paper: &PaperMetadata) -> String {
    let mut lines = vec!["TY  - JOUR".to_string()];

    for author in &paper.authors {
        lines.push(format!("AU  - {author}"));
    }
    lines.push(format!("TI  - {}", paper.title));
    if let Some(year) = year_of(paper) {
        lines.push(format!("PY  - {year}"));
    }
    if !paper.abstract_text.is_empty() {
        lines.push(format!("AB  - {}", paper.abstract_text));
    }
    lines.push(format!("UR  - https://arxiv.org/abs/{}", paper.arxiv_id));
    if let Some(doi) = &paper.doi {
        lines.push(format!("DO  - {doi}"));
    }
    match &paper.journal_ref {
        Some(journal) => lines.push(format!("JO  - {journal}")),
        None => lines.push(format!("JO  - arXiv preprint arXiv:{}", paper.arxiv_id)),
    }
    for category in &paper.categories {
        lines.push(format!("KW  - {category}"));
    }
    lines.push("ER  - ".to_string());

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_paper(authors: &[&str]) -> PaperMetadata {
        PaperMetadata {
            arxiv_id: "1706.03762".to_string(),
            title: "Attention Is All You Need".to_string(),
            authors: authors.iter().map(|s| s.to_string()).collect(),
            abstract_text: "We propose the Transformer.".to_string(),
            categories: vec!["cs.CL".to_string(), "cs.LG".to_string()],
            published: "2017-06-12T17:57:34Z".to_string(),
            updated: None,
            doi: None,
            journal_ref: None,
        }
    }

    #[test]
    fn test_bibtex_cite_key_and_fields() {
        let bibtex = format_bibtex(&sample_paper(&["Ashish Vaswani", "Noam Shazeer"]));
        assert!(bibtex.starts_with("@article{vaswani2017attention,"));
        assert!(bibtex.contains("author = {Ashish Vaswani and Noam Shazeer}"));
        assert!(bibtex.contains("eprint = {1706.03762}"));
        assert!(bibtex.contains("primaryClass = {cs.CL}"));
        assert!(!bibtex.contains("doi ="));
        assert!(bibtex.ends_with("\n}"));
    }

    #[test]
    fn test_bibtex_includes_doi_and_journal_when_present() {
        let mut paper = sample_paper(&["Ashish Vaswani"]);
        paper.doi = Some("10.5555/3295222".to_string());
        paper.journal_ref = Some("NeurIPS 2017".to_string());

        let bibtex = format_bibtex(&paper);
        assert!(bibtex.contains("doi = {10.5555/3295222}"));
        assert!(bibtex.contains("journal = {NeurIPS 2017}"));
    }

    #[test]
    fn test_apa_single_author() {
        let apa = format_apa(&sample_paper(&["Ashish Vaswani"]));
        assert_eq!(
            apa,
            "Vaswani, A. (2017). Attention Is All You Need. arXiv preprint arXiv:1706.03762."
        );
    }

    #[test]
    fn test_apa_two_authors_use_ampersand() {
        let apa = format_apa(&sample_paper(&["Ashish Vaswani", "Noam Shazeer"]));
        assert!(apa.starts_with("Vaswani, A. & Shazeer, N. (2017)."));
    }

    #[test]
    fn test_apa_many_authors_use_serial_comma() {
        let apa = format_apa(&sample_paper(&["A One", "B Two", "C Three"]));
        assert!(apa.starts_with("One, A., Two, B., & Three, C."));
    }

    #[test]
    fn test_apa_over_twenty_authors_elided() {
        let names: Vec<String> = (0..25).map(|i| format!("Given Author{i}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let apa = format_apa(&sample_paper(&refs));
        assert!(apa.contains(", ... Author24, G."));
        assert!(!apa.contains("Author19"), "only 19 leading authors listed");
    }

    #[test]
    fn test_apa_no_date_fallback() {
        let mut paper = sample_paper(&["Ashish Vaswani"]);
        paper.published = String::new();
        assert!(format_apa(&paper).contains("(n.d.)."));
    }

    #[test]
    fn test_ieee_initials_lead() {
        let ieee = format_ieee(&sample_paper(&["Ashish Vaswani", "Noam Shazeer"]));
        assert_eq!(
            ieee,
            "A. Vaswani, N. Shazeer, \"Attention Is All You Need,\" arXiv preprint arXiv:1706.03762, 2017."
        );
    }

    #[test]
    fn test_ieee_four_authors_et_al() {
        let ieee = format_ieee(&sample_paper(&["A One", "B Two", "C Three", "D Four"]));
        assert!(ieee.starts_with("A. One et al.,"));
    }

    #[test]
    fn test_acm_two_and_three_authors() {
        let two = format_acm(&sample_paper(&["A One", "B Two"]));
        assert!(two.starts_with("A One and B Two. 2017."));

        // "et al." keeps its abbreviation period ahead of the sentence
        // separator.
        let three = format_acm(&sample_paper(&["A One", "B Two", "C Three"]));
        assert!(three.starts_with("A One et al.. 2017."));
    }

    #[test]
    fn test_chicago_inverts_only_first_author() {
        let chicago = format_chicago(&sample_paper(&["Ashish Vaswani", "Noam Shazeer"]));
        assert!(chicago.starts_with("Vaswani, Ashish and Noam Shazeer."));
        assert!(chicago.ends_with("arXiv preprint arXiv:1706.03762 (2017)."));
    }

    #[test]
    fn test_ris_record_structure() {
        let ris = format_ris(&sample_paper(&["Ashish Vaswani", "Noam Shazeer"]));
        let lines: Vec<&str> = ris.lines().collect();

        assert_eq!(lines[0], "TY  - JOUR");
        assert_eq!(lines[1], "AU  - Ashish Vaswani");
        assert_eq!(lines[2], "AU  - Noam Shazeer");
        assert!(lines.contains(&"TI  - Attention Is All You Need"));
        assert!(lines.contains(&"PY  - 2017"));
        assert!(lines.contains(&"UR  - https://arxiv.org/abs/1706.03762"));
        assert!(lines.contains(&"JO  - arXiv preprint arXiv:1706.03762"));
        assert!(lines.contains(&"KW  - cs.CL"));
        assert_eq!(*lines.last().unwrap(), "ER  - ");
    }

    #[test]
    fn test_style_dispatch_matches_free_functions() {
        let paper = sample_paper(&["Ashish Vaswani"]);
        assert_eq!(CitationStyle::Apa.format(&paper), format_apa(&paper));
        assert_eq!(CitationStyle::Ris.format(&paper), format_ris(&paper));
    }

    #[test]
    fn test_mononym_author_passes_through() {
        let apa = format_apa(&sample_paper(&["Aristotle"]));
        assert!(apa.starts_with("Aristotle (2017)."));
    }
}
