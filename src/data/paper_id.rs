//! arXiv identifier extraction and text cleanup helpers

use regex::Regex;

/// Extracts an arXiv paper ID from a URL or bare identifier.
///
/// Supported inputs:
/// - Abstract URLs: `https://arxiv.org/abs/2301.00001`
/// - PDF URLs: `https://arxiv.org/pdf/2301.00001.pdf`
/// - Bare IDs: `2301.00001`
///
/// Returns `None` when no identifier can be found.
pub fn extract_paper_id(url_or_id: &str) -> Option<String> {
    let patterns = [
        r"arxiv\.org/abs/(\d+\.\d+)",
        r"arxiv\.org/pdf/(\d+\.\d+)",
        r"^(\d+\.\d+)$",
    ];
    for pattern in patterns {
        let re = Regex::new(pattern).expect("static pattern");
        if let Some(captures) = re.captures(url_or_id) {
            return Some(captures[1].to_string());
        }
    }
    None
}

/// Collapses newlines and runs of whitespace into single spaces.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
