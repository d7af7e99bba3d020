//! E-print unpacking and TikZ environment parsing
//!
//! arXiv e-prints come in several shapes: a gzipped tarball, a plain
//! tarball, a single gzipped `.tex` file, or a raw `.tex` file. Each is
//! tried in turn. TikZ environments are extracted with a depth-counting
//! parser so nested `\begin`/`\end` pairs of the same environment resolve
//! correctly.

use std::collections::BTreeSet;
use std::fs;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use log::debug;
use regex::Regex;
use thiserror::Error;

use super::{TikzFigure, TikzKind};

/// How far back from a TikZ environment to look for its `\begin{figure}`.
const FIGURE_LOOKBEHIND: usize = 500;

/// Errors that can occur during extraction
#[derive(Debug, Error)]
pub enum TikzError {
    /// Filesystem or decompression failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Extracts all TikZ figures from a downloaded e-print archive.
///
/// Returns an empty list when the archive contains no `.tex` files or no
/// TikZ environments.
pub fn extract_from_archive(arxiv_id: &str, content: &[u8]) -> Result<Vec<TikzFigure>, TikzError> {
    let scratch = tempfile::tempdir()?;
    let tex_files = unpack(content, scratch.path())?;
    if tex_files.is_empty() {
        debug!("no .tex files in e-print for {arxiv_id}");
        return Ok(Vec::new());
    }

    let contents: Vec<(String, String)> = tex_files
        .iter()
        .filter_map(|path| {
            let text = read_tex(path)?;
            let name = path
                .strip_prefix(scratch.path())
                .unwrap_or(path)
                .to_string_lossy()
                .into_owned();
            Some((name, text))
        })
        .collect();

    let libraries = collect_libraries(contents.iter().map(|(_, text)| text.as_str()));

    let mut figures = Vec::new();
    for (source_file, text) in &contents {
        let start_index = figures.len();
        figures.extend(extract_from_tex(
            text,
            arxiv_id,
            source_file,
            &libraries,
            start_index,
        ));
    }
    Ok(figures)
}

/// Unpacks archive bytes into `dir` and returns the `.tex` files found.
fn unpack(content: &[u8], dir: &Path) -> Result<Vec<PathBuf>, TikzError> {
    // Gzipped tarball
    let mut archive = tar::Archive::new(GzDecoder::new(Cursor::new(content)));
    if archive.unpack(dir).is_ok() {
        let files = find_tex_files(dir)?;
        if !files.is_empty() {
            return Ok(files);
        }
    }

    // Plain tarball
    let mut archive = tar::Archive::new(Cursor::new(content));
    if archive.unpack(dir).is_ok() {
        let files = find_tex_files(dir)?;
        if !files.is_empty() {
            return Ok(files);
        }
    }

    // Single gzipped file
    let mut decoder = GzDecoder::new(Cursor::new(content));
    let mut decompressed = Vec::new();
    if decoder.read_to_end(&mut decompressed).is_ok() {
        let path = dir.join("main.tex");
        fs::write(&path, &decompressed)?;
        return Ok(vec![path]);
    }

    // Raw .tex
    let text = String::from_utf8_lossy(content);
    if text.contains("\\begin{document}") || text.contains("\\documentclass") {
        let path = dir.join("main.tex");
        fs::write(&path, text.as_bytes())?;
        return Ok(vec![path]);
    }

    Ok(Vec::new())
}

/// Recursively finds `.tex` files, sorted for deterministic figure order.
fn find_tex_files(dir: &Path) -> Result<Vec<PathBuf>, TikzError> {
    let mut files = Vec::new();
    let mut stack = vec![dir.to_path_buf()];
    while let Some(current) = stack.pop() {
        for entry in fs::read_dir(&current)? {
            let path = entry?.path();
            if path.is_dir() {
                stack.push(path);
            } else if path.extension().is_some_and(|ext| ext == "tex") {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Reads a `.tex` file, tolerating non-UTF-8 encodings.
fn read_tex(path: &Path) -> Option<String> {
    let bytes = fs::read(path).ok()?;
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

/// Collects all `\usetikzlibrary{...}` names across the document, sorted
/// and deduplicated.
fn collect_libraries<'a>(contents: impl Iterator<Item = &'a str>) -> Vec<String> {
    let re = Regex::new(r"\\usetikzlibrary\{([^}]+)\}").expect("static pattern");
    let mut libraries = BTreeSet::new();
    for text in contents {
        for captures in re.captures_iter(text) {
            for lib in captures[1].split(',') {
                let lib = lib.trim();
                if !lib.is_empty() {
                    libraries.insert(lib.to_string());
                }
            }
        }
    }
    libraries.into_iter().collect()
}

/// Extracts TikZ environments from one `.tex` file.
fn extract_from_tex(
    content: &str,
    arxiv_id: &str,
    source_file: &str,
    libraries: &[String],
    start_index: usize,
) -> Vec<TikzFigure> {
    let mut figures = Vec::new();
    let mut index = start_index;

    for kind in TikzKind::ALL {
        let begin_tag = format!("\\begin{{{}}}", kind.env_name());
        let mut pos = 0;

        while let Some(offset) = content[pos..].find(&begin_tag) {
            let start = pos + offset;
            let Some(code) = extract_balanced(content, start, kind.env_name()) else {
                pos = start + begin_tag.len();
                continue;
            };

            // An `axis` inside a tikzpicture is already part of that figure.
            if kind == TikzKind::Pgfplot && is_nested_in_tikzpicture(content, start) {
                pos = start + code.len();
                continue;
            }

            figures.push(TikzFigure {
                arxiv_id: arxiv_id.to_string(),
                index,
                kind,
                caption: extract_caption(content, start),
                label: extract_label(content, start),
                code,
                source_file: source_file.to_string(),
                libraries: libraries.to_vec(),
            });
            index += 1;
            pos = start + figures.last().map(|f| f.code.len()).unwrap_or(begin_tag.len());
        }
    }

    figures
}

/// Extracts a balanced `\begin{env}...\end{env}` block starting at `start`
/// by counting nesting depth. Returns `None` when the block never closes.
fn extract_balanced(content: &str, start: usize, env_name: &str) -> Option<String> {
    let begin_tag = format!("\\begin{{{env_name}}}");
    let end_tag = format!("\\end{{{env_name}}}");
    let mut depth = 0usize;
    let mut pos = start;

    loop {
        // Skip the opening tag itself only on the first pass; afterwards
        // pos already sits past the last consumed tag.
        let search_from = if pos == start { start + 1 } else { pos };
        let next_begin = content
            .get(search_from.min(content.len())..)
            .and_then(|s| s.find(&begin_tag))
            .map(|off| search_from + off);
        let next_end = content
            .get(pos..)
            .and_then(|s| s.find(&end_tag))
            .map(|off| pos + off)?;

        match next_begin {
            Some(begin) if begin < next_end => {
                depth += 1;
                pos = begin + begin_tag.len();
            }
            _ if depth == 0 => {
                return Some(content[start..next_end + end_tag.len()].to_string());
            }
            _ => {
                depth -= 1;
                pos = next_end + end_tag.len();
            }
        }
    }
}

/// Whether `pos` falls inside an open `tikzpicture` environment.
fn is_nested_in_tikzpicture(content: &str, pos: usize) -> bool {
    let before = &content[..pos];
    let last_begin = before.rfind("\\begin{tikzpicture}");
    let last_end = before.rfind("\\end{tikzpicture}");
    match (last_begin, last_end) {
        (Some(begin), Some(end)) => begin > end,
        (Some(_), None) => true,
        _ => false,
    }
}

/// Returns the `\begin{figure}...\end{figure}` block surrounding a TikZ
/// environment starting at `tikz_start`, if there is one close by.
fn surrounding_figure<'a>(content: &'a str, tikz_start: usize) -> Option<&'a str> {
    let mut search_start = tikz_start.saturating_sub(FIGURE_LOOKBEHIND);
    while !content.is_char_boundary(search_start) {
        search_start -= 1;
    }
    let before = &content[search_start..tikz_start];

    let fig_begin = search_start + before.rfind("\\begin{figure}")?;
    let fig_end = tikz_start + content[tikz_start..].find("\\end{figure}")?;
    Some(&content[fig_begin..fig_end + "\\end{figure}".len()])
}

/// Extracts the `\caption{...}` text (balanced braces, labels stripped)
/// from the surrounding figure environment.
fn extract_caption(content: &str, tikz_start: usize) -> Option<String> {
    let figure = surrounding_figure(content, tikz_start)?;

    let caption_re = Regex::new(r"\\caption\{").expect("static pattern");
    let caption_start = caption_re.find(figure)?.end();

    let mut depth = 1usize;
    let mut end = None;
    for (i, c) in figure[caption_start..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    end = Some(caption_start + i);
                    break;
                }
            }
            _ => {}
        }
    }

    let raw = &figure[caption_start..end?];
    let label_re = Regex::new(r"\\label\{[^}]*\}").expect("static pattern");
    let cleaned = label_re.replace_all(raw, "");
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Extracts the `\label{...}` from the surrounding figure environment.
fn extract_label(content: &str, tikz_start: usize) -> Option<String> {
    let figure = surrounding_figure(content, tikz_start)?;
    let label_re = Regex::new(r"\\label\{([^}]+)\}").expect("static pattern");
    label_re
        .captures(figure)
        .map(|captures| captures[1].to_string())
}
