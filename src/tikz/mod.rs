//! TikZ figure extraction from arXiv LaTeX sources
//!
//! Unpacks a paper's e-print archive, scans the `.tex` files for TikZ
//! environments, and returns structured figures with their captions, labels,
//! and the TikZ libraries the document loads.

mod extract;
mod format;

pub use extract::{extract_from_archive, TikzError};
pub use format::TikzFormat;

use serde::{Deserialize, Serialize};

/// TikZ environment families recognized by the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TikzKind {
    /// Plain `tikzpicture`
    Tikzpicture,
    /// Commutative diagram (`tikzcd`)
    Tikzcd,
    /// Circuit diagram (`circuitikz`)
    Circuitikz,
    /// pgfplots `axis` environment
    Pgfplot,
}

impl TikzKind {
    /// The `\begin{...}` environment name.
    pub fn env_name(self) -> &'static str {
        match self {
            TikzKind::Tikzpicture => "tikzpicture",
            TikzKind::Tikzcd => "tikzcd",
            TikzKind::Circuitikz => "circuitikz",
            TikzKind::Pgfplot => "axis",
        }
    }

    /// Human-readable type name used in output.
    pub fn as_str(self) -> &'static str {
        match self {
            TikzKind::Tikzpicture => "tikzpicture",
            TikzKind::Tikzcd => "tikzcd",
            TikzKind::Circuitikz => "circuitikz",
            TikzKind::Pgfplot => "pgfplot",
        }
    }

    /// Environments scanned for, in extraction order.
    pub const ALL: [TikzKind; 4] = [
        TikzKind::Tikzpicture,
        TikzKind::Tikzcd,
        TikzKind::Circuitikz,
        TikzKind::Pgfplot,
    ];
}

/// A single TikZ figure extracted from a paper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TikzFigure {
    /// Paper the figure came from
    pub arxiv_id: String,
    /// 0-based index across all figures extracted from the paper
    pub index: usize,
    /// Environment family
    pub kind: TikzKind,
    /// Complete `\begin{...}...\end{...}` source
    pub code: String,
    /// Path of the `.tex` file within the archive
    pub source_file: String,
    /// All `\usetikzlibrary` names declared anywhere in the document
    pub libraries: Vec<String>,
    /// Caption of the surrounding `figure` environment, if any
    pub caption: Option<String>,
    /// Label of the surrounding `figure` environment, if any
    pub label: Option<String>,
}
