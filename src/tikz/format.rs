//! Output rendering for extracted TikZ figures

use clap::ValueEnum;
use serde_json::json;

use super::{TikzFigure, TikzKind};

/// How extracted figures are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TikzFormat {
    /// Raw TikZ code with header comments
    #[default]
    Tikz,
    /// Machine-readable JSON
    Json,
    /// Complete compilable LaTeX document
    Latex,
    /// One-line summary per figure
    Brief,
}

impl TikzFormat {
    /// Renders the figures in this format.
    pub fn render(self, arxiv_id: &str, figures: &[TikzFigure]) -> String {
        if figures.is_empty() {
            return format!("No TikZ figures found in {arxiv_id}");
        }
        match self {
            TikzFormat::Tikz => render_tikz(figures),
            TikzFormat::Json => render_json(arxiv_id, figures),
            TikzFormat::Latex => render_latex(figures),
            TikzFormat::Brief => render_brief(arxiv_id, figures),
        }
    }
}

fn render_tikz(figures: &[TikzFigure]) -> String {
    let mut out = String::new();
    for figure in figures {
        out.push_str(&format!(
            "% Figure {} ({}) from {}\n",
            figure.index,
            figure.kind.as_str(),
            figure.source_file
        ));
        if let Some(caption) = &figure.caption {
            out.push_str(&format!("% Caption: {caption}\n"));
        }
        if let Some(label) = &figure.label {
            out.push_str(&format!("% Label: {label}\n"));
        }
        out.push_str(&figure.code);
        out.push_str("\n\n");
    }
    out.trim_end().to_string()
}

fn render_json(arxiv_id: &str, figures: &[TikzFigure]) -> String {
    let value = json!({
        "arxiv_id": arxiv_id,
        "figure_count": figures.len(),
        "figures": figures,
    });
    serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
}

/// Assembles a standalone document that compiles all the figures, loading
/// only the packages the environments actually need.
fn render_latex(figures: &[TikzFigure]) -> String {
    let mut out = String::from("\\documentclass{standalone}\n\\usepackage{tikz}\n");

    if figures.iter().any(|f| f.kind == TikzKind::Tikzcd) {
        out.push_str("\\usepackage{tikz-cd}\n");
    }
    if figures.iter().any(|f| f.kind == TikzKind::Circuitikz) {
        out.push_str("\\usepackage{circuitikz}\n");
    }
    if figures.iter().any(|f| f.kind == TikzKind::Pgfplot) {
        out.push_str("\\usepackage{pgfplots}\n\\pgfplotsset{compat=1.18}\n");
    }

    let libraries = figures
        .first()
        .map(|f| f.libraries.as_slice())
        .unwrap_or_default();
    if !libraries.is_empty() {
        out.push_str(&format!("\\usetikzlibrary{{{}}}\n", libraries.join(",")));
    }

    out.push_str("\\begin{document}\n");
    for figure in figures {
        // A bare axis needs a tikzpicture wrapper to compile.
        if figure.kind == TikzKind::Pgfplot {
            out.push_str("\\begin{tikzpicture}\n");
            out.push_str(&figure.code);
            out.push_str("\n\\end{tikzpicture}\n");
        } else {
            out.push_str(&figure.code);
            out.push('\n');
        }
    }
    out.push_str("\\end{document}\n");
    out
}

fn render_brief(arxiv_id: &str, figures: &[TikzFigure]) -> String {
    let mut out = format!("{} TikZ figure(s) in {}\n\n", figures.len(), arxiv_id);

    for kind in TikzKind::ALL {
        let count = figures.iter().filter(|f| f.kind == kind).count();
        if count > 0 {
            out.push_str(&format!("  {}: {}\n", kind.as_str(), count));
        }
    }
    out.push('\n');

    for figure in figures {
        let caption = match &figure.caption {
            Some(text) if text.chars().count() > 60 => {
                let clipped: String = text.chars().take(60).collect();
                format!(" - {clipped}...")
            }
            Some(text) => format!(" - {text}"),
            None => String::new(),
        };
        out.push_str(&format!(
            "[{}] {} ({} lines, {}){}\n",
            figure.index,
            figure.kind.as_str(),
            figure.code.lines().count(),
            figure.source_file,
            caption
        ));
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_figures() -> Vec<TikzFigure> {
        vec![
            TikzFigure {
                arxiv_id: "2301.00001".to_string(),
                index: 0,
                kind: TikzKind::Tikzpicture,
                code: "\\begin{tikzpicture}\n\\node {A};\n\\end{tikzpicture}".to_string(),
                source_file: "main.tex".to_string(),
                libraries: vec!["arrows".to_string()],
                caption: Some("A node".to_string()),
                label: Some("fig:node".to_string()),
            },
            TikzFigure {
                arxiv_id: "2301.00001".to_string(),
                index: 1,
                kind: TikzKind::Pgfplot,
                code: "\\begin{axis}\n\\addplot {x};\n\\end{axis}".to_string(),
                source_file: "main.tex".to_string(),
                libraries: vec!["arrows".to_string()],
                caption: None,
                label: None,
            },
        ]
    }

    #[test]
    fn test_empty_figures_message() {
        let out = TikzFormat::Tikz.render("2301.00001", &[]);
        assert!(out.contains("No TikZ figures found"));
        assert!(out.contains("2301.00001"));
    }

    #[test]
    fn test_tikz_format_includes_header_comments() {
        let out = TikzFormat::Tikz.render("2301.00001", &sample_figures());
        assert!(out.contains("% Figure 0 (tikzpicture) from main.tex"));
        assert!(out.contains("% Caption: A node"));
        assert!(out.contains("% Label: fig:node"));
        assert!(out.contains("\\begin{tikzpicture}"));
    }

    #[test]
    fn test_json_format_is_parseable() {
        let out = TikzFormat::Json.render("2301.00001", &sample_figures());
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["figure_count"], 2);
        assert_eq!(value["figures"][0]["kind"], "tikzpicture");
    }

    #[test]
    fn test_latex_format_loads_needed_packages() {
        let out = TikzFormat::Latex.render("2301.00001", &sample_figures());
        assert!(out.starts_with("\\documentclass{standalone}"));
        assert!(out.contains("\\usepackage{pgfplots}"));
        assert!(!out.contains("\\usepackage{circuitikz}"));
        assert!(out.contains("\\usetikzlibrary{arrows}"));
        assert!(out.ends_with("\\end{document}\n"));
    }

    #[test]
    fn test_latex_format_wraps_bare_axis() {
        let figures = vec![sample_figures().remove(1)];
        let out = TikzFormat::Latex.render("2301.00001", &figures);
        let wrapped = out
            .find("\\begin{tikzpicture}")
            .zip(out.find("\\begin{axis}"))
            .map(|(t, a)| t < a);
        assert_eq!(wrapped, Some(true));
    }

    #[test]
    fn test_brief_format_counts_by_kind() {
        let out = TikzFormat::Brief.render("2301.00001", &sample_figures());
        assert!(out.contains("2 TikZ figure(s) in 2301.00001"));
        assert!(out.contains("tikzpicture: 1"));
        assert!(out.contains("pgfplot: 1"));
        assert!(out.contains("[0] tikzpicture (3 lines, main.tex) - A node"));
    }

    #[test]
    fn test_brief_format_clamps_long_captions() {
        let mut figures = sample_figures();
        figures[0].caption = Some("x".repeat(100));
        let out = TikzFormat::Brief.render("2301.00001", &figures);
        assert!(out.contains(&format!("{}...", "x".repeat(60))));
        assert!(!out.contains(&"x".repeat(61)));
    }
}
