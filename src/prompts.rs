//! Structured analysis prompt templates
//!
//! Templates for analyzing paper content and extracted TikZ figures. The
//! `analyze` commands combine one of these with fetched content to produce a
//! ready-to-use analysis request.

use clap::ValueEnum;

/// Paper analysis prompt families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PaperPrompt {
    /// Fast structured summary
    #[default]
    Quick,
    /// Detailed methodology extraction
    Methodology,
    /// Identify and rank contributions
    Contribution,
    /// Critical strengths/weaknesses analysis
    Critical,
    /// Multi-paper comparison table
    Compare,
    /// Literature review organization
    Literature,
    /// Reproduction details
    Implementation,
    /// Evaluate as evidence for a claim
    Evidence,
}

impl PaperPrompt {
    /// All prompts, in listing order.
    pub const ALL: [PaperPrompt; 8] = [
        PaperPrompt::Quick,
        PaperPrompt::Methodology,
        PaperPrompt::Contribution,
        PaperPrompt::Critical,
        PaperPrompt::Compare,
        PaperPrompt::Literature,
        PaperPrompt::Implementation,
        PaperPrompt::Evidence,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PaperPrompt::Quick => "quick",
            PaperPrompt::Methodology => "methodology",
            PaperPrompt::Contribution => "contribution",
            PaperPrompt::Critical => "critical",
            PaperPrompt::Compare => "compare",
            PaperPrompt::Literature => "literature",
            PaperPrompt::Implementation => "implementation",
            PaperPrompt::Evidence => "evidence",
        }
    }

    /// One-line description shown by `prompt list`.
    pub fn description(self) -> &'static str {
        match self {
            PaperPrompt::Quick => {
                "Fast structured summary (problem, method, contribution, limitations)"
            }
            PaperPrompt::Methodology => "Detailed methodology extraction for understanding approach",
            PaperPrompt::Contribution => "Identify and rank paper contributions",
            PaperPrompt::Critical => "Critical analysis with strengths, weaknesses, concerns",
            PaperPrompt::Compare => "Multi-paper comparison table",
            PaperPrompt::Literature => "Organize papers for literature review",
            PaperPrompt::Implementation => "Extract details for reproducing the work",
            PaperPrompt::Evidence => "Evaluate paper as evidence for a specific claim",
        }
    }

    /// The full prompt template.
    pub fn template(self) -> &'static str {
        match self {
            PaperPrompt::Quick => QUICK,
            PaperPrompt::Methodology => METHODOLOGY,
            PaperPrompt::Contribution => CONTRIBUTION,
            PaperPrompt::Critical => CRITICAL,
            PaperPrompt::Compare => COMPARE,
            PaperPrompt::Literature => LITERATURE,
            PaperPrompt::Implementation => IMPLEMENTATION,
            PaperPrompt::Evidence => EVIDENCE,
        }
    }
}

/// TikZ figure analysis prompt families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TikzPrompt {
    /// Structured figure summary
    #[default]
    Quick,
    /// Packages, styling, and layout analysis
    Technical,
    /// Cross-figure comparison
    Compare,
}

impl TikzPrompt {
    pub fn template(self) -> &'static str {
        match self {
            TikzPrompt::Quick => TIKZ_QUICK,
            TikzPrompt::Technical => TIKZ_TECHNICAL,
            TikzPrompt::Compare => TIKZ_COMPARE,
        }
    }
}

/// Renders the prompt listing for `prompt list`.
pub fn list_prompts() -> String {
    let mut out = String::from("Available Analysis Prompts:\n");
    out.push_str(&"-".repeat(60));
    out.push('\n');
    for prompt in PaperPrompt::ALL {
        out.push_str(&format!(
            "  {:15} - {}\n",
            prompt.name(),
            prompt.description()
        ));
    }
    out.push_str("\nUsage: arxscout prompt get <prompt_name>\n");
    out
}

/// Combines a prompt template with paper content into a complete analysis
/// request. `context` prepends additional framing when given.
pub fn analysis_request(
    paper_content: &str,
    prompt: PaperPrompt,
    context: Option<&str>,
) -> String {
    let request = format!(
        "Please analyze the following paper content using the structured format below.\n\n\
         {}\n\n---\nPAPER CONTENT:\n---\n\n{}\n",
        prompt.template(),
        paper_content
    );

    match context {
        Some(context) => format!("Context: {context}\n\n{request}"),
        None => request,
    }
}

/// Combines a TikZ prompt with rendered figures into an analysis request.
pub fn tikz_analysis_request(
    arxiv_id: &str,
    figure_count: usize,
    rendered: &str,
    prompt: TikzPrompt,
) -> String {
    format!(
        "Please analyze the following TikZ figures using the structured format below.\n\n\
         {}\n\n---\nTIKZ FIGURES ({figure_count} from arXiv:{arxiv_id}):\n---\n\n{rendered}\n",
        prompt.template()
    )
}

const QUICK: &str = "\
Analyze this paper and provide a structured summary:

## Problem
What problem does this paper address? (1-2 sentences)

## Method
How does it solve the problem? (2-3 sentences describing the approach)

## Contribution
What is novel or new? (1-2 sentences on key contributions)

## Limitations
What are the limitations or constraints? (1-2 sentences)

## Key Takeaway
One sentence summary for someone who will never read the full paper.
";

const METHODOLOGY: &str = "\
Extract the methodology details from this paper:

## Core Approach
- Algorithm/method name:
- High-level description:

## Key Assumptions
1.
2.
3.

## Technical Details
- Architecture/design:
- Key parameters:
- Training/optimization (if applicable):

## Experimental Setup
- Datasets used:
- Baseline comparisons:
- Evaluation metrics:

## Reproducibility
- Code available: (yes/no/url)
- Data available: (yes/no/url)
- Key implementation details:
";

const CONTRIBUTION: &str = "\
Identify the contributions of this paper:

## Main Contributions (ranked by significance)
1. [Most significant]
2.
3.

## Novelty Analysis
- What existed before:
- What this paper adds:
- Why it matters:

## Comparison to Prior Work
| Aspect | Prior Work | This Paper | Improvement |
|--------|------------|------------|-------------|
|        |            |            |             |

## Impact Assessment
- Theoretical impact:
- Practical impact:
- Potential applications:
";

const CRITICAL: &str = "\
Critically analyze this paper:

## Strengths
1.
2.
3.

## Weaknesses
1.
2.
3.

## Assumptions to Question
- Assumption 1: [Is it valid?]
- Assumption 2: [Is it valid?]

## Missing Elements
- What experiments are missing?
- What comparisons would strengthen the claims?
- What edge cases are not addressed?

## Potential Issues
- Reproducibility concerns:
- Scalability concerns:
- Generalization concerns:

## Overall Assessment
[Fair and balanced evaluation]
";

const COMPARE: &str = "\
Compare the following papers on these dimensions:

| Dimension | Paper A | Paper B | Paper C |
|-----------|---------|---------|---------|
| Problem addressed |  |  |  |
| Core method |  |  |  |
| Key innovation |  |  |  |
| Datasets used |  |  |  |
| Main results |  |  |  |
| Limitations |  |  |  |
| Code available |  |  |  |
| Year published |  |  |  |

## Key Differences
1.
2.
3.

## Which to Use When
- Use Paper A when:
- Use Paper B when:
- Use Paper C when:

## Research Gap
What do none of these papers address?
";

const LITERATURE: &str = "\
Organize these papers for a literature review:

## Thematic Grouping
Group the papers by theme/approach:

### Theme 1: [Name]
- Paper X: [brief contribution]
- Paper Y: [brief contribution]

### Theme 2: [Name]
- Paper Z: [brief contribution]

## Timeline/Evolution
How has the field evolved?
- Early work (before 20XX):
- Key developments (20XX-20XX):
- Recent advances (20XX-present):

## Open Problems
What questions remain unanswered?
1.
2.
3.

## Synthesis
Write a 200-word synthesis paragraph connecting these works.
";

const IMPLEMENTATION: &str = "\
Extract implementation details for reproducing this work:

## Environment Requirements
- Programming language:
- Key libraries/frameworks:
- Hardware requirements:

## Architecture Details
```
[Describe or diagram the architecture]
```

## Hyperparameters
| Parameter | Value | Notes |
|-----------|-------|-------|
|           |       |       |

## Training Details
- Dataset preprocessing:
- Training procedure:
- Optimization settings:

## Evaluation Protocol
- Test/validation split:
- Metrics computation:
- Statistical tests:

## Code Resources
- Official repository:
- Third-party implementations:
- Pre-trained models:
";

const EVIDENCE: &str = "\
Evaluate if this paper can be used as evidence for a specific claim:

## The Claim to Support
[State the claim you want to support]

## Paper's Relevant Findings
1.
2.
3.

## Strength of Evidence
- Direct support: [yes/partial/no]
- Experimental validation: [strong/moderate/weak]
- Generalizability: [high/medium/low]

## Caveats
- Context limitations:
- Methodology concerns:
- Conflicting findings:

## Citation Recommendation
- Should cite: [yes/no/maybe]
- How to cite: [as primary evidence / as supporting evidence / as context]
- Suggested citation context: \"[Sentence showing how to incorporate]\"
";

const TIKZ_QUICK: &str = "\
Analyze these TikZ figures and provide a structured summary:

## Overview
How many figures? What types (diagrams, plots, flowcharts, etc.)?

## Figure Descriptions
For each figure:
- What it depicts
- Key visual structure (nodes, edges, layers, axes, etc.)
- Purpose in the paper context

## Complexity
- Simple (few nodes/elements) / Medium / Complex (many layers, custom styles)
- Estimated effort to reproduce or modify

## Reusability
Which figures (or parts) could be adapted for other papers?
";

const TIKZ_TECHNICAL: &str = "\
Provide a technical analysis of these TikZ figures:

## Package Dependencies
- TikZ libraries used and why
- Additional packages required (pgfplots, tikz-cd, circuitikz, etc.)

## Styling Analysis
For each figure:
- Node styles and custom definitions
- Color schemes
- Line styles and decorations
- Coordinate systems used

## Layout Methods
- Manual positioning vs. automatic layout
- Use of relative coordinates, calc library, etc.
- Anchoring and alignment strategies

## Reproducibility Notes
- Are all styles self-contained or do they depend on external definitions?
- Missing preamble definitions that would be needed
- Potential compilation issues
";

const TIKZ_COMPARE: &str = "\
Compare these TikZ figures:

| Aspect | Figure 1 | Figure 2 | Figure 3 |
|--------|----------|----------|----------|
| Type | | | |
| Elements count | | | |
| Libraries needed | | | |
| Complexity | | | |
| Purpose | | | |

## Stylistic Consistency
Are the figures visually consistent with each other?

## Shared Patterns
What TikZ patterns/styles are reused across figures?

## Differences
Key structural or stylistic differences between figures.
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_prompt_has_distinct_template() {
        let templates: Vec<&str> = PaperPrompt::ALL.iter().map(|p| p.template()).collect();
        for (i, a) in templates.iter().enumerate() {
            for b in &templates[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_list_includes_all_prompt_names() {
        let listing = list_prompts();
        for prompt in PaperPrompt::ALL {
            assert!(listing.contains(prompt.name()), "missing {}", prompt.name());
        }
    }

    #[test]
    fn test_analysis_request_embeds_content_and_template() {
        let request = analysis_request("The paper text.", PaperPrompt::Quick, None);
        assert!(request.contains("## Key Takeaway"));
        assert!(request.contains("The paper text."));
        assert!(!request.starts_with("Context:"));
    }

    #[test]
    fn test_analysis_request_prepends_context() {
        let request = analysis_request(
            "Body.",
            PaperPrompt::Critical,
            Some("Focus on the evaluation section"),
        );
        assert!(request.starts_with("Context: Focus on the evaluation section"));
        assert!(request.contains("## Weaknesses"));
    }

    #[test]
    fn test_tikz_analysis_request_names_paper() {
        let request =
            tikz_analysis_request("2301.00001", 2, "<figures>", TikzPrompt::Technical);
        assert!(request.contains("TIKZ FIGURES (2 from arXiv:2301.00001)"));
        assert!(request.contains("## Package Dependencies"));
        assert!(request.contains("<figures>"));
    }
}
