//! arxscout - arXiv literature research from the command line
//!
//! Searches arXiv, enriches results with Semantic Scholar citation data,
//! generates citations, extracts TikZ figures from paper sources, and wraps
//! paper content in structured analysis prompts. API responses are cached on
//! disk with per-category expiry so repeated research sessions stay fast and
//! polite to the upstream services.

pub mod app;
pub mod cache;
pub mod cite;
pub mod cli;
pub mod data;
pub mod output;
pub mod prompts;
pub mod tikz;
