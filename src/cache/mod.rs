//! Persistent response cache for upstream API calls
//!
//! This module provides a file-backed cache mapping a request signature to the
//! last successful response payload, with per-category TTLs. arXiv and
//! Semantic Scholar are both rate limited, so every client consults the cache
//! before going to the network. Storage failures always degrade to cache-miss
//! behavior: the cache never fails a request.

mod key;
mod policy;
mod store;

pub use key::Signature;
pub use policy::{CachePolicy, TtlClass};
pub use store::{CacheStats, ResponseCache};
