//! Full-text search over extracted documentation records.
//!
//! This module provides index construction, tokenization, tiered query
//! relaxation, phrase-boost scoring, and snippet/anchor assembly.

// Module declarations
pub(crate) mod index;
pub(crate) mod query;
pub(crate) mod scoring;
pub(crate) mod snippet;
pub(crate) mod tokenize;

// Public re-exports (used via lib.rs)
pub use index::{SearchIndex, build_index};
pub use query::search;
