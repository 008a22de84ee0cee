//! docdex: the search core of a documentation site.
//!
//! Two components, consumed leaf-first: the document extractor turns a parsed
//! document tree into flat [`types::SearchRecord`]s, and the search engine
//! builds an inverted index over a record batch and answers queries with
//! ranked, highlighted results.
//!
//! ```no_run
//! use docdex::{ExtractSession, build_index, search};
//!
//! # fn run(documents: &[docdex::document::Document]) -> docdex::error::Result<()> {
//! let mut session = ExtractSession::default();
//! let records = session.extract_all(documents);
//! let index = build_index(&records)?;
//! let results = search(&index, &records, "type helpers");
//! # let _ = results;
//! # Ok(())
//! # }
//! ```

pub mod document;
pub mod error;
pub mod extract;
pub mod logging;
pub mod search;
pub mod types;

pub use extract::{ExtractConfig, ExtractSession, IdStrategy};
pub use search::{SearchIndex, build_index, search};
pub use types::{Heading, RecordKind, SearchRecord, SearchResult};
