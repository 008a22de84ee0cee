//! Error handling types and utilities.

/// A specialized Result type for docdex operations.
///
/// An alias for `anyhow::Result`, for callers that combine extraction and
/// indexing errors in one pipeline.
pub type Result<T> = anyhow::Result<T>;

/// Error returned when a single document cannot be extracted.
///
/// Batch extraction recovers from these locally: the document is logged and
/// skipped, the rest of the batch continues.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExtractError {
    /// The document has no usable title.
    #[error("document at '{path}' has an empty title")]
    EmptyTitle { path: String },
    /// The document has no path to derive a URL from.
    #[error("document has an empty path")]
    EmptyPath,
}

/// Error returned when index construction is handed a malformed record batch.
///
/// These indicate an upstream extraction bug rather than a transient condition,
/// so construction fails loudly instead of recovering.
#[derive(Debug, Clone, thiserror::Error)]
pub enum IndexError {
    /// Two records in the batch share an id.
    #[error("duplicate record id '{0}' in index batch")]
    DuplicateId(String),
}
