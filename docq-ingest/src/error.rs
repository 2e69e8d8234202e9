//! Error types for the `docq-ingest` crate.

use docq_core::DocqError;
use thiserror::Error;

/// Errors that can occur while taking in an uploaded document.
///
/// All of these are user-correctable: they stop at the collaborator
/// boundary and become a user-visible message, and the upload is
/// rejected rather than retried.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The file's extension and declared mime type are both unrecognized.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Extraction produced no text (blank file, image-only PDF).
    #[error("Empty document: no text after extraction")]
    EmptyDocument,

    /// Every extraction strategy for the format failed.
    #[error("Extraction failed ({format}): {message}")]
    ExtractionFailed {
        /// The detected document format.
        format: String,
        /// The last strategy's failure.
        message: String,
    },

    /// The upload exceeds the size limit.
    #[error("File too large: {size} bytes (limit {limit})")]
    TooLarge {
        /// Size of the rejected upload.
        size: usize,
        /// The configured limit.
        limit: usize,
    },
}

impl From<IngestError> for DocqError {
    fn from(err: IngestError) -> Self {
        DocqError::Input(err.to_string())
    }
}

/// A convenience result type for ingest operations.
pub type Result<T> = std::result::Result<T, IngestError>;
