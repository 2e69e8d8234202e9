//! Error types for the `docq-rag` crate.

use docq_core::DocqError;
use thiserror::Error;

/// Errors that can occur in retrieval operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// Input text had no words left after extraction and normalization.
    #[error("Empty input: no words to chunk")]
    EmptyInput,

    /// The embedding service could not be reached or rejected the request.
    #[error("Embedding service unavailable ({provider}): {message}")]
    ServiceUnavailable {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The embedding service kept rate limiting after the retry budget.
    #[error("Embedding service rate limited ({provider}) after {attempts} attempts")]
    RateLimited {
        /// The embedding provider that produced the error.
        provider: String,
        /// How many attempts were made before giving up.
        attempts: u32,
    },

    /// A vector of the wrong dimensionality reached the index.
    #[error("Dimension mismatch: index holds {expected}-dimensional vectors, got {actual}")]
    DimensionMismatch {
        /// Dimensionality the index was created with.
        expected: usize,
        /// Dimensionality of the offending vector.
        actual: usize,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<RagError> for DocqError {
    fn from(err: RagError) -> Self {
        match err {
            RagError::EmptyInput | RagError::Config(_) => DocqError::Input(err.to_string()),
            RagError::ServiceUnavailable { ref provider, .. }
            | RagError::RateLimited { ref provider, .. } => {
                DocqError::service(provider.clone(), err.to_string())
            }
            RagError::DimensionMismatch { .. } => DocqError::Consistency(err.to_string()),
        }
    }
}

/// A convenience result type for retrieval operations.
pub type Result<T> = std::result::Result<T, RagError>;
