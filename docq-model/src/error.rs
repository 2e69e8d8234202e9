//! Error types for the `docq-model` crate.

use docq_core::DocqError;
use thiserror::Error;

/// Errors that can occur when calling a completion model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The completion request failed or returned nothing usable.
    #[error("Completion error ({provider}): {message}")]
    Completion {
        /// The model provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },
}

impl ModelError {
    /// Shorthand for a [`Completion`](ModelError::Completion) error.
    pub fn completion(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Completion { provider: provider.into(), message: message.into() }
    }
}

impl From<ModelError> for DocqError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Completion { provider, message } => DocqError::Service {
                service: provider,
                message,
            },
        }
    }
}

/// A convenience result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
