//! The shared error taxonomy for docq crates.

use thiserror::Error;

/// Errors surfaced at the boundary between the docq core and its callers.
///
/// The taxonomy determines how a failure is handled:
///
/// - [`Input`](DocqError::Input) — user-correctable, reported verbatim
/// - [`NotFound`](DocqError::NotFound) — unknown document/session id, a
///   no-op failure rather than a crash
/// - [`Service`](DocqError::Service) — an external provider failed after
///   any retry policy was exhausted; provider internals are not leaked
///   beyond the `service` label
/// - [`Consistency`](DocqError::Consistency) — registry/index disagreement,
///   fatal to the operation and never silently auto-corrected
#[derive(Debug, Error)]
pub enum DocqError {
    /// Bad input from the user (unsupported format, empty file, empty message).
    #[error("Input error: {0}")]
    Input(String),

    /// An operation referenced an unknown document or session.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An external service (embedding, completion, search) failed.
    #[error("Service error ({service}): {message}")]
    Service {
        /// The external service that produced the error.
        service: String,
        /// A description of the failure.
        message: String,
    },

    /// Internal state disagreement between the document registry and the index.
    #[error("Consistency error: {0}")]
    Consistency(String),
}

impl DocqError {
    /// Shorthand for a [`Service`](DocqError::Service) error.
    pub fn service(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Service { service: service.into(), message: message.into() }
    }
}

/// A convenience result type for docq operations.
pub type Result<T> = std::result::Result<T, DocqError>;
