//! Error types for the `docq-chat` crate.

use docq_core::{DocqError, DocumentId};
use docq_ingest::IngestError;
use thiserror::Error;

/// Errors surfaced by chat orchestration.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The orchestrator was assembled with missing or invalid settings.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The upload was rejected before indexing (bad format, empty file,
    /// extraction failure, oversize).
    #[error("Upload rejected: {0}")]
    Upload(#[from] IngestError),

    /// Embedding or indexing failed while ingesting an accepted upload.
    #[error("Indexing failed: {0}")]
    IndexingFailed(String),

    /// Embedding or vector search failed during a query.
    #[error("Retrieval failed: {0}")]
    RetrievalFailed(String),

    /// The completion call failed.
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// The message was empty after trimming.
    #[error("Empty message")]
    EmptyMessage,

    /// The referenced document does not exist in this session.
    #[error("Document not found: {0}")]
    DocumentNotFound(DocumentId),

    /// There is no prior user message to regenerate from.
    #[error("No previous message to regenerate")]
    NothingToRegenerate,

    /// The registry and the index disagree about a document.
    ///
    /// Fatal to the operation and never auto-corrected; the index itself
    /// stays queryable for subsequent operations.
    #[error("Registry/index mismatch for document {document_id}: {details}")]
    Inconsistent {
        /// The document whose bookkeeping disagrees.
        document_id: DocumentId,
        /// What disagreed.
        details: String,
    },
}

impl From<ChatError> for DocqError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::Upload(e) => e.into(),
            ChatError::Config(_) | ChatError::EmptyMessage => DocqError::Input(err.to_string()),
            ChatError::DocumentNotFound(_) | ChatError::NothingToRegenerate => {
                DocqError::NotFound(err.to_string())
            }
            ChatError::IndexingFailed(ref m)
            | ChatError::RetrievalFailed(ref m)
            | ChatError::GenerationFailed(ref m) => {
                DocqError::service("docq", m.clone())
            }
            ChatError::Inconsistent { .. } => DocqError::Consistency(err.to_string()),
        }
    }
}

/// A convenience result type for chat operations.
pub type Result<T> = std::result::Result<T, ChatError>;
