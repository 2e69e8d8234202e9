//! Identifiers and metadata for uploaded documents.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier scoping which documents and chat history a client sees.
///
/// Generated as a UUID v4 when a client first connects; treated as an
/// opaque string everywhere else.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh session id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wrap an existing opaque id (e.g. one restored from a cookie).
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Generate a fresh document id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Metadata for one uploaded document.
///
/// Created on successful upload and indexing; mutated only by the active
/// flag toggle; destroyed (together with its index entries and chunk
/// texts) on explicit delete.
///
/// Invariant: `chunk_count` equals the number of index entries currently
/// owned by this document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMeta {
    /// Unique identifier for the document.
    pub id: DocumentId,
    /// The session this document belongs to.
    pub session_id: SessionId,
    /// Original filename as declared by the uploader.
    pub filename: String,
    /// Number of chunks produced at ingestion time.
    pub chunk_count: usize,
    /// Size of the uploaded file in bytes.
    pub file_size: usize,
    /// Whether the document participates in retrieval.
    pub is_active: bool,
    /// Upload timestamp.
    pub uploaded_at: DateTime<Utc>,
}

/// Reference to one chunk of a document: owner plus ordinal position.
///
/// Keys both the vector index entries and the chunk text store, so the
/// two stay joinable without the index owning any text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkRef {
    /// The owning document.
    pub document_id: DocumentId,
    /// Zero-based position of this chunk within the document.
    pub ordinal: usize,
}

impl ChunkRef {
    /// Create a chunk reference.
    pub fn new(document_id: DocumentId, ordinal: usize) -> Self {
        Self { document_id, ordinal }
    }
}

impl fmt::Display for ChunkRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.document_id, self.ordinal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ids_are_unique() {
        assert_ne!(SessionId::generate(), SessionId::generate());
    }

    #[test]
    fn chunk_ref_display_joins_id_and_ordinal() {
        let id = DocumentId::generate();
        let chunk = ChunkRef::new(id, 3);
        assert_eq!(chunk.to_string(), format!("{id}#3"));
    }
}
