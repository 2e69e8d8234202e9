//! Vector index trait for storing and searching embedding vectors.

use std::collections::HashSet;

use async_trait::async_trait;
use docq_core::{ChunkRef, DocumentId};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One indexed vector and the chunk it belongs to.
///
/// The index exclusively owns vector storage; chunk text lives in the
/// session store keyed by the same [`ChunkRef`].
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    /// The chunk this vector embeds.
    pub chunk: ChunkRef,
    /// The embedding vector.
    pub vector: Vec<f32>,
}

impl IndexEntry {
    /// Create an index entry.
    pub fn new(chunk: ChunkRef, vector: Vec<f32>) -> Self {
        Self { chunk, vector }
    }
}

/// A retrieved chunk reference paired with its cosine similarity score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    /// The retrieved chunk.
    pub chunk: ChunkRef,
    /// Cosine similarity to the query, in `[-1.0, 1.0]`; higher is more similar.
    pub score: f32,
}

/// A nearest-neighbor structure over embedding vectors.
///
/// Implementations must return exact top-k by cosine similarity whatever
/// internal structure they choose; approximate indexing is an optional
/// optimization only if it preserves that contract at session scale.
///
/// Mutations are serialized against concurrent searches: a reader
/// observes either the pre- or post-mutation state, never a torn mix.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Append a batch of entries in one atomic step.
    ///
    /// All entries become searchable together, so a document being
    /// ingested is invisible to queries until its insert completes.
    ///
    /// # Errors
    ///
    /// Fails fast with [`RagError::DimensionMismatch`](crate::RagError::DimensionMismatch)
    /// if any vector has the wrong dimensionality; the index is left unchanged.
    async fn insert_batch(&self, entries: Vec<IndexEntry>) -> Result<()>;

    /// Delete all entries owned by the given document.
    ///
    /// Returns the number of entries removed. The index is always left in
    /// a queryable, consistent state.
    async fn remove_by_document(&self, document_id: DocumentId) -> Result<usize>;

    /// Return up to `k` entries most similar to `query` among entries
    /// whose owning document is in `active`, descending by score. Ties
    /// break by insertion order (earlier wins). An empty index yields an
    /// empty result, not an error.
    async fn search(
        &self,
        query: &[f32],
        k: usize,
        active: &HashSet<DocumentId>,
    ) -> Result<Vec<ScoredChunk>>;

    /// Total number of indexed entries (active or not).
    async fn len(&self) -> usize;

    /// Whether the index holds no entries.
    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
