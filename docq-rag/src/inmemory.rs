//! In-memory vector index using brute-force cosine similarity.
//!
//! This module provides [`InMemoryVectorIndex`], a flat scan over a `Vec`
//! of entries protected by a `tokio::sync::RwLock`. At the scale of a
//! single session's documents (tens of thousands of chunks) an exact
//! brute-force scan satisfies the search contract without the rebuild
//! cost of an approximate structure.

use std::collections::HashSet;

use async_trait::async_trait;
use docq_core::DocumentId;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{RagError, Result};
use crate::index::{IndexEntry, ScoredChunk, VectorIndex};

/// A flat, exact cosine-similarity index.
///
/// All entries share one dimensionality fixed at construction; inserting
/// or querying with a vector of any other length fails fast rather than
/// corrupting similarity computations. Entries keep insertion order,
/// which doubles as the deterministic tie-break for equal scores.
///
/// # Example
///
/// ```rust,ignore
/// use docq_rag::{InMemoryVectorIndex, VectorIndex};
///
/// let index = InMemoryVectorIndex::new(1536);
/// index.insert_batch(entries).await?;
/// let hits = index.search(&query, 5, &active_ids).await?;
/// ```
#[derive(Debug)]
pub struct InMemoryVectorIndex {
    dimensions: usize,
    entries: RwLock<Vec<IndexEntry>>,
}

impl InMemoryVectorIndex {
    /// Create an empty index for vectors of the given dimensionality.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions, entries: RwLock::new(Vec::new()) }
    }

    /// The dimensionality this index was created with.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Compute cosine similarity between two vectors of equal length.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn insert_batch(&self, batch: Vec<IndexEntry>) -> Result<()> {
        // Validate before taking the write lock so a bad batch leaves the
        // index untouched.
        for entry in &batch {
            if entry.vector.len() != self.dimensions {
                return Err(RagError::DimensionMismatch {
                    expected: self.dimensions,
                    actual: entry.vector.len(),
                });
            }
        }

        let mut entries = self.entries.write().await;
        debug!(inserted = batch.len(), total = entries.len() + batch.len(), "index insert");
        entries.extend(batch);
        Ok(())
    }

    async fn remove_by_document(&self, document_id: DocumentId) -> Result<usize> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|e| e.chunk.document_id != document_id);
        let removed = before - entries.len();
        debug!(document.id = %document_id, removed, "index remove");
        Ok(removed)
    }

    async fn search(
        &self,
        query: &[f32],
        k: usize,
        active: &HashSet<DocumentId>,
    ) -> Result<Vec<ScoredChunk>> {
        let entries = self.entries.read().await;
        if entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        if query.len() != self.dimensions {
            return Err(RagError::DimensionMismatch {
                expected: self.dimensions,
                actual: query.len(),
            });
        }

        let mut scored: Vec<ScoredChunk> = entries
            .iter()
            .filter(|e| active.contains(&e.chunk.document_id))
            .map(|e| ScoredChunk {
                chunk: e.chunk,
                score: cosine_similarity(&e.vector, query),
            })
            .collect();

        // Stable sort: equal scores keep insertion order, so results are
        // deterministic across runs.
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }

    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use docq_core::ChunkRef;

    use super::*;

    fn entry(doc: DocumentId, ordinal: usize, vector: Vec<f32>) -> IndexEntry {
        IndexEntry::new(ChunkRef::new(doc, ordinal), vector)
    }

    fn active(ids: &[DocumentId]) -> HashSet<DocumentId> {
        ids.iter().copied().collect()
    }

    #[tokio::test]
    async fn empty_index_returns_empty_result() {
        let index = InMemoryVectorIndex::new(3);
        let hits = index.search(&[1.0, 0.0, 0.0], 5, &HashSet::new()).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn exact_match_ranks_first() {
        let index = InMemoryVectorIndex::new(3);
        let doc = DocumentId::generate();
        index
            .insert_batch(vec![
                entry(doc, 0, vec![0.4, 0.3, 0.0]),
                entry(doc, 1, vec![0.0, 1.0, 0.0]),
                entry(doc, 2, vec![2.0, 0.0, 0.0]),
            ])
            .await
            .unwrap();

        let hits = index.search(&[1.0, 0.0, 0.0], 3, &active(&[doc])).await.unwrap();
        assert_eq!(hits[0].chunk.ordinal, 2);
        assert!((hits[0].score - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn ties_break_by_insertion_order() {
        let index = InMemoryVectorIndex::new(2);
        let doc = DocumentId::generate();
        // Two identical vectors: the earlier insertion must win.
        index
            .insert_batch(vec![
                entry(doc, 7, vec![1.0, 0.0]),
                entry(doc, 3, vec![1.0, 0.0]),
            ])
            .await
            .unwrap();

        let hits = index.search(&[1.0, 0.0], 1, &active(&[doc])).await.unwrap();
        assert_eq!(hits[0].chunk.ordinal, 7);
    }

    #[tokio::test]
    async fn remove_by_document_leaves_no_trace() {
        let index = InMemoryVectorIndex::new(2);
        let keep = DocumentId::generate();
        let gone = DocumentId::generate();
        index
            .insert_batch(vec![
                entry(keep, 0, vec![1.0, 0.0]),
                entry(gone, 0, vec![0.9, 0.1]),
                entry(gone, 1, vec![0.8, 0.2]),
            ])
            .await
            .unwrap();

        let removed = index.remove_by_document(gone).await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(index.len().await, 1);

        for k in [1, 5, 100] {
            let hits = index.search(&[1.0, 0.0], k, &active(&[keep, gone])).await.unwrap();
            assert!(hits.iter().all(|h| h.chunk.document_id != gone));
        }
    }

    #[tokio::test]
    async fn inactive_documents_are_filtered_at_query_time() {
        let index = InMemoryVectorIndex::new(2);
        let shown = DocumentId::generate();
        let hidden = DocumentId::generate();
        index
            .insert_batch(vec![
                entry(shown, 0, vec![0.5, 0.5]),
                entry(hidden, 0, vec![1.0, 0.0]),
            ])
            .await
            .unwrap();

        let hits = index.search(&[1.0, 0.0], 5, &active(&[shown])).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].chunk.document_id, shown);
    }

    #[tokio::test]
    async fn mismatched_insert_fails_fast_and_leaves_index_unchanged() {
        let index = InMemoryVectorIndex::new(3);
        let doc = DocumentId::generate();
        let err = index
            .insert_batch(vec![
                entry(doc, 0, vec![1.0, 0.0, 0.0]),
                entry(doc, 1, vec![1.0, 0.0]),
            ])
            .await;

        assert!(matches!(err, Err(RagError::DimensionMismatch { expected: 3, actual: 2 })));
        assert_eq!(index.len().await, 0);
    }

    #[tokio::test]
    async fn mismatched_query_is_rejected() {
        let index = InMemoryVectorIndex::new(3);
        let doc = DocumentId::generate();
        index.insert_batch(vec![entry(doc, 0, vec![1.0, 0.0, 0.0])]).await.unwrap();

        let err = index.search(&[1.0, 0.0], 1, &active(&[doc])).await;
        assert!(matches!(err, Err(RagError::DimensionMismatch { .. })));
    }

    #[tokio::test]
    async fn zero_magnitude_vectors_score_zero() {
        let index = InMemoryVectorIndex::new(2);
        let doc = DocumentId::generate();
        index.insert_batch(vec![entry(doc, 0, vec![0.0, 0.0])]).await.unwrap();

        let hits = index.search(&[1.0, 0.0], 1, &active(&[doc])).await.unwrap();
        assert_eq!(hits[0].score, 0.0);
    }
}
