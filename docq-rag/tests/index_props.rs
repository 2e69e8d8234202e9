//! Property tests for in-memory vector index search ordering.

use std::collections::HashSet;

use docq_core::{ChunkRef, DocumentId};
use docq_rag::index::{IndexEntry, VectorIndex};
use docq_rag::inmemory::InMemoryVectorIndex;
use proptest::prelude::*;

const DIM: usize = 16;

/// Generate a non-zero L2-normalized embedding of the given dimension.
fn arb_normalized_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map(
        "non-zero embedding",
        |mut v| {
            let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm < 1e-8 {
                return None;
            }
            for val in &mut v {
                *val /= norm;
            }
            Some(v)
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// For any set of stored vectors, search returns results ordered by
    /// descending cosine similarity, bounded by both `top_k` and the
    /// number of stored entries.
    #[test]
    fn results_ordered_descending_and_bounded_by_top_k(
        vectors in proptest::collection::vec(arb_normalized_embedding(DIM), 1..20),
        query in arb_normalized_embedding(DIM),
        top_k in 1usize..25,
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let (results, stored) = rt.block_on(async {
            let index = InMemoryVectorIndex::new(DIM);
            let doc = DocumentId::generate();
            let entries: Vec<IndexEntry> = vectors
                .iter()
                .enumerate()
                .map(|(i, v)| IndexEntry::new(ChunkRef::new(doc, i), v.clone()))
                .collect();
            let stored = entries.len();

            index.insert_batch(entries).await.unwrap();
            let active: HashSet<DocumentId> = [doc].into_iter().collect();
            let results = index.search(&query, top_k, &active).await.unwrap();
            (results, stored)
        });

        prop_assert!(results.len() <= top_k);
        prop_assert!(results.len() <= stored);

        for window in results.windows(2) {
            prop_assert!(
                window[0].score >= window[1].score,
                "results not in descending order: {} < {}",
                window[0].score,
                window[1].score,
            );
        }
    }

    /// Removing a document then searching never surfaces its chunks,
    /// whatever `k` is.
    #[test]
    fn removed_documents_never_surface(
        kept in proptest::collection::vec(arb_normalized_embedding(DIM), 1..10),
        removed in proptest::collection::vec(arb_normalized_embedding(DIM), 1..10),
        query in arb_normalized_embedding(DIM),
        top_k in 1usize..30,
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let results = rt.block_on(async {
            let index = InMemoryVectorIndex::new(DIM);
            let keep_doc = DocumentId::generate();
            let gone_doc = DocumentId::generate();

            let mut entries: Vec<IndexEntry> = Vec::new();
            for (i, v) in kept.iter().enumerate() {
                entries.push(IndexEntry::new(ChunkRef::new(keep_doc, i), v.clone()));
            }
            for (i, v) in removed.iter().enumerate() {
                entries.push(IndexEntry::new(ChunkRef::new(gone_doc, i), v.clone()));
            }
            index.insert_batch(entries).await.unwrap();
            index.remove_by_document(gone_doc).await.unwrap();

            let active: HashSet<DocumentId> = [keep_doc, gone_doc].into_iter().collect();
            let results = index.search(&query, top_k, &active).await.unwrap();
            (results, gone_doc)
        });

        let (results, gone_doc) = results;
        for hit in &results {
            prop_assert!(hit.chunk.document_id != gone_doc);
        }
    }
}
