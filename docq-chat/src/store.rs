//! Per-session state: document registry, chunk text store, chat history.
//!
//! The store is passed explicitly into every orchestrator operation,
//! never held as ambient global state, so tests can instantiate
//! isolated sessions and a storage collaborator can persist and restore
//! the contents. The vector index is NOT here: it owns vectors, this
//! store owns everything keyed by the same [`ChunkRef`]s.

use std::collections::HashMap;

use docq_core::{ChunkRef, DocumentId, DocumentMeta, Message, Role, SessionId};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{ChatError, Result};

/// Aggregate counters for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Documents registered, active or not.
    pub total_documents: usize,
    /// Documents currently participating in retrieval.
    pub active_documents: usize,
    /// Chunks belonging to active documents.
    pub active_chunks: usize,
    /// Total uploaded bytes across all documents.
    pub total_bytes: usize,
    /// Messages in the chat history.
    pub message_count: usize,
}

#[derive(Debug, Default)]
struct StoreInner {
    documents: HashMap<DocumentId, DocumentMeta>,
    chunks: HashMap<ChunkRef, String>,
    history: Vec<Message>,
}

/// Mutable state scoped to one session.
///
/// All mutation goes through `&self` methods behind a `tokio::sync::RwLock`,
/// so concurrent queries against the same session observe either the
/// pre- or post-mutation state of any operation, never a torn mix.
#[derive(Debug)]
pub struct SessionStore {
    session_id: SessionId,
    inner: RwLock<StoreInner>,
}

impl SessionStore {
    /// Create an empty store for the given session.
    pub fn new(session_id: SessionId) -> Self {
        Self { session_id, inner: RwLock::new(StoreInner::default()) }
    }

    /// The session this store belongs to.
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    // ── documents ──────────────────────────────────────────────────

    /// Register a document and its chunk texts in one step.
    ///
    /// Called after the document's vectors are already committed to the
    /// index, so the document becomes visible to retrieval atomically.
    pub async fn add_document(&self, meta: DocumentMeta, chunks: Vec<(ChunkRef, String)>) {
        let mut inner = self.inner.write().await;
        for (chunk_ref, text) in chunks {
            inner.chunks.insert(chunk_ref, text);
        }
        inner.documents.insert(meta.id, meta);
    }

    /// All documents in upload order.
    pub async fn documents(&self) -> Vec<DocumentMeta> {
        let inner = self.inner.read().await;
        let mut documents: Vec<DocumentMeta> = inner.documents.values().cloned().collect();
        documents.sort_by(|a, b| a.uploaded_at.cmp(&b.uploaded_at).then(a.id.cmp(&b.id)));
        documents
    }

    /// Metadata for one document.
    pub async fn document(&self, id: DocumentId) -> Result<DocumentMeta> {
        let inner = self.inner.read().await;
        inner.documents.get(&id).cloned().ok_or(ChatError::DocumentNotFound(id))
    }

    /// Ids of documents currently participating in retrieval.
    pub async fn active_ids(&self) -> std::collections::HashSet<DocumentId> {
        let inner = self.inner.read().await;
        inner.documents.values().filter(|d| d.is_active).map(|d| d.id).collect()
    }

    /// Number of registered documents.
    pub async fn document_count(&self) -> usize {
        self.inner.read().await.documents.len()
    }

    /// Flip a document's active flag, returning the new state.
    ///
    /// The index is untouched: activity only changes the query-time
    /// filter set, so toggling off and back on restores the document to
    /// the result set with its previous ranking.
    pub async fn toggle_active(&self, id: DocumentId) -> Result<bool> {
        let mut inner = self.inner.write().await;
        let meta = inner.documents.get_mut(&id).ok_or(ChatError::DocumentNotFound(id))?;
        meta.is_active = !meta.is_active;
        Ok(meta.is_active)
    }

    /// Remove a document's metadata and chunk texts.
    ///
    /// Returns the removed metadata and how many chunk texts went with
    /// it, so the caller can verify the count against both the metadata
    /// and the index removal.
    pub async fn remove_document(&self, id: DocumentId) -> Result<(DocumentMeta, usize)> {
        let mut inner = self.inner.write().await;
        let meta = inner.documents.remove(&id).ok_or(ChatError::DocumentNotFound(id))?;
        let before = inner.chunks.len();
        inner.chunks.retain(|chunk_ref, _| chunk_ref.document_id != id);
        Ok((meta, before - inner.chunks.len()))
    }

    // ── chunk texts ────────────────────────────────────────────────

    /// Resolve chunk texts for the given references, in order.
    ///
    /// A reference the store does not know yields `None` in its slot;
    /// the caller treats that as a registry/index inconsistency.
    pub async fn chunk_texts(&self, refs: &[ChunkRef]) -> Vec<Option<String>> {
        let inner = self.inner.read().await;
        refs.iter().map(|r| inner.chunks.get(r).cloned()).collect()
    }

    // ── chat history ───────────────────────────────────────────────

    /// Append a message to the history.
    pub async fn push_message(&self, message: Message) {
        self.inner.write().await.history.push(message);
    }

    /// The full history in order.
    pub async fn history(&self) -> Vec<Message> {
        self.inner.read().await.history.clone()
    }

    /// Drop all chat history, keeping documents.
    pub async fn clear_history(&self) {
        self.inner.write().await.history.clear();
    }

    /// Prepare a regenerate: drop any assistant messages after the last
    /// user turn and return that turn's text.
    ///
    /// The surviving history ends with the user message to re-answer.
    pub async fn prepare_regenerate(&self) -> Result<String> {
        let mut inner = self.inner.write().await;
        let last_user = inner
            .history
            .iter()
            .rposition(|m| m.role == Role::User)
            .ok_or(ChatError::NothingToRegenerate)?;
        inner.history.truncate(last_user + 1);
        Ok(inner.history[last_user].content.clone())
    }

    // ── stats ──────────────────────────────────────────────────────

    /// Aggregate counters for this session.
    pub async fn stats(&self) -> SessionStats {
        let inner = self.inner.read().await;
        let active: Vec<&DocumentMeta> =
            inner.documents.values().filter(|d| d.is_active).collect();
        SessionStats {
            total_documents: inner.documents.len(),
            active_documents: active.len(),
            active_chunks: active.iter().map(|d| d.chunk_count).sum(),
            total_bytes: inner.documents.values().map(|d| d.file_size).sum(),
            message_count: inner.history.len(),
        }
    }
}
