//! The chat orchestrator.
//!
//! One query moves through received → needs_web_decision → retrieving →
//! generating → completed, or drops to failed at the first stage error.
//! The stages show up as `phase` fields in the logs; nothing is persisted
//! to the session on a failed query.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use docq_core::{ChunkRef, DocumentId, DocumentMeta, Message, Source};
use docq_ingest::{IngestError, extract_normalized};
use docq_model::{CompletionRequest, Llm};
use docq_rag::index::ScoredChunk;
use docq_rag::{
    ContextAssembler, EmbeddingProvider, IndexEntry, RagConfig, RagError, VectorHit, VectorIndex,
    WebHit, WebSearchClient, WordChunker,
};
use tracing::{debug, error, info};

use crate::config::ChatConfig;
use crate::error::{ChatError, Result};
use crate::prompt;
use crate::store::{SessionStats, SessionStore};

/// An uploaded file, as handed over by the transport collaborator.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Raw file bytes.
    pub bytes: Vec<u8>,
    /// Filename as declared by the uploader.
    pub filename: String,
    /// Mime type as declared by the uploader; used only as a format hint.
    pub declared_mime: String,
}

/// The result of a successful upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadReceipt {
    /// Id of the newly registered document.
    pub document_id: DocumentId,
    /// How many chunks were indexed for it.
    pub chunk_count: usize,
}

/// One user query.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// The user's message.
    pub message: String,
    /// Persona instructions; the configured default applies when `None`.
    pub persona: Option<String>,
}

/// A completed answer with its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatOutcome {
    /// The model's answer.
    pub response_text: String,
    /// Evidence behind the answer, deduplicated per document.
    pub sources: Vec<Source>,
    /// False when no evidence matched and the model answered from
    /// general knowledge.
    pub grounded: bool,
    /// Whether web search was invoked for this query.
    pub used_web: bool,
}

/// Orchestrates uploads and queries over one set of collaborators.
///
/// Holds the chunker, embedding provider, vector index, web search
/// client, context assembler, and completion model; every operation also
/// takes the per-session [`SessionStore`] explicitly, so one
/// orchestrator serves any number of isolated sessions.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use docq_chat::{ChatOrchestrator, ChatRequest, SessionStore};
/// use docq_rag::{InMemoryVectorIndex, OpenAIEmbeddingProvider};
/// use docq_model::OpenAIChatModel;
///
/// let embedder = Arc::new(OpenAIEmbeddingProvider::from_env()?);
/// let orchestrator = ChatOrchestrator::builder()
///     .embedder(embedder.clone())
///     .index(Arc::new(InMemoryVectorIndex::new(embedder.dimensions())))
///     .llm(Arc::new(OpenAIChatModel::from_env()?))
///     .build()?;
///
/// let store = SessionStore::new(session_id);
/// let outcome = orchestrator
///     .chat(&store, ChatRequest { message: "…".into(), persona: None })
///     .await?;
/// ```
pub struct ChatOrchestrator {
    chat_config: ChatConfig,
    rag_config: RagConfig,
    chunker: WordChunker,
    assembler: ContextAssembler,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    web: Arc<WebSearchClient>,
    llm: Arc<dyn Llm>,
}

impl ChatOrchestrator {
    /// Create a new [`ChatOrchestratorBuilder`].
    pub fn builder() -> ChatOrchestratorBuilder {
        ChatOrchestratorBuilder::default()
    }

    // ── upload ─────────────────────────────────────────────────────

    /// Ingest one uploaded document: extract → chunk → embed → index →
    /// register.
    ///
    /// Vectors are committed to the index in one batch before the
    /// document enters the registry, so concurrent queries never see a
    /// partially indexed document.
    ///
    /// # Errors
    ///
    /// [`ChatError::Upload`] for rejected input (format, size, empty,
    /// extraction), [`ChatError::IndexingFailed`] when embedding or the
    /// index insert fails.
    pub async fn upload(
        &self,
        store: &SessionStore,
        request: UploadRequest,
    ) -> Result<UploadReceipt> {
        let text = extract_normalized(&request.bytes, &request.filename, &request.declared_mime)?;

        let chunks = self.chunker.chunk(&text).map_err(|e| match e {
            RagError::EmptyInput => ChatError::Upload(IngestError::EmptyDocument),
            other => ChatError::IndexingFailed(other.to_string()),
        })?;

        let texts: Vec<&str> = chunks.iter().map(String::as_str).collect();
        let embeddings = self.embedder.embed_batch(&texts).await.map_err(|e| {
            error!(filename = %request.filename, error = %e, "embedding failed during upload");
            ChatError::IndexingFailed(format!("embedding failed: {e}"))
        })?;
        if embeddings.len() != chunks.len() {
            return Err(ChatError::IndexingFailed(format!(
                "embedder returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let document_id = DocumentId::generate();
        let mut entries = Vec::with_capacity(chunks.len());
        let mut stored = Vec::with_capacity(chunks.len());
        for (ordinal, (chunk_text, vector)) in chunks.into_iter().zip(embeddings).enumerate() {
            let chunk_ref = ChunkRef::new(document_id, ordinal);
            entries.push(IndexEntry::new(chunk_ref, vector));
            stored.push((chunk_ref, chunk_text));
        }
        let chunk_count = entries.len();

        self.index
            .insert_batch(entries)
            .await
            .map_err(|e| ChatError::IndexingFailed(e.to_string()))?;

        let meta = DocumentMeta {
            id: document_id,
            session_id: store.session_id().clone(),
            filename: request.filename.clone(),
            chunk_count,
            file_size: request.bytes.len(),
            is_active: true,
            uploaded_at: Utc::now(),
        };
        store.add_document(meta, stored).await;

        info!(
            document.id = %document_id,
            chunk_count,
            filename = %request.filename,
            "document ingested"
        );
        Ok(UploadReceipt { document_id, chunk_count })
    }

    // ── chat ───────────────────────────────────────────────────────

    /// Answer a user message and append both turns to the session history.
    ///
    /// # Errors
    ///
    /// [`ChatError::EmptyMessage`], [`ChatError::RetrievalFailed`],
    /// [`ChatError::GenerationFailed`], or [`ChatError::Inconsistent`].
    /// On any failure the history is left untouched.
    pub async fn chat(&self, store: &SessionStore, request: ChatRequest) -> Result<ChatOutcome> {
        let message = request.message.trim().to_string();
        if message.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        let persona =
            request.persona.unwrap_or_else(|| self.chat_config.default_persona.clone());

        let history = store.history().await;
        let outcome = self.answer(store, &message, &persona, &history).await?;

        store.push_message(Message::user(&message)).await;
        store
            .push_message(Message::assistant(&outcome.response_text, outcome.sources.clone()))
            .await;
        Ok(outcome)
    }

    /// Re-answer the most recent user message, replacing any assistant
    /// turns that followed it.
    ///
    /// Re-enters the pipeline at retrieval with the stored message; the
    /// completion itself is never retried automatically.
    pub async fn regenerate(
        &self,
        store: &SessionStore,
        persona: Option<String>,
    ) -> Result<ChatOutcome> {
        let message = store.prepare_regenerate().await?;
        let persona = persona.unwrap_or_else(|| self.chat_config.default_persona.clone());

        // The stored user turn becomes the prompt's question; replay only
        // what came before it.
        let mut history = store.history().await;
        history.pop();

        let outcome = self.answer(store, &message, &persona, &history).await?;
        store
            .push_message(Message::assistant(&outcome.response_text, outcome.sources.clone()))
            .await;
        Ok(outcome)
    }

    /// Run retrieval, the web decision, assembly, and generation for one
    /// message. Does not touch the session history.
    async fn answer(
        &self,
        store: &SessionStore,
        message: &str,
        persona: &str,
        history: &[Message],
    ) -> Result<ChatOutcome> {
        debug!(phase = "retrieving", "query started");

        // Embedding happens before any index access; neither call holds
        // the other's lock.
        let active = store.active_ids().await;
        let vector_hits = if active.is_empty() {
            Vec::new()
        } else {
            let query_vector = self.embedder.embed(message).await.map_err(|e| {
                error!(error = %e, "query embedding failed");
                ChatError::RetrievalFailed(format!("query embedding failed: {e}"))
            })?;
            let scored = self
                .index
                .search(&query_vector, self.rag_config.top_k, &active)
                .await
                .map_err(|e| {
                    error!(error = %e, "vector search failed");
                    ChatError::RetrievalFailed(format!("vector search failed: {e}"))
                })?;
            self.resolve_hits(store, scored).await?
        };

        let top_score = vector_hits.first().map(|h| h.score);
        let needs_web = top_score.is_none_or(|s| s < self.rag_config.relevance_threshold)
            || self.chat_config.has_temporal_cue(message);
        debug!(phase = "needs_web_decision", needs_web, top_score = ?top_score, "web decision");

        let web_hits: Vec<WebHit> = if needs_web {
            self.web.search(message, self.rag_config.web_max_results).await
        } else {
            Vec::new()
        };

        let documents = store.documents().await;
        let assembled = self.assembler.assemble(&vector_hits, &web_hits, &documents);
        let grounded = !assembled.is_empty();

        debug!(phase = "generating", grounded, "calling completion model");
        let mut messages: Vec<Message> = history
            .iter()
            .rev()
            .take(self.chat_config.history_limit)
            .rev()
            .cloned()
            .collect();
        messages.push(Message::user(prompt::user_prompt(&assembled.text, message)));

        let request = CompletionRequest {
            system: prompt::system_prompt(persona, grounded),
            messages,
            temperature: Some(self.chat_config.temperature),
            max_tokens: Some(self.chat_config.max_tokens),
        };
        let response_text = self.llm.complete(request).await.map_err(|e| {
            error!(error = %e, "completion failed");
            ChatError::GenerationFailed(e.to_string())
        })?;

        info!(
            phase = "completed",
            sources = assembled.sources.len(),
            grounded,
            used_web = needs_web,
            "query answered"
        );
        Ok(ChatOutcome { response_text, sources: assembled.sources, grounded, used_web: needs_web })
    }

    /// Join index hits with their stored texts.
    async fn resolve_hits(
        &self,
        store: &SessionStore,
        scored: Vec<ScoredChunk>,
    ) -> Result<Vec<VectorHit>> {
        let refs: Vec<ChunkRef> = scored.iter().map(|s| s.chunk).collect();
        let texts = store.chunk_texts(&refs).await;

        let mut hits = Vec::with_capacity(scored.len());
        for (hit, text) in scored.into_iter().zip(texts) {
            let Some(text) = text else {
                error!(chunk = %hit.chunk, "indexed chunk has no stored text");
                return Err(ChatError::Inconsistent {
                    document_id: hit.chunk.document_id,
                    details: format!("chunk {} is indexed but has no stored text", hit.chunk),
                });
            };
            hits.push(VectorHit { chunk: hit.chunk, score: hit.score, text });
        }
        Ok(hits)
    }

    // ── document management ────────────────────────────────────────

    /// Delete a document: index entries first, then registry and chunk
    /// texts. Returns the number of documents remaining in the session.
    ///
    /// # Errors
    ///
    /// [`ChatError::DocumentNotFound`] for an unknown id.
    /// [`ChatError::Inconsistent`] when the removed counts disagree with
    /// the registered `chunk_count`; the mismatch is reported, never
    /// papered over, and the index itself remains queryable.
    pub async fn delete_document(&self, store: &SessionStore, id: DocumentId) -> Result<usize> {
        let meta = store.document(id).await?;

        let removed_vectors = self
            .index
            .remove_by_document(id)
            .await
            .map_err(|e| ChatError::IndexingFailed(e.to_string()))?;
        let (_, removed_texts) = store.remove_document(id).await?;
        let remaining = store.document_count().await;

        if removed_vectors != meta.chunk_count || removed_texts != meta.chunk_count {
            error!(
                document.id = %id,
                expected = meta.chunk_count,
                removed_vectors,
                removed_texts,
                "chunk bookkeeping mismatch on delete"
            );
            return Err(ChatError::Inconsistent {
                document_id: id,
                details: format!(
                    "expected {} chunks, removed {removed_vectors} vectors and {removed_texts} texts",
                    meta.chunk_count
                ),
            });
        }

        info!(document.id = %id, remaining, "document deleted");
        Ok(remaining)
    }

    /// Toggle whether a document participates in retrieval.
    ///
    /// Returns the new state. Index entries stay put; only the query-time
    /// filter changes, so re-enabling restores prior rankings exactly.
    pub async fn toggle_document(&self, store: &SessionStore, id: DocumentId) -> Result<bool> {
        let is_active = store.toggle_active(id).await?;
        info!(document.id = %id, is_active, "document toggled");
        Ok(is_active)
    }

    /// Aggregate counters for the session.
    pub async fn session_stats(&self, store: &SessionStore) -> SessionStats {
        store.stats().await
    }
}

/// Builder for constructing a [`ChatOrchestrator`].
///
/// The embedding provider, vector index, and completion model are
/// required; configs default and the web client defaults to DuckDuckGo.
#[derive(Default)]
pub struct ChatOrchestratorBuilder {
    chat_config: Option<ChatConfig>,
    rag_config: Option<RagConfig>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    index: Option<Arc<dyn VectorIndex>>,
    web: Option<Arc<WebSearchClient>>,
    llm: Option<Arc<dyn Llm>>,
}

impl ChatOrchestratorBuilder {
    /// Set the orchestrator configuration.
    pub fn chat_config(mut self, config: ChatConfig) -> Self {
        self.chat_config = Some(config);
        self
    }

    /// Set the retrieval configuration.
    pub fn rag_config(mut self, config: RagConfig) -> Self {
        self.rag_config = Some(config);
        self
    }

    /// Set the embedding provider (used for both ingestion and queries).
    pub fn embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the vector index.
    pub fn index(mut self, index: Arc<dyn VectorIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Set the web search client.
    pub fn web(mut self, web: Arc<WebSearchClient>) -> Self {
        self.web = Some(web);
        self
    }

    /// Set the completion model.
    pub fn llm(mut self, llm: Arc<dyn Llm>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// Build the [`ChatOrchestrator`], validating required fields and the
    /// retrieval configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Config`] if a required collaborator is
    /// missing or the chunking parameters are invalid.
    pub fn build(self) -> Result<ChatOrchestrator> {
        let embedder =
            self.embedder.ok_or_else(|| ChatError::Config("embedder is required".into()))?;
        let index = self.index.ok_or_else(|| ChatError::Config("index is required".into()))?;
        let llm = self.llm.ok_or_else(|| ChatError::Config("llm is required".into()))?;

        let chat_config = self.chat_config.unwrap_or_default();
        let rag_config = self.rag_config.unwrap_or_default();
        let web = self.web.unwrap_or_else(|| {
            Arc::new(WebSearchClient::with_timeout(Duration::from_secs(
                rag_config.web_timeout_secs,
            )))
        });

        let chunker = WordChunker::new(rag_config.chunk_max_words, rag_config.chunk_overlap_words)
            .map_err(|e| ChatError::Config(e.to_string()))?;
        let assembler = ContextAssembler::from_config(&rag_config);

        Ok(ChatOrchestrator {
            chat_config,
            rag_config,
            chunker,
            assembler,
            embedder,
            index,
            web,
            llm,
        })
    }
}
