//! # docq-rag
//!
//! The retrieval pipeline behind docq's document chat: chunking,
//! embeddings, exact cosine vector search, web augmentation, and context
//! assembly with provenance.
//!
//! ## Overview
//!
//! Ingestion runs text through [`WordChunker`], embeds each chunk with an
//! [`EmbeddingProvider`], and appends the vectors to a [`VectorIndex`].
//! At query time the pipeline embeds the query with the same provider,
//! takes cosine top-k from the index, optionally adds [`WebSearchClient`]
//! snippets, and fuses everything through [`ContextAssembler`] into one
//! budgeted evidence block plus deduplicated [`Source`](docq_core::Source)
//! records.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docq_rag::{
//!     ContextAssembler, InMemoryVectorIndex, OpenAIEmbeddingProvider, RagConfig,
//!     VectorIndex, WordChunker,
//! };
//!
//! let config = RagConfig::default();
//! let embedder = OpenAIEmbeddingProvider::from_env()?;
//! let index = InMemoryVectorIndex::new(embedder.dimensions());
//! let chunker = WordChunker::new(config.chunk_max_words, config.chunk_overlap_words)?;
//! let assembler = ContextAssembler::from_config(&config);
//! ```
//!
//! The orchestration of these pieces into upload and chat operations
//! lives in `docq-chat`.

pub mod chunking;
pub mod config;
pub mod context;
pub mod embedding;
pub mod error;
pub mod index;
pub mod inmemory;
pub mod openai;
pub mod websearch;

pub use chunking::WordChunker;
pub use config::{RagConfig, RagConfigBuilder};
pub use context::{AssembledContext, ContextAssembler, VectorHit};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use index::{IndexEntry, ScoredChunk, VectorIndex};
pub use inmemory::InMemoryVectorIndex;
pub use openai::OpenAIEmbeddingProvider;
pub use websearch::{WebHit, WebSearchClient};
