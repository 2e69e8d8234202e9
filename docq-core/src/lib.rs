//! # docq-core
//!
//! Shared vocabulary for the docq document-chat engine: identifiers,
//! document metadata, chat messages, provenance sources, and the error
//! taxonomy every other docq crate converts into.
//!
//! This crate does no I/O. It exists so that the ingestion, retrieval,
//! model, and orchestration crates agree on one set of types without
//! depending on each other.

pub mod document;
pub mod error;
pub mod message;
pub mod source;

pub use document::{ChunkRef, DocumentId, DocumentMeta, SessionId};
pub use error::{DocqError, Result};
pub use message::{Message, Role};
pub use source::Source;
