//! # docq-chat
//!
//! Chat orchestration for docq. Ties the retrieval pipeline
//! (`docq-rag`), upload intake (`docq-ingest`), and the completion-model
//! seam (`docq-model`) together behind a small set of operations a
//! transport collaborator calls:
//!
//! - [`ChatOrchestrator::upload`] — extract, chunk, embed, index, register
//! - [`ChatOrchestrator::chat`] — retrieve, decide on web search,
//!   assemble context, generate, attach provenance
//! - [`ChatOrchestrator::regenerate`] — re-answer the last user message
//! - [`ChatOrchestrator::delete_document`] / [`ChatOrchestrator::toggle_document`] /
//!   [`ChatOrchestrator::session_stats`]
//!
//! Per-session state lives in an explicit [`SessionStore`] passed into
//! every operation; the orchestrator itself is stateless between calls
//! and serves any number of isolated sessions concurrently.

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod prompt;
pub mod store;

pub use config::ChatConfig;
pub use error::{ChatError, Result};
pub use orchestrator::{
    ChatOrchestrator, ChatOrchestratorBuilder, ChatOutcome, ChatRequest, UploadReceipt,
    UploadRequest,
};
pub use store::{SessionStats, SessionStore};
