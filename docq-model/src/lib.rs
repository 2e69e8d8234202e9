//! # docq-model
//!
//! The completion-model seam for docq. The orchestrator talks to one
//! trait, [`Llm`], with a single-shot `complete` call; this crate
//! provides:
//!
//! - [`OpenAIChatModel`] — OpenAI and OpenAI-compatible chat APIs
//!   (Ollama, vLLM, etc. via a custom base URL)
//! - [`MockLlm`] — scripted model for tests
//!
//! Generation is one request per query with no automatic retry; a
//! caller-triggered regenerate re-runs retrieval and calls again.

pub mod error;
pub mod llm;
pub mod mock;
pub mod openai;

pub use error::{ModelError, Result};
pub use llm::{CompletionRequest, Llm};
pub use mock::MockLlm;
pub use openai::OpenAIChatModel;
