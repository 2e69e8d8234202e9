//! The completion-model trait.

use async_trait::async_trait;
use docq_core::Message;

use crate::error::Result;

/// One completion request: system instructions plus the conversation so
/// far, ending with the user turn to answer.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// System prompt: persona instructions plus the grounding directive.
    pub system: String,
    /// Conversation history ending with the current user message.
    pub messages: Vec<Message>,
    /// Sampling temperature override.
    pub temperature: Option<f32>,
    /// Output token cap override.
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    /// Build a request with provider-default sampling parameters.
    pub fn new(system: impl Into<String>, messages: Vec<Message>) -> Self {
        Self { system: system.into(), messages, temperature: None, max_tokens: None }
    }
}

/// A chat completion model.
///
/// One call per query: the orchestrator never retries a completion
/// automatically, and streaming is a presentation-layer concern outside
/// this seam.
#[async_trait]
pub trait Llm: Send + Sync {
    /// The model identifier (for logs and provenance).
    fn name(&self) -> &str;

    /// Generate one completion for the request.
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
}
