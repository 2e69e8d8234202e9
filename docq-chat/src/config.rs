//! Configuration for chat orchestration.

use serde::{Deserialize, Serialize};

/// Default persona used when the caller supplies none.
const DEFAULT_PERSONA: &str = "You are a helpful AI assistant.";

/// Tunable parameters for the orchestrator.
///
/// The temporal cue list drives the needs-web heuristic together with
/// the relevance threshold in
/// [`RagConfig`](docq_rag::RagConfig); both are product tuning, so they
/// live in configuration rather than code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatConfig {
    /// Persona instructions used when a request carries none.
    pub default_persona: String,
    /// Lowercase substrings that mark a query as time-sensitive and force
    /// a web search regardless of document relevance.
    pub temporal_cues: Vec<String>,
    /// Sampling temperature for the completion call.
    pub temperature: f32,
    /// Output token cap for the completion call.
    pub max_tokens: u32,
    /// Maximum number of prior messages replayed into the prompt.
    pub history_limit: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            default_persona: DEFAULT_PERSONA.to_string(),
            temporal_cues: [
                "today", "tonight", "yesterday", "latest", "current", "currently", "recent",
                "recently", "news", "this week", "this month", "this year", "right now",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            temperature: 0.7,
            max_tokens: 1000,
            history_limit: 50,
        }
    }
}

impl ChatConfig {
    /// Whether the message contains any configured temporal cue.
    ///
    /// Matching is a case-insensitive substring check, so the decision is
    /// deterministic for a given message and cue list.
    pub fn has_temporal_cue(&self, message: &str) -> bool {
        let lowered = message.to_lowercase();
        self.temporal_cues.iter().any(|cue| lowered.contains(cue.as_str()))
    }
}
