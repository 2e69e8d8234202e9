//! Configuration for the retrieval pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Tunable parameters for chunking, search, and context assembly.
///
/// The relevance threshold and web-result cap are product tuning knobs;
/// they live here rather than in code so callers can calibrate them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Maximum chunk size in words.
    pub chunk_max_words: usize,
    /// Number of words repeated from the tail of one chunk at the head of the next.
    pub chunk_overlap_words: usize,
    /// Number of top results to return from vector search.
    pub top_k: usize,
    /// Cosine score at or above which document evidence is considered relevant.
    pub relevance_threshold: f32,
    /// Maximum number of words of evidence admitted into the prompt.
    pub context_budget_words: usize,
    /// Maximum number of web results requested per query.
    pub web_max_results: usize,
    /// Timeout for web search calls, in seconds. Embedding and
    /// completion timeouts belong to their provider constructors.
    pub web_timeout_secs: u64,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_max_words: 1000,
            chunk_overlap_words: 50,
            top_k: 5,
            relevance_threshold: 0.7,
            context_budget_words: 3000,
            web_max_results: 3,
            web_timeout_secs: 10,
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the maximum chunk size in words.
    pub fn chunk_max_words(mut self, words: usize) -> Self {
        self.config.chunk_max_words = words;
        self
    }

    /// Set the overlap between consecutive chunks in words.
    pub fn chunk_overlap_words(mut self, words: usize) -> Self {
        self.config.chunk_overlap_words = words;
        self
    }

    /// Set the number of top results to return from vector search.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the relevance threshold for document evidence.
    pub fn relevance_threshold(mut self, threshold: f32) -> Self {
        self.config.relevance_threshold = threshold;
        self
    }

    /// Set the context word budget.
    pub fn context_budget_words(mut self, words: usize) -> Self {
        self.config.context_budget_words = words;
        self
    }

    /// Set the maximum number of web results per query.
    pub fn web_max_results(mut self, max: usize) -> Self {
        self.config.web_max_results = max;
        self
    }

    /// Set the timeout for web search calls.
    pub fn web_timeout_secs(mut self, secs: u64) -> Self {
        self.config.web_timeout_secs = secs;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if:
    /// - `chunk_overlap_words >= chunk_max_words`
    /// - `top_k == 0`
    /// - `context_budget_words == 0`
    /// - `relevance_threshold` is outside `[-1.0, 1.0]`
    pub fn build(self) -> Result<RagConfig> {
        if self.config.chunk_overlap_words >= self.config.chunk_max_words {
            return Err(RagError::Config(format!(
                "chunk_overlap_words ({}) must be less than chunk_max_words ({})",
                self.config.chunk_overlap_words, self.config.chunk_max_words
            )));
        }
        if self.config.top_k == 0 {
            return Err(RagError::Config("top_k must be greater than zero".to_string()));
        }
        if self.config.context_budget_words == 0 {
            return Err(RagError::Config(
                "context_budget_words must be greater than zero".to_string(),
            ));
        }
        if !(-1.0..=1.0).contains(&self.config.relevance_threshold) {
            return Err(RagError::Config(format!(
                "relevance_threshold ({}) must be within [-1.0, 1.0]",
                self.config.relevance_threshold
            )));
        }
        Ok(self.config)
    }
}
