//! Scripted completion model for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{ModelError, Result};
use crate::llm::{CompletionRequest, Llm};

/// An [`Llm`] that replays queued replies and records every request.
///
/// Replies are returned in FIFO order; once the queue is empty a fixed
/// fallback reply is used. Call [`fail_next`](MockLlm::fail_next) to make
/// the next completion fail, exercising the orchestrator's failure path.
///
/// # Example
///
/// ```rust,ignore
/// use docq_model::{Llm, MockLlm};
///
/// let model = MockLlm::new();
/// model.enqueue_reply("Paris.");
/// let answer = model.complete(request).await?;
/// assert_eq!(answer, "Paris.");
/// assert_eq!(model.requests().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockLlm {
    replies: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<CompletionRequest>>,
    fail_next: Mutex<Option<String>>,
}

impl MockLlm {
    /// Create a mock with no queued replies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for a future `complete` call.
    pub fn enqueue_reply(&self, reply: impl Into<String>) {
        self.replies.lock().unwrap().push_back(reply.into());
    }

    /// Make the next `complete` call fail with the given message.
    pub fn fail_next(&self, message: impl Into<String>) {
        *self.fail_next.lock().unwrap() = Some(message.into());
    }

    /// All requests received so far, in order.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Llm for MockLlm {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request);

        if let Some(message) = self.fail_next.lock().unwrap().take() {
            return Err(ModelError::completion("mock", message));
        }

        Ok(self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| "mock reply".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_queued_replies_in_order() {
        let model = MockLlm::new();
        model.enqueue_reply("first");
        model.enqueue_reply("second");

        let request = CompletionRequest::new("system", Vec::new());
        assert_eq!(model.complete(request.clone()).await.unwrap(), "first");
        assert_eq!(model.complete(request.clone()).await.unwrap(), "second");
        assert_eq!(model.complete(request).await.unwrap(), "mock reply");
    }

    #[tokio::test]
    async fn fail_next_fails_exactly_once() {
        let model = MockLlm::new();
        model.fail_next("boom");

        let request = CompletionRequest::new("system", Vec::new());
        assert!(model.complete(request.clone()).await.is_err());
        assert!(model.complete(request).await.is_ok());
    }

    #[tokio::test]
    async fn records_every_request() {
        let model = MockLlm::new();
        let request = CompletionRequest::new("persona", Vec::new());
        model.complete(request).await.unwrap();

        let seen = model.requests();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].system, "persona");
    }
}
