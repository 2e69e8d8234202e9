//! OpenAI chat completion client.

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use docq_core::Role;
use tracing::{debug, error};

use crate::error::{ModelError, Result};
use crate::llm::{CompletionRequest, Llm};

/// The default completion model.
const DEFAULT_MODEL: &str = "gpt-4o";

/// An [`Llm`] backed by the OpenAI chat completions API.
///
/// Also works against OpenAI-compatible APIs (Ollama, vLLM, LiteLLM) via
/// [`compatible`](OpenAIChatModel::compatible).
///
/// # Example
///
/// ```rust,ignore
/// use docq_model::OpenAIChatModel;
///
/// let model = OpenAIChatModel::new(std::env::var("OPENAI_API_KEY")?, "gpt-4o-mini");
/// let answer = model.complete(request).await?;
/// ```
pub struct OpenAIChatModel {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAIChatModel {
    /// Create a client for the standard OpenAI API.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key.into());
        Self { client: Client::with_config(config), model: model.into() }
    }

    /// Create a client using `OPENAI_API_KEY` and the default model.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            ModelError::completion("OpenAI", "OPENAI_API_KEY environment variable not set")
        })?;
        Ok(Self::new(api_key, DEFAULT_MODEL))
    }

    /// Create a client for an OpenAI-compatible API.
    pub fn compatible(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let config =
            OpenAIConfig::new().with_api_key(api_key.into()).with_api_base(base_url.into());
        Self { client: Client::with_config(config), model: model.into() }
    }
}

#[async_trait]
impl Llm for OpenAIChatModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let mut messages: Vec<ChatCompletionRequestMessage> =
            Vec::with_capacity(request.messages.len() + 1);

        if !request.system.is_empty() {
            messages.push(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(request.system.as_str())
                    .build()
                    .map_err(|e| ModelError::completion("OpenAI", e.to_string()))?
                    .into(),
            );
        }

        for message in &request.messages {
            let converted = match message.role {
                Role::User => ChatCompletionRequestUserMessageArgs::default()
                    .content(message.content.as_str())
                    .build()
                    .map_err(|e| ModelError::completion("OpenAI", e.to_string()))?
                    .into(),
                Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                    .content(message.content.as_str())
                    .build()
                    .map_err(|e| ModelError::completion("OpenAI", e.to_string()))?
                    .into(),
            };
            messages.push(converted);
        }

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder.model(&self.model).messages(messages);
        if let Some(temperature) = request.temperature {
            builder.temperature(temperature);
        }
        if let Some(max_tokens) = request.max_tokens {
            builder.max_tokens(max_tokens);
        }

        let openai_request = builder
            .build()
            .map_err(|e| ModelError::completion("OpenAI", format!("failed to build request: {e}")))?;

        debug!(model = %self.model, messages = openai_request.messages.len(), "completion request");

        let response = self.client.chat().create(openai_request).await.map_err(|e| {
            error!(model = %self.model, error = %e, "completion request failed");
            ModelError::completion("OpenAI", e.to_string())
        })?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ModelError::completion("OpenAI", "API returned no completion choices"))
    }
}
