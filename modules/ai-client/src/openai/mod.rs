mod client;
pub(crate) mod types;

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{AiError, Result};
use crate::traits::{ChatAgent, CompletionOptions, EmbedAgent, Message};

use client::{OpenAiClient, OPENAI_API_URL};
use types::{ChatRequest, WireMessage};

// =============================================================================
// OpenAi Agent
// =============================================================================

/// Client for OpenAI and OpenAI-compatible providers (Groq, Voyage, ...).
#[derive(Clone)]
pub struct OpenAi {
    model: String,
    embedding_model: String,
    base_url: String,
    client: OpenAiClient,
}

impl OpenAi {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        Self::with_timeout(api_key, model, None)
    }

    pub fn with_timeout(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(AiError::Config("API key is empty".to_string()));
        }
        Ok(Self {
            model: model.into(),
            embedding_model: "text-embedding-3-small".to_string(),
            base_url: OPENAI_API_URL.to_string(),
            client: OpenAiClient::new(&api_key, timeout)?,
        })
    }

    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.client = self.client.with_base_url(&url);
        self.base_url = url;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

// =============================================================================
// ChatAgent Implementation
// =============================================================================

#[async_trait]
impl ChatAgent for OpenAi {
    async fn complete(&self, messages: Vec<Message>, options: CompletionOptions) -> Result<String> {
        let mut request =
            ChatRequest::new(&self.model).messages(messages.into_iter().map(WireMessage::from));

        if let Some(temperature) = options.temperature {
            request = request.temperature(temperature);
        }
        if let Some(cap) = options.max_tokens {
            request = request.token_cap(cap);
        }
        if options.json_object {
            request = request.json_object();
        }

        let response = self.client.chat(&request).await?;
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AiError::EmptyResponse("no choices in completion".to_string()))?;

        if let Some(ref reason) = choice.finish_reason {
            debug!(finish_reason = %reason, "chat completion finished");
        }

        choice
            .message
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| AiError::EmptyResponse("completion had no content".to_string()))
    }
}

// =============================================================================
// EmbedAgent Implementation
// =============================================================================

#[async_trait]
impl EmbedAgent for OpenAi {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.client.embed(&self.embedding_model, text).await
    }
}
