use ai_client::{EmbedAgent, OpenAi};
use anyhow::Result;

use recipe_common::Config;

use crate::traits::TextEmbedder;

/// Embeddings through an OpenAI-compatible `/embeddings` endpoint.
pub struct Embedder {
    client: OpenAi,
}

impl Embedder {
    pub fn new(client: OpenAi) -> Self {
        Self { client }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let client = OpenAi::with_timeout(
            &config.embedding_api_key,
            &config.embedding_model,
            Some(config.http_timeout),
        )?
        .with_base_url(&config.embedding_base_url)
        .with_embedding_model(&config.embedding_model);
        Ok(Self::new(client))
    }

    pub fn model(&self) -> &str {
        self.client.embedding_model()
    }
}

#[async_trait::async_trait]
impl TextEmbedder for Embedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.client.embed(text).await?)
    }
}
