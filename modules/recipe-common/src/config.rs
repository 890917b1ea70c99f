use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::info;

use crate::error::RecipeError;

pub const DEFAULT_INTENT_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_INTENT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";
pub const DEFAULT_EMBEDDING_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MEALDB_BASE_URL: &str = mealdb_client::DEFAULT_BASE_URL;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Intent model (OpenAI-compatible chat endpoint)
    pub intent_api_key: String,
    pub intent_model: String,
    pub intent_base_url: String,

    // Embeddings
    pub embedding_api_key: String,
    pub embedding_model: String,
    pub embedding_base_url: String,

    // Recipe source
    pub mealdb_base_url: String,
    pub http_timeout: Duration,

    // Web server
    pub web_host: String,
    pub web_port: u16,
}

impl Config {
    /// Config for the search API. Requires `GROQ_API_KEY`; embeddings are unused.
    pub fn api_from_env() -> Result<Self, RecipeError> {
        Self::from_lookup(|key| env::var(key).ok(), Profile::Api)
    }

    /// Config for the offline corpus job. Requires `OPENAI_API_KEY`.
    pub fn corpus_from_env() -> Result<Self, RecipeError> {
        Self::from_lookup(|key| env::var(key).ok(), Profile::Corpus)
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        profile: Profile,
    ) -> Result<Self, RecipeError> {
        let vars = Vars(&lookup);

        let intent_api_key = match profile {
            Profile::Api => vars.required("GROQ_API_KEY")?,
            Profile::Corpus => vars.or("GROQ_API_KEY", ""),
        };
        let embedding_api_key = match profile {
            Profile::Api => vars.or("OPENAI_API_KEY", ""),
            Profile::Corpus => vars.required("OPENAI_API_KEY")?,
        };

        Ok(Self {
            intent_api_key,
            intent_model: vars.or("INTENT_MODEL", DEFAULT_INTENT_MODEL),
            intent_base_url: vars.or("INTENT_BASE_URL", DEFAULT_INTENT_BASE_URL),
            embedding_api_key,
            embedding_model: vars.or("EMBEDDING_MODEL", DEFAULT_EMBEDDING_MODEL),
            embedding_base_url: vars.or("EMBEDDING_BASE_URL", DEFAULT_EMBEDDING_BASE_URL),
            mealdb_base_url: vars.or("MEALDB_BASE_URL", DEFAULT_MEALDB_BASE_URL),
            http_timeout: Duration::from_secs(vars.parsed("HTTP_TIMEOUT_SECS", 30u64)?),
            web_host: vars.or("WEB_HOST", "0.0.0.0"),
            web_port: vars.parsed("WEB_PORT", 3000u16)?,
        })
    }

    /// Log the effective configuration with secrets masked.
    pub fn log_redacted(&self) {
        info!(
            intent_model = %self.intent_model,
            intent_base_url = %self.intent_base_url,
            intent_api_key = redact(&self.intent_api_key),
            embedding_model = %self.embedding_model,
            embedding_base_url = %self.embedding_base_url,
            embedding_api_key = redact(&self.embedding_api_key),
            mealdb_base_url = %self.mealdb_base_url,
            http_timeout_secs = self.http_timeout.as_secs(),
            web_host = %self.web_host,
            web_port = self.web_port,
            "Configuration loaded"
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Profile {
    Api,
    Corpus,
}

struct Vars<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Vars<'_, F> {
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, key: &str) -> Result<String, RecipeError> {
        self.get(key)
            .ok_or_else(|| RecipeError::Config(format!("{key} environment variable is required")))
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn parsed<T: FromStr>(&self, key: &str, default: T) -> Result<T, RecipeError> {
        match self.get(key) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| RecipeError::Config(format!("{key} must be a number, got {raw:?}"))),
            None => Ok(default),
        }
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}
