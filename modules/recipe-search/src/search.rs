use std::sync::Arc;

use ai_client::{ChatAgent, OpenAi};
use anyhow::Result;
use mealdb_client::MealDbClient;
use tracing::info;

use recipe_common::{Config, Recipe, SearchOutcome, SearchType};

use crate::cascade::CascadeExecutor;
use crate::intent::IntentResolver;
use crate::traits::RecipeSource;

/// Query interpretation plus cascade execution, and detail lookups by id.
#[derive(Clone)]
pub struct RecipeSearch {
    resolver: IntentResolver,
    executor: CascadeExecutor,
    source: Arc<dyn RecipeSource>,
}

impl RecipeSearch {
    pub fn new(model: Arc<dyn ChatAgent>, source: Arc<dyn RecipeSource>) -> Self {
        Self {
            resolver: IntentResolver::new(model),
            executor: CascadeExecutor::new(source.clone()),
            source,
        }
    }

    /// Wire up the live intent model and TheMealDB from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let model = OpenAi::with_timeout(
            &config.intent_api_key,
            &config.intent_model,
            Some(config.http_timeout),
        )?
        .with_base_url(&config.intent_base_url);
        let source = MealDbClient::new(&config.mealdb_base_url, Some(config.http_timeout))?;
        Ok(Self::new(Arc::new(model), Arc::new(source)))
    }

    /// Interpret `query` and run the cascade. `explicit` overrides the
    /// interpreted search type for the primary attempt.
    pub async fn search(&self, query: &str, explicit: Option<SearchType>) -> Result<SearchOutcome> {
        let intent = self.resolver.resolve(query).await;
        info!(
            search_type = %explicit.unwrap_or(intent.search_type),
            corrected_query = %intent.corrected_query,
            "Searching recipes"
        );
        self.executor.execute(query, intent, explicit).await
    }

    /// Full recipe by id with its flattened ingredient list.
    pub async fn recipe(&self, id: &str) -> Result<Option<Recipe>> {
        Ok(self.source.lookup(id).await?.map(Recipe::from))
    }
}
