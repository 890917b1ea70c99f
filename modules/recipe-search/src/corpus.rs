use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use futures::future::try_join_all;
use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use mealdb_client::Meal;
use recipe_common::{EmbeddedRecipe, Recipe};

use crate::traits::{RecipeSource, TextEmbedder};

#[derive(Debug, Clone)]
pub struct CorpusOptions {
    /// Pause between pages to stay under the recipe API's rate limit.
    pub page_delay: Duration,
    /// Embedding requests in flight at once.
    pub embed_concurrency: usize,
}

impl Default for CorpusOptions {
    fn default() -> Self {
        Self {
            page_delay: Duration::from_secs(1),
            embed_concurrency: 8,
        }
    }
}

/// Bulk-fetches every recipe and embeds it for semantic search.
///
/// TheMealDB has no paging, so a page is one category from the category
/// listing. The walk ends at the first empty page.
pub struct CorpusBuilder {
    source: Arc<dyn RecipeSource>,
    embedder: Arc<dyn TextEmbedder>,
    options: CorpusOptions,
}

impl CorpusBuilder {
    pub fn new(
        source: Arc<dyn RecipeSource>,
        embedder: Arc<dyn TextEmbedder>,
        options: CorpusOptions,
    ) -> Self {
        Self {
            source,
            embedder,
            options,
        }
    }

    pub async fn build(&self) -> Vec<EmbeddedRecipe> {
        let recipes = self.fetch_all().await;
        info!(count = recipes.len(), "Fetched recipes");
        let embedded = self.embed_all(recipes).await;
        let with_embedding = embedded.iter().filter(|r| r.embedding.is_some()).count();
        info!(
            count = embedded.len(),
            with_embedding, "Generated embeddings"
        );
        embedded
    }

    /// Walk pages until one comes back empty. A failing page ends the walk
    /// and keeps what was already fetched.
    pub async fn fetch_all(&self) -> Vec<Recipe> {
        let categories = match self.source.categories().await {
            Ok(categories) => categories,
            Err(e) => {
                warn!(error = %e, "Failed to list categories");
                return Vec::new();
            }
        };

        let mut recipes = Vec::new();
        for page in 1.. {
            let meals = match self.fetch_page(&categories, page).await {
                Ok(meals) => meals,
                Err(e) => {
                    warn!(page, error = %e, "Failed to fetch page, stopping");
                    break;
                }
            };
            if meals.is_empty() {
                break;
            }

            info!(page, count = meals.len(), "Fetched page");
            recipes.extend(meals.into_iter().map(Recipe::from));

            if !self.options.page_delay.is_zero() {
                tokio::time::sleep(self.options.page_delay).await;
            }
        }
        recipes
    }

    /// Full records for page `page` (1-based). Past the last category the
    /// page is empty.
    async fn fetch_page(&self, categories: &[String], page: usize) -> Result<Vec<Meal>> {
        let Some(category) = categories.get(page - 1) else {
            return Ok(Vec::new());
        };

        let summaries = self.source.filter_by_category(category).await?;
        let details = try_join_all(summaries.iter().map(|s| self.source.lookup(&s.id))).await?;

        Ok(summaries
            .iter()
            .zip(details)
            .filter_map(|(summary, detail)| {
                if detail.is_none() {
                    warn!(id = %summary.id, category = %category, "No detail record, skipping");
                }
                detail
            })
            .collect())
    }

    /// Embed each recipe's composite text. A failed embedding keeps the
    /// recipe without one. Output order matches input order.
    pub async fn embed_all(&self, recipes: Vec<Recipe>) -> Vec<EmbeddedRecipe> {
        let concurrency = self.options.embed_concurrency.max(1);
        stream::iter(recipes)
            .map(|recipe| {
                let embedder = self.embedder.clone();
                async move {
                    let embedding = match embedder.embed(&recipe.embedding_text()).await {
                        Ok(embedding) => Some(embedding),
                        Err(e) => {
                            warn!(recipe = %recipe.name, error = %e, "Embedding failed");
                            None
                        }
                    };
                    EmbeddedRecipe { recipe, embedding }
                }
            })
            .buffered(concurrency)
            .collect()
            .await
    }
}

/// Write the corpus as a pretty-printed JSON array, creating parent dirs.
pub fn write_corpus(path: &Path, recipes: &[EmbeddedRecipe]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(recipes)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

pub fn read_corpus(path: &Path) -> Result<Vec<EmbeddedRecipe>> {
    let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("parsing {}", path.display()))
}
