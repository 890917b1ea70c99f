// Seams to the outside world. The language model is reached through
// `ai_client::ChatAgent`; recipes and embeddings through the traits below.
// MockRecipeSource / MockChatAgent / FixedEmbedder in `testing` stand in for
// them so the resolver, cascade and corpus job run without network.

use anyhow::Result;
use async_trait::async_trait;

use mealdb_client::{Meal, MealDbClient};

// ---------------------------------------------------------------------------
// RecipeSource
// ---------------------------------------------------------------------------

#[async_trait]
pub trait RecipeSource: Send + Sync {
    /// Free-text search by meal name. Returns full records.
    async fn search(&self, term: &str) -> Result<Vec<Meal>>;

    /// Summary records for a cuisine/area.
    async fn filter_by_area(&self, area: &str) -> Result<Vec<Meal>>;

    /// Summary records containing an ingredient.
    async fn filter_by_ingredient(&self, ingredient: &str) -> Result<Vec<Meal>>;

    /// Summary records in a category.
    async fn filter_by_category(&self, category: &str) -> Result<Vec<Meal>>;

    /// Full record by id, `None` when unknown.
    async fn lookup(&self, id: &str) -> Result<Option<Meal>>;

    /// All category names.
    async fn categories(&self) -> Result<Vec<String>>;
}

#[async_trait]
impl RecipeSource for MealDbClient {
    async fn search(&self, term: &str) -> Result<Vec<Meal>> {
        Ok(self.search(term).await?)
    }

    async fn filter_by_area(&self, area: &str) -> Result<Vec<Meal>> {
        Ok(self.filter_by_area(area).await?)
    }

    async fn filter_by_ingredient(&self, ingredient: &str) -> Result<Vec<Meal>> {
        Ok(self.filter_by_ingredient(ingredient).await?)
    }

    async fn filter_by_category(&self, category: &str) -> Result<Vec<Meal>> {
        Ok(self.filter_by_category(category).await?)
    }

    async fn lookup(&self, id: &str) -> Result<Option<Meal>> {
        Ok(self.lookup(id).await?)
    }

    async fn categories(&self) -> Result<Vec<String>> {
        Ok(self.list_categories().await?)
    }
}

// ---------------------------------------------------------------------------
// TextEmbedder
// ---------------------------------------------------------------------------

#[async_trait]
pub trait TextEmbedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}
