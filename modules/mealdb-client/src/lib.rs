pub mod error;
pub mod types;

pub use error::{MealDbError, Result};
pub use types::{Meal, INGREDIENT_SLOTS};

use std::time::Duration;

use serde::de::DeserializeOwned;
use types::{CategoryName, MealsEnvelope};

pub const DEFAULT_BASE_URL: &str = "https://www.themealdb.com/api/json/v1/1";

/// Read-only client for the free TheMealDB JSON API.
#[derive(Clone)]
pub struct MealDbClient {
    client: reqwest::Client,
    base_url: String,
}

impl MealDbClient {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| MealDbError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Free-text search by meal name (`search.php?s=`). Returns full records.
    pub async fn search(&self, term: &str) -> Result<Vec<Meal>> {
        self.get_meals("search.php", "s", term).await
    }

    /// Meals from a cuisine/area (`filter.php?a=`). Returns summary records.
    pub async fn filter_by_area(&self, area: &str) -> Result<Vec<Meal>> {
        self.get_meals("filter.php", "a", area).await
    }

    /// Meals containing a main ingredient (`filter.php?i=`). Returns summary records.
    pub async fn filter_by_ingredient(&self, ingredient: &str) -> Result<Vec<Meal>> {
        self.get_meals("filter.php", "i", ingredient).await
    }

    /// Meals in a category (`filter.php?c=`). Returns summary records.
    pub async fn filter_by_category(&self, category: &str) -> Result<Vec<Meal>> {
        self.get_meals("filter.php", "c", category).await
    }

    /// Full record by id (`lookup.php?i=`). `None` when the id is unknown.
    pub async fn lookup(&self, id: &str) -> Result<Option<Meal>> {
        let meals: Vec<Meal> = self.get_meals("lookup.php", "i", id).await?;
        Ok(meals.into_iter().next())
    }

    /// All category names (`list.php?c=list`).
    pub async fn list_categories(&self) -> Result<Vec<String>> {
        let categories: Vec<CategoryName> = self.get_meals("list.php", "c", "list").await?;
        Ok(categories.into_iter().map(|c| c.name).collect())
    }

    async fn get_meals<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        key: &str,
        value: &str,
    ) -> Result<Vec<T>> {
        let url = format!("{}/{}", self.base_url, endpoint);
        tracing::debug!(endpoint, key, value, "TheMealDB request");

        let resp = self
            .client
            .get(&url)
            .query(&[(key, value)])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(MealDbError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp.text().await?;
        let envelope: MealsEnvelope<T> = serde_json::from_str(&body)?;
        tracing::debug!(endpoint, count = envelope.meals.len(), "TheMealDB response");
        Ok(envelope.meals)
    }
}
