// Test doubles for the three outside seams:
// - MockRecipeSource (RecipeSource): HashMap-based, records every call
// - MockChatAgent (ai_client::ChatAgent): canned reply or failure
// - FixedEmbedder (TextEmbedder): deterministic hash-based vectors
//
// Plus builders for TheMealDB summary and full records.

use std::collections::{HashMap, HashSet};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;

use ai_client::{AiError, ChatAgent, CompletionOptions, Message};
use anyhow::{bail, Result};
use async_trait::async_trait;

use mealdb_client::Meal;

use crate::traits::{RecipeSource, TextEmbedder};

/// Embedding dimension produced by `FixedEmbedder`.
pub const TEST_EMBEDDING_DIM: usize = 16;

// ---------------------------------------------------------------------------
// Meal builders
// ---------------------------------------------------------------------------

/// A filter-endpoint record: id, name and thumbnail only.
pub fn summary_meal(id: &str, name: &str) -> Meal {
    Meal {
        id: id.to_string(),
        name: Some(name.to_string()),
        thumbnail: Some(format!("https://www.themealdb.com/images/media/meals/{id}.jpg")),
        ..Meal::default()
    }
}

/// A search/lookup record with two ingredients.
pub fn full_meal(id: &str, name: &str, category: &str, area: &str) -> Meal {
    let mut meal = summary_meal(id, name);
    meal.category = Some(category.to_string());
    meal.area = Some(area.to_string());
    meal.instructions = Some(format!("Cook the {name}."));
    meal.tags = Some("Dinner,Test".to_string());
    for (slot, (ingredient, measure)) in [("Salt", "1 tsp"), ("Water", "200ml")].iter().enumerate() {
        meal.extra.insert(format!("strIngredient{}", slot + 1), (*ingredient).into());
        meal.extra.insert(format!("strMeasure{}", slot + 1), (*measure).into());
    }
    meal
}

// ---------------------------------------------------------------------------
// MockRecipeSource
// ---------------------------------------------------------------------------

/// Every request made to a `MockRecipeSource`, in order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceCall {
    Search(String),
    Area(String),
    Ingredient(String),
    Category(String),
    Lookup(String),
    Categories,
}

/// Unregistered queries answer with no meals, like the real API does.
/// Builder pattern: `.on_search()`, `.on_area()`, `.on_ingredient()`,
/// `.on_category()`, `.on_lookup()`, `.with_categories()`, `.failing_on()`.
#[derive(Default)]
pub struct MockRecipeSource {
    searches: HashMap<String, Vec<Meal>>,
    areas: HashMap<String, Vec<Meal>>,
    ingredients: HashMap<String, Vec<Meal>>,
    by_category: HashMap<String, Vec<Meal>>,
    details: HashMap<String, Meal>,
    category_names: Vec<String>,
    failures: HashSet<SourceCall>,
    calls: Mutex<Vec<SourceCall>>,
}

impl MockRecipeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_search(mut self, term: &str, meals: Vec<Meal>) -> Self {
        self.searches.insert(term.to_string(), meals);
        self
    }

    pub fn on_area(mut self, area: &str, meals: Vec<Meal>) -> Self {
        self.areas.insert(area.to_string(), meals);
        self
    }

    pub fn on_ingredient(mut self, ingredient: &str, meals: Vec<Meal>) -> Self {
        self.ingredients.insert(ingredient.to_string(), meals);
        self
    }

    pub fn on_category(mut self, category: &str, meals: Vec<Meal>) -> Self {
        self.by_category.insert(category.to_string(), meals);
        self
    }

    pub fn on_lookup(mut self, meal: Meal) -> Self {
        self.details.insert(meal.id.clone(), meal);
        self
    }

    pub fn with_categories(mut self, names: &[&str]) -> Self {
        self.category_names = names.iter().map(|n| n.to_string()).collect();
        self
    }

    /// Make a specific call fail as if the upstream were down.
    pub fn failing_on(mut self, call: SourceCall) -> Self {
        self.failures.insert(call);
        self
    }

    pub fn calls(&self) -> Vec<SourceCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn lookup_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, SourceCall::Lookup(_)))
            .count()
    }

    fn record(&self, call: SourceCall) -> Result<()> {
        let failing = self.failures.contains(&call);
        self.calls.lock().unwrap().push(call.clone());
        if failing {
            bail!("MockRecipeSource: upstream unavailable for {call:?}");
        }
        Ok(())
    }
}

#[async_trait]
impl RecipeSource for MockRecipeSource {
    async fn search(&self, term: &str) -> Result<Vec<Meal>> {
        self.record(SourceCall::Search(term.to_string()))?;
        Ok(self.searches.get(term).cloned().unwrap_or_default())
    }

    async fn filter_by_area(&self, area: &str) -> Result<Vec<Meal>> {
        self.record(SourceCall::Area(area.to_string()))?;
        Ok(self.areas.get(area).cloned().unwrap_or_default())
    }

    async fn filter_by_ingredient(&self, ingredient: &str) -> Result<Vec<Meal>> {
        self.record(SourceCall::Ingredient(ingredient.to_string()))?;
        Ok(self.ingredients.get(ingredient).cloned().unwrap_or_default())
    }

    async fn filter_by_category(&self, category: &str) -> Result<Vec<Meal>> {
        self.record(SourceCall::Category(category.to_string()))?;
        Ok(self.by_category.get(category).cloned().unwrap_or_default())
    }

    async fn lookup(&self, id: &str) -> Result<Option<Meal>> {
        self.record(SourceCall::Lookup(id.to_string()))?;
        Ok(self.details.get(id).cloned())
    }

    async fn categories(&self) -> Result<Vec<String>> {
        self.record(SourceCall::Categories)?;
        Ok(self.category_names.clone())
    }
}

// ---------------------------------------------------------------------------
// MockChatAgent
// ---------------------------------------------------------------------------

/// Chat model double. Replies with fixed text, or fails like an unreachable
/// provider. Records the options of every call.
pub struct MockChatAgent {
    reply: Option<String>,
    calls: Mutex<Vec<(Vec<Message>, CompletionOptions)>>,
}

impl MockChatAgent {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            reply: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_options(&self) -> Option<CompletionOptions> {
        self.calls.lock().unwrap().last().map(|(_, opts)| *opts)
    }

    pub fn last_user_prompt(&self) -> Option<String> {
        self.calls
            .lock()
            .unwrap()
            .last()
            .and_then(|(messages, _)| messages.last().map(|m| m.content.clone()))
    }
}

#[async_trait]
impl ChatAgent for MockChatAgent {
    async fn complete(
        &self,
        messages: Vec<Message>,
        options: CompletionOptions,
    ) -> ai_client::Result<String> {
        self.calls.lock().unwrap().push((messages, options));
        self.reply
            .clone()
            .ok_or_else(|| AiError::Network("connection refused".to_string()))
    }
}

// ---------------------------------------------------------------------------
// FixedEmbedder
// ---------------------------------------------------------------------------

/// Deterministic embedder: identical text gives identical vectors. Texts
/// containing any `failing_on` marker fail.
#[derive(Default)]
pub struct FixedEmbedder {
    overrides: HashMap<String, Vec<f32>>,
    failing_markers: Vec<String>,
    calls: Mutex<usize>,
}

impl FixedEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_text(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.overrides.insert(text.to_string(), vector);
        self
    }

    pub fn failing_on(mut self, marker: &str) -> Self {
        self.failing_markers.push(marker.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }

    fn hashed_vector(text: &str) -> Vec<f32> {
        (0..TEST_EMBEDDING_DIM)
            .map(|i| {
                let mut hasher = DefaultHasher::new();
                (text, i).hash(&mut hasher);
                (hasher.finish() % 1000) as f32 / 1000.0
            })
            .collect()
    }
}

#[async_trait]
impl TextEmbedder for FixedEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        *self.calls.lock().unwrap() += 1;
        if self.failing_markers.iter().any(|m| text.contains(m.as_str())) {
            bail!("FixedEmbedder: refusing to embed {text:?}");
        }
        Ok(self
            .overrides
            .get(text)
            .cloned()
            .unwrap_or_else(|| Self::hashed_vector(text)))
    }
}
