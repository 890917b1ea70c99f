use std::cmp::Ordering;
use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use recipe_common::{EmbeddedRecipe, Recipe};

use crate::corpus::read_corpus;
use crate::traits::TextEmbedder;

/// Cosine similarity over the common prefix of `a` and `b`; 0.0 when either
/// side has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let len = a.len().min(b.len());
    let (a, b) = (&a[..len], &b[..len]);

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Optional pre-filters applied before ranking.
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    pub category: Option<String>,
    pub area: Option<String>,
    /// Matches when any of these is a substring of any recipe tag.
    pub tags: Vec<String>,
}

impl SearchFilters {
    pub fn matches(&self, recipe: &Recipe) -> bool {
        if let Some(ref category) = self.category {
            if &recipe.category != category {
                return false;
            }
        }
        if let Some(ref area) = self.area {
            if &recipe.area != area {
                return false;
            }
        }
        if !self.tags.is_empty() {
            let recipe_tags = recipe.tags.as_deref().unwrap_or_default();
            return self
                .tags
                .iter()
                .any(|wanted| recipe_tags.iter().any(|tag| tag.contains(wanted.as_str())));
        }
        true
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoredRecipe {
    pub recipe: Recipe,
    pub similarity: f32,
}

/// Rank recipes against a query embedding, most similar first. Recipes
/// without an embedding are skipped.
pub fn rank(query: &[f32], corpus: &[EmbeddedRecipe], filters: &SearchFilters) -> Vec<ScoredRecipe> {
    let mut scored: Vec<ScoredRecipe> = corpus
        .iter()
        .filter(|r| filters.matches(&r.recipe))
        .filter_map(|r| {
            let embedding = r.embedding.as_deref()?;
            Some(ScoredRecipe {
                recipe: r.recipe.clone(),
                similarity: cosine_similarity(query, embedding),
            })
        })
        .collect();

    scored.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(Ordering::Equal)
    });
    scored
}

/// In-memory semantic search over a persisted recipe corpus.
pub struct SemanticIndex {
    recipes: Vec<EmbeddedRecipe>,
}

impl SemanticIndex {
    pub fn new(recipes: Vec<EmbeddedRecipe>) -> Self {
        Self { recipes }
    }

    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self::new(read_corpus(path)?))
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Embed `query` and return the `limit` closest recipes.
    pub async fn search(
        &self,
        embedder: &dyn TextEmbedder,
        query: &str,
        filters: &SearchFilters,
        limit: usize,
    ) -> Result<Vec<ScoredRecipe>> {
        let query_embedding = embedder.embed(query).await?;
        let mut ranked = rank(&query_embedding, &self.recipes, filters);
        ranked.truncate(limit);
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recipe_common::Ingredient;

    fn recipe(name: &str, category: &str, area: &str, tags: Option<&[&str]>) -> Recipe {
        Recipe {
            id: name.to_lowercase(),
            name: name.to_string(),
            category: category.to_string(),
            area: area.to_string(),
            instructions: String::new(),
            thumbnail_url: String::new(),
            tags: tags.map(|t| t.iter().map(|s| s.to_string()).collect()),
            video_url: None,
            source_url: None,
            ingredients: vec![Ingredient {
                name: "Salt".into(),
                measure: "pinch".into(),
            }],
        }
    }

    fn embedded(r: Recipe, embedding: Option<Vec<f32>>) -> EmbeddedRecipe {
        EmbeddedRecipe { recipe: r, embedding }
    }

    #[test]
    fn cosine_basics() {
        let a = [1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &[2.0, 0.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&a, &[0.0, 1.0, 0.0]).abs() < 1e-6);
        assert!((cosine_similarity(&a, &[-1.0, 0.0, 0.0]) + 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&a, &[0.0, 0.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&a, &[]), 0.0);
    }

    #[test]
    fn ranks_descending_and_skips_unembedded() {
        let corpus = vec![
            embedded(recipe("Far", "Beef", "British", None), Some(vec![0.0, 1.0])),
            embedded(recipe("Near", "Beef", "British", None), Some(vec![1.0, 0.1])),
            embedded(recipe("Missing", "Beef", "British", None), None),
        ];
        let ranked = rank(&[1.0, 0.0], &corpus, &SearchFilters::default());
        let names: Vec<_> = ranked.iter().map(|r| r.recipe.name.as_str()).collect();
        assert_eq!(names, vec!["Near", "Far"]);
        assert!(ranked[0].similarity > ranked[1].similarity);
    }

    #[test]
    fn filters_by_category_area_and_tag_substring() {
        let corpus = vec![
            embedded(recipe("Pie", "Beef", "British", Some(&["Meat", "Pie"])), Some(vec![1.0])),
            embedded(recipe("Stew", "Beef", "Irish", Some(&["Stew"])), Some(vec![1.0])),
            embedded(recipe("Cake", "Dessert", "British", Some(&["Baking"])), Some(vec![1.0])),
        ];

        let by_category = SearchFilters {
            category: Some("Beef".into()),
            ..Default::default()
        };
        assert_eq!(rank(&[1.0], &corpus, &by_category).len(), 2);

        let by_area = SearchFilters {
            area: Some("British".into()),
            ..Default::default()
        };
        assert_eq!(rank(&[1.0], &corpus, &by_area).len(), 2);

        let by_tag = SearchFilters {
            tags: vec!["Bak".into()],
            ..Default::default()
        };
        let ranked = rank(&[1.0], &corpus, &by_tag);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].recipe.name, "Cake");
    }

    #[test]
    fn untagged_recipes_fail_tag_filter() {
        let filters = SearchFilters {
            tags: vec!["Meat".into()],
            ..Default::default()
        };
        assert!(!filters.matches(&recipe("Plain", "Beef", "British", None)));
    }
}
