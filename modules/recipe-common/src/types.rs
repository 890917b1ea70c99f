use std::fmt;
use std::str::FromStr;

use mealdb_client::Meal;
use serde::{Deserialize, Serialize};

use crate::error::RecipeError;

// --- Search type ---

/// How a query is sent to the recipe source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    /// Free-text search by meal name. The model prompt calls this `all`.
    #[default]
    #[serde(alias = "all")]
    General,
    /// Filter by cuisine/area.
    Culture,
    /// Filter by main ingredient.
    Ingredients,
}

impl SearchType {
    /// Filter endpoints return summary records that need a detail lookup each.
    pub fn returns_summaries(self) -> bool {
        matches!(self, SearchType::Culture | SearchType::Ingredients)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SearchType::General => "general",
            SearchType::Culture => "culture",
            SearchType::Ingredients => "ingredients",
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchType {
    type Err = RecipeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "general" | "all" => Ok(SearchType::General),
            "culture" => Ok(SearchType::Culture),
            "ingredients" => Ok(SearchType::Ingredients),
            other => Err(RecipeError::Validation(format!("unknown search type: {other}"))),
        }
    }
}

// --- Intent ---

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentContext {
    #[serde(default)]
    pub cultural_variations: Vec<String>,
    #[serde(default)]
    pub ingredient_alternatives: Vec<String>,
    #[serde(default)]
    pub meal_types: Vec<String>,
}

/// Structured interpretation of a free-text recipe query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchIntent {
    pub search_type: SearchType,
    pub corrected_query: String,
    /// Ordered, duplicate-free candidate terms; always starts with the corrected query.
    pub search_terms: Vec<String>,
    pub context: IntentContext,
}

impl SearchIntent {
    /// The intent used when the query could not be interpreted: a general
    /// search for the raw query with no alternates.
    pub fn fallback(query: &str) -> Self {
        Self {
            search_type: SearchType::General,
            corrected_query: query.to_string(),
            search_terms: vec![query.to_string()],
            context: IntentContext::default(),
        }
    }
}

// --- Recipe ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub measure: String,
}

/// Normalized recipe projection of a TheMealDB record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub category: String,
    pub area: String,
    pub instructions: String,
    pub thumbnail_url: String,
    pub tags: Option<Vec<String>>,
    pub video_url: Option<String>,
    pub source_url: Option<String>,
    pub ingredients: Vec<Ingredient>,
}

impl Recipe {
    /// Text used to embed a recipe: name, category, area, ingredients, instructions.
    pub fn embedding_text(&self) -> String {
        let ingredients = self
            .ingredients
            .iter()
            .map(|i| format!("{} {}", i.measure, i.name).trim().to_string())
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "{} - {} - {} - {} - {}",
            self.name, self.category, self.area, ingredients, self.instructions
        )
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn split_tags(raw: Option<&str>) -> Option<Vec<String>> {
    let tags: Vec<String> = raw?
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    (!tags.is_empty()).then_some(tags)
}

impl From<Meal> for Recipe {
    fn from(meal: Meal) -> Self {
        let ingredients = meal
            .ingredient_pairs()
            .into_iter()
            .map(|(name, measure)| Ingredient { name, measure })
            .collect();
        let tags = split_tags(meal.tags.as_deref());

        Self {
            id: meal.id,
            name: meal.name.unwrap_or_default(),
            category: meal.category.unwrap_or_default(),
            area: meal.area.unwrap_or_default(),
            instructions: meal.instructions.unwrap_or_default(),
            thumbnail_url: meal.thumbnail.unwrap_or_default(),
            tags,
            video_url: non_blank(meal.youtube),
            source_url: non_blank(meal.source),
            ingredients,
        }
    }
}

// --- Search outcome ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchInfo {
    pub original_query: String,
    pub corrected_query: String,
    pub search_terms: Vec<String>,
    /// The term whose search produced `results`, or the corrected query if none did.
    pub used_term: String,
    pub context: IntentContext,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    pub results: Vec<Recipe>,
    pub search_info: SearchInfo,
}

// --- Embedded corpus ---

/// A recipe as persisted by the corpus job; `embedding` is omitted when the
/// embedding call failed for this recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedRecipe {
    #[serde(flatten)]
    pub recipe: Recipe,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_meal() -> Meal {
        serde_json::from_value(serde_json::json!({
            "idMeal": "52874",
            "strMeal": "Beef and Mustard Pie",
            "strCategory": "Beef",
            "strArea": "British",
            "strInstructions": "Preheat the oven.",
            "strMealThumb": "https://www.themealdb.com/images/media/meals/sytuqu1511553755.jpg",
            "strTags": "Meat, Pie,",
            "strYoutube": "https://www.youtube.com/watch?v=nMyBC9staMU",
            "strSource": "",
            "strIngredient1": "Beef",
            "strMeasure1": "1kg ",
            "strIngredient2": " Plain Flour",
            "strMeasure2": "2 tbs",
            "strIngredient3": " ",
            "strMeasure3": " ",
        }))
        .unwrap()
    }

    #[test]
    fn meal_converts_to_recipe() {
        let recipe = Recipe::from(full_meal());
        assert_eq!(recipe.id, "52874");
        assert_eq!(recipe.area, "British");
        assert_eq!(recipe.tags, Some(vec!["Meat".to_string(), "Pie".to_string()]));
        assert_eq!(recipe.source_url, None);
        assert!(recipe.video_url.is_some());
        assert_eq!(
            recipe.ingredients,
            vec![
                Ingredient { name: "Beef".into(), measure: "1kg".into() },
                Ingredient { name: "Plain Flour".into(), measure: "2 tbs".into() },
            ]
        );
    }

    #[test]
    fn summary_meal_has_empty_fields() {
        let meal: Meal = serde_json::from_str(
            r#"{"strMeal":"Kapsalon","strMealThumb":"https://x/k.jpg","idMeal":"52979"}"#,
        )
        .unwrap();
        let recipe = Recipe::from(meal);
        assert_eq!(recipe.name, "Kapsalon");
        assert_eq!(recipe.category, "");
        assert!(recipe.tags.is_none());
        assert!(recipe.ingredients.is_empty());
    }

    #[test]
    fn recipe_serializes_camel_case() {
        let value = serde_json::to_value(Recipe::from(full_meal())).unwrap();
        assert!(value.get("thumbnailUrl").is_some());
        assert!(value.get("videoUrl").is_some());
        assert!(value["sourceUrl"].is_null());
    }

    #[test]
    fn embedding_text_layout() {
        let text = Recipe::from(full_meal()).embedding_text();
        assert_eq!(
            text,
            "Beef and Mustard Pie - Beef - British - 1kg Beef, 2 tbs Plain Flour - Preheat the oven."
        );
    }

    #[test]
    fn search_type_parsing() {
        assert_eq!("all".parse::<SearchType>().unwrap(), SearchType::General);
        assert_eq!("Culture".parse::<SearchType>().unwrap(), SearchType::Culture);
        assert!("cuisine".parse::<SearchType>().is_err());

        let st: SearchType = serde_json::from_str(r#""all""#).unwrap();
        assert_eq!(st, SearchType::General);
        assert_eq!(serde_json::to_string(&SearchType::Ingredients).unwrap(), r#""ingredients""#);
    }

    #[test]
    fn only_filter_types_return_summaries() {
        assert!(!SearchType::General.returns_summaries());
        assert!(SearchType::Culture.returns_summaries());
        assert!(SearchType::Ingredients.returns_summaries());
    }

    #[test]
    fn fallback_intent_is_general_search_for_raw_query() {
        let intent = SearchIntent::fallback("chiken tika");
        assert_eq!(intent.search_type, SearchType::General);
        assert_eq!(intent.corrected_query, "chiken tika");
        assert_eq!(intent.search_terms, vec!["chiken tika".to_string()]);
        assert_eq!(intent.context, IntentContext::default());
    }

    #[test]
    fn embedded_recipe_omits_missing_embedding() {
        let embedded = EmbeddedRecipe {
            recipe: Recipe::from(full_meal()),
            embedding: None,
        };
        let value = serde_json::to_value(&embedded).unwrap();
        assert!(value.get("embedding").is_none());
        assert_eq!(value["name"], "Beef and Mustard Pie");

        let back: EmbeddedRecipe = serde_json::from_value(value).unwrap();
        assert_eq!(back, embedded);
    }
}
