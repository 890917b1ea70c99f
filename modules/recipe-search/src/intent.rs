use std::sync::Arc;

use ai_client::{strip_code_blocks, truncate_to_char_boundary, ChatAgent, CompletionOptions, Message};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use recipe_common::{IntentContext, SearchIntent, SearchType};

use crate::terms::merge_ordered;

pub const INTENT_TEMPERATURE: f32 = 0.3;
pub const INTENT_MAX_TOKENS: u32 = 1024;

const SYSTEM_PROMPT: &str = "You are a culinary search assistant with deep knowledge of global cuisines, ingredients, and cooking techniques. You understand common misspellings, regional variations, and culinary terms across different cultures.";

const USER_PROMPT: &str = r#"You are a culinary search assistant that helps understand recipe search queries. Analyze this recipe search query and determine:

1. The intended search type (all, culture, or ingredients)
2. Any misspellings, regional variations, or common terms that should be corrected
3. Related search terms that might help find relevant recipes
4. Cultural context and variations of the search term
5. Common ingredient substitutions or alternatives

Consider:
- Regional variations (e.g., "italiano" → "Italian")
- Common misspellings
- Cultural context (e.g., "chinese food" → "Chinese cuisine")
- Ingredient variations (e.g., "tomato sauce" → "tomato, sauce")
- Meal types and categories
- Dietary preferences and restrictions

Query: "{query}"

Respond in JSON format:
{
  "searchType": "all|culture|ingredients",
  "correctedQuery": "corrected version of the query",
  "searchTerms": ["array", "of", "related", "terms"],
  "context": {
    "culturalVariations": ["array", "of", "cultural", "variations"],
    "ingredientAlternatives": ["array", "of", "alternative", "ingredients"],
    "mealTypes": ["array", "of", "relevant", "meal", "types"]
  }
}"#;

/// Prompt pair sent to the model for one query.
pub fn intent_messages(query: &str) -> Vec<Message> {
    vec![
        Message::system(SYSTEM_PROMPT),
        Message::user(USER_PROMPT.replace("{query}", query)),
    ]
}

pub fn intent_options() -> CompletionOptions {
    CompletionOptions::json()
        .temperature(INTENT_TEMPERATURE)
        .max_tokens(INTENT_MAX_TOKENS)
}

// --- Model answer ---

/// What the model is asked to return. Every field is optional: a partial
/// answer still yields a usable intent. List entries that are not strings
/// are skipped.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntentAnswer {
    #[serde(default)]
    search_type: Option<String>,
    #[serde(default)]
    corrected_query: Option<String>,
    #[serde(default)]
    search_terms: Option<Vec<Value>>,
    #[serde(default)]
    context: Option<ContextAnswer>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContextAnswer {
    #[serde(default)]
    cultural_variations: Option<Vec<Value>>,
    #[serde(default)]
    ingredient_alternatives: Option<Vec<Value>>,
    #[serde(default)]
    meal_types: Option<Vec<Value>>,
}

fn strings(list: Option<Vec<Value>>) -> Vec<String> {
    list.unwrap_or_default()
        .into_iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(s),
            _ => None,
        })
        .collect()
}

/// Turn the model's raw text into an intent for `query`.
pub fn parse_intent(query: &str, raw: &str) -> Result<SearchIntent, serde_json::Error> {
    let answer: IntentAnswer = serde_json::from_str(strip_code_blocks(raw))?;

    let search_type = match answer.search_type.as_deref() {
        Some(raw_type) => raw_type.parse().unwrap_or_else(|_| {
            debug!(search_type = raw_type, "Unrecognized search type, using general");
            SearchType::General
        }),
        None => SearchType::General,
    };

    let corrected_query = answer
        .corrected_query
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .unwrap_or_else(|| query.to_string());

    let ctx = answer.context.unwrap_or_default();
    let context = IntentContext {
        cultural_variations: merge_ordered([strings(ctx.cultural_variations)]),
        ingredient_alternatives: merge_ordered([strings(ctx.ingredient_alternatives)]),
        meal_types: merge_ordered([strings(ctx.meal_types)]),
    };
    let answer_terms = merge_ordered([strings(answer.search_terms)]);

    let search_terms = merge_ordered([
        std::slice::from_ref(&corrected_query),
        answer_terms.as_slice(),
        context.cultural_variations.as_slice(),
        context.ingredient_alternatives.as_slice(),
        context.meal_types.as_slice(),
    ]);

    Ok(SearchIntent {
        search_type,
        corrected_query,
        search_terms,
        context,
    })
}

// --- Resolution ---

/// Outcome of asking the model. `Fallback` carries why interpretation failed;
/// both variants collapse into a usable `SearchIntent`.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Parsed(SearchIntent),
    Fallback { query: String, reason: String },
}

impl Resolution {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Resolution::Fallback { .. })
    }

    pub fn into_intent(self) -> SearchIntent {
        match self {
            Resolution::Parsed(intent) => intent,
            Resolution::Fallback { query, .. } => SearchIntent::fallback(&query),
        }
    }
}

/// Interprets free-text queries with a chat model.
#[derive(Clone)]
pub struct IntentResolver {
    model: Arc<dyn ChatAgent>,
}

impl IntentResolver {
    pub fn new(model: Arc<dyn ChatAgent>) -> Self {
        Self { model }
    }

    /// Ask the model and report whether its answer was usable.
    pub async fn interpret(&self, query: &str) -> Resolution {
        let raw = match self.model.complete(intent_messages(query), intent_options()).await {
            Ok(raw) => raw,
            Err(e) => {
                return Resolution::Fallback {
                    query: query.to_string(),
                    reason: e.to_string(),
                }
            }
        };

        match parse_intent(query, &raw) {
            Ok(intent) => Resolution::Parsed(intent),
            Err(e) => Resolution::Fallback {
                query: query.to_string(),
                reason: format!(
                    "malformed model answer ({e}): {}",
                    truncate_to_char_boundary(&raw, 200)
                ),
            },
        }
    }

    /// Resolve a query to an intent. Never fails: an unusable model answer
    /// degrades to a general search for the raw query.
    pub async fn resolve(&self, query: &str) -> SearchIntent {
        let resolution = self.interpret(query).await;
        match &resolution {
            Resolution::Parsed(intent) => debug!(
                search_type = %intent.search_type,
                corrected_query = %intent.corrected_query,
                terms = intent.search_terms.len(),
                "Resolved search intent"
            ),
            Resolution::Fallback { reason, .. } => {
                warn!(error = %reason, "Intent resolution failed, using default intent")
            }
        }
        resolution.into_intent()
    }
}
