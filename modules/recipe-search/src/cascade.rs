use std::sync::Arc;

use anyhow::Result;
use futures::future::try_join_all;
use tracing::{debug, info, warn};

use mealdb_client::Meal;
use recipe_common::{Recipe, SearchInfo, SearchIntent, SearchOutcome, SearchType};

use crate::terms::first_token;
use crate::traits::RecipeSource;

/// One query against the recipe source, in cascade order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt {
    /// The corrected query through the endpoint for the requested type.
    Primary { search_type: SearchType, term: String },
    /// Free-text search for one of the intent's candidate terms.
    AlternateTerm(String),
    /// Free-text search for the first token of the corrected query.
    BroaderToken(String),
}

impl Attempt {
    pub fn term(&self) -> &str {
        match self {
            Attempt::Primary { term, .. } => term,
            Attempt::AlternateTerm(term) | Attempt::BroaderToken(term) => term,
        }
    }

    /// Every fallback is a free-text search, so only the primary attempt can
    /// carry a filter type.
    pub fn search_type(&self) -> SearchType {
        match self {
            Attempt::Primary { search_type, .. } => *search_type,
            _ => SearchType::General,
        }
    }
}

/// The ordered attempts for an intent. Lazy: later attempts are only built
/// if the caller keeps pulling.
pub fn plan(intent: &SearchIntent, explicit: Option<SearchType>) -> impl Iterator<Item = Attempt> + '_ {
    let primary = Attempt::Primary {
        search_type: explicit.unwrap_or(intent.search_type),
        term: intent.corrected_query.clone(),
    };

    std::iter::once(primary)
        .chain(intent.search_terms.iter().cloned().map(Attempt::AlternateTerm))
        .chain(
            first_token(&intent.corrected_query)
                .map(|token| Attempt::BroaderToken(token.to_string())),
        )
}

/// Runs the search cascade against a recipe source.
#[derive(Clone)]
pub struct CascadeExecutor {
    source: Arc<dyn RecipeSource>,
}

impl CascadeExecutor {
    pub fn new(source: Arc<dyn RecipeSource>) -> Self {
        Self { source }
    }

    /// Try each planned attempt in order and return the first non-empty
    /// result set. All-empty is a normal outcome with `used_term` set to the
    /// corrected query. Upstream failures abort the search.
    pub async fn execute(
        &self,
        original_query: &str,
        intent: SearchIntent,
        explicit: Option<SearchType>,
    ) -> Result<SearchOutcome> {
        let mut hit: Option<(Attempt, Vec<Meal>)> = None;

        for attempt in plan(&intent, explicit) {
            let meals = self.run(&attempt).await?;
            debug!(?attempt, count = meals.len(), "Cascade attempt");
            if !meals.is_empty() {
                hit = Some((attempt, meals));
                break;
            }
        }

        let (used_term, results) = match hit {
            Some((attempt, meals)) => {
                let meals = if attempt.search_type().returns_summaries() {
                    self.expand_details(meals).await?
                } else {
                    meals
                };
                info!(
                    used_term = attempt.term(),
                    search_type = %attempt.search_type(),
                    count = meals.len(),
                    "Search matched"
                );
                (
                    attempt.term().to_string(),
                    meals.into_iter().map(Recipe::from).collect(),
                )
            }
            None => {
                info!(corrected_query = %intent.corrected_query, "Search exhausted all fallbacks");
                (intent.corrected_query.clone(), Vec::new())
            }
        };

        Ok(SearchOutcome {
            results,
            search_info: SearchInfo {
                original_query: original_query.to_string(),
                corrected_query: intent.corrected_query,
                search_terms: intent.search_terms,
                used_term,
                context: intent.context,
            },
        })
    }

    async fn run(&self, attempt: &Attempt) -> Result<Vec<Meal>> {
        let term = attempt.term();
        match attempt.search_type() {
            SearchType::Culture => self.source.filter_by_area(term).await,
            SearchType::Ingredients => self.source.filter_by_ingredient(term).await,
            SearchType::General => self.source.search(term).await,
        }
    }

    /// Replace summary records with full records, one concurrent lookup per
    /// id. Order follows the summaries; ids that no longer resolve are dropped.
    async fn expand_details(&self, summaries: Vec<Meal>) -> Result<Vec<Meal>> {
        let lookups = summaries.iter().map(|summary| self.source.lookup(&summary.id));
        let details = try_join_all(lookups).await?;

        Ok(summaries
            .iter()
            .zip(details)
            .filter_map(|(summary, detail)| {
                if detail.is_none() {
                    warn!(id = %summary.id, "Detail lookup returned no record, dropping");
                }
                detail
            })
            .collect())
    }
}
