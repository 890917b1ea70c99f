pub mod cascade;
pub mod corpus;
pub mod embedder;
pub mod intent;
pub mod search;
pub mod similarity;
pub mod terms;
pub mod traits;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use cascade::{Attempt, CascadeExecutor};
pub use corpus::{CorpusBuilder, CorpusOptions};
pub use embedder::Embedder;
pub use intent::{IntentResolver, Resolution};
pub use search::RecipeSearch;
pub use similarity::{cosine_similarity, ScoredRecipe, SearchFilters, SemanticIndex};
pub use traits::{RecipeSource, TextEmbedder};
