use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use mealdb_client::MealDbClient;
use recipe_common::Config;
use recipe_search::corpus::write_corpus;
use recipe_search::{CorpusBuilder, CorpusOptions, Embedder, SearchFilters, SemanticIndex};

#[derive(Parser)]
#[command(name = "recipe-corpus", about = "Build and query the embedded recipe corpus")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch every recipe, embed it, and write the corpus JSON.
    Build {
        #[arg(long, default_value = "data/recipes.json")]
        output: PathBuf,
        /// Milliseconds to wait between pages.
        #[arg(long, default_value_t = 1000)]
        page_delay_ms: u64,
        #[arg(long, default_value_t = 8)]
        embed_concurrency: usize,
    },
    /// Rank corpus recipes by similarity to a query.
    Query {
        query: String,
        #[arg(long, default_value = "data/recipes.json")]
        corpus: PathBuf,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        area: Option<String>,
        /// Repeatable; matches recipes with a tag containing any value.
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("recipe_search=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::corpus_from_env()?;
    config.log_redacted();

    let embedder = Arc::new(Embedder::from_config(&config)?);

    match cli.command {
        Command::Build {
            output,
            page_delay_ms,
            embed_concurrency,
        } => {
            let source = MealDbClient::new(&config.mealdb_base_url, Some(config.http_timeout))?;
            let options = CorpusOptions {
                page_delay: Duration::from_millis(page_delay_ms),
                embed_concurrency,
            };

            info!(model = embedder.model(), "Building recipe corpus");
            let corpus = CorpusBuilder::new(Arc::new(source), embedder, options)
                .build()
                .await;

            write_corpus(&output, &corpus)
                .with_context(|| format!("failed to save corpus to {}", output.display()))?;
            info!(path = %output.display(), count = corpus.len(), "Recipe corpus saved");
        }
        Command::Query {
            query,
            corpus,
            limit,
            category,
            area,
            tags,
        } => {
            let index = SemanticIndex::load(&corpus)?;
            info!(recipes = index.len(), "Loaded recipe corpus");

            let filters = SearchFilters {
                category,
                area,
                tags,
            };
            let results = index
                .search(embedder.as_ref(), &query, &filters, limit)
                .await?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
    }

    Ok(())
}
