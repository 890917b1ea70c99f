use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use recipe_api::{router, AppState};
use recipe_common::Config;
use recipe_search::RecipeSearch;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("recipe_api=info".parse()?)
                .add_directive("recipe_search=info".parse()?),
        )
        .init();

    let config = Config::api_from_env()?;
    config.log_redacted();

    let state = Arc::new(AppState {
        search: RecipeSearch::from_config(&config)?,
    });
    let app = router(state);

    let addr = format!("{}:{}", config.web_host, config.web_port);
    info!("Recipe API starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
