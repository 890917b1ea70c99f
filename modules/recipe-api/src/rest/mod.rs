use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use tracing::{debug, warn};

use recipe_common::SearchType;

use crate::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    search_type: Option<String>,
}

fn error_response(status: StatusCode, message: &str) -> axum::response::Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

pub async fn api_search(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> impl IntoResponse {
    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => {
            debug!(error = %rejection, "Rejected search body");
            return error_response(StatusCode::BAD_REQUEST, "Search query is required");
        }
    };

    let query = body.query.as_deref().unwrap_or_default();
    if query.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Search query is required");
    }

    let explicit = match body.search_type.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => match raw.parse::<SearchType>() {
            Ok(search_type) => Some(search_type),
            Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
        },
    };

    match state.search.search(query, explicit).await {
        Ok(outcome) => Json(outcome).into_response(),
        Err(e) => {
            warn!(error = %e, query, "Search failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to search recipes. Please try again.",
            )
        }
    }
}

pub async fn api_recipe_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.search.recipe(&id).await {
        Ok(Some(recipe)) => Json(recipe).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "Recipe not found"),
        Err(e) => {
            warn!(error = %e, id = %id, "Recipe lookup failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch recipe")
        }
    }
}
