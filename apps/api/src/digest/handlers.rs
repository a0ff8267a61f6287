use axum::{extract::State, Json};
use serde::Deserialize;

use crate::digest::{collect_recent_articles, ArticleRecord};
use crate::errors::AppError;
use crate::mp_client::MpAuth;
use crate::state::AppState;

/// Request body for `/search`. All fields are required; missing keys
/// deserialize to empty values and are rejected below with a 400.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub cookie: String,
    #[serde(default)]
    pub accounts: Vec<String>,
}

/// POST /search
pub async fn handle_search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<Vec<ArticleRecord>>, AppError> {
    if req.token.trim().is_empty() || req.cookie.trim().is_empty() || req.accounts.is_empty() {
        return Err(AppError::Validation("缺少必要参数".to_string()));
    }

    let auth = MpAuth {
        token: req.token,
        cookie: req.cookie,
    };

    let records = collect_recent_articles(
        state.source.as_ref(),
        state.fetcher.as_ref(),
        &auth,
        &req.accounts,
    )
    .await;

    Ok(Json(records))
}
