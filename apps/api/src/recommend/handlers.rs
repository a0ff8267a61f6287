use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::recommend::recommend_titles;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    #[serde(default)]
    pub titles: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub recommendations: Vec<String>,
}

/// POST /recommend
pub async fn handle_recommend(
    State(state): State<AppState>,
    Json(req): Json<RecommendRequest>,
) -> Result<Json<RecommendResponse>, AppError> {
    if req.titles.is_empty() {
        return Err(AppError::Validation("没有找到文章标题".to_string()));
    }

    let recommendations = recommend_titles(&state, &req.titles).await?;
    Ok(Json(RecommendResponse { recommendations }))
}
