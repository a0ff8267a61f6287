use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::settings::DEEPSEEK_API_KEY;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SetApiKeyRequest {
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Serialize)]
pub struct ApiKeyStatus {
    pub configured: bool,
}

/// GET /api/config/deepseek
/// Reports whether a key is configured without revealing it.
pub async fn handle_get_deepseek_config(
    State(state): State<AppState>,
) -> Result<Json<ApiKeyStatus>, AppError> {
    let key = state.store.get(DEEPSEEK_API_KEY)?;
    Ok(Json(ApiKeyStatus {
        configured: key.map(|k| !k.trim().is_empty()).unwrap_or(false),
    }))
}

/// POST /api/config/deepseek
/// Stores the key; blank or whitespace-only values are rejected.
pub async fn handle_set_deepseek_config(
    State(state): State<AppState>,
    Json(req): Json<SetApiKeyRequest>,
) -> Result<Json<Value>, AppError> {
    let api_key = req.api_key.trim();
    if api_key.is_empty() {
        return Err(AppError::Validation("API key is required".to_string()));
    }

    state.store.set(DEEPSEEK_API_KEY, api_key)?;
    Ok(Json(json!({ "success": true })))
}
