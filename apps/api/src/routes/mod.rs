pub mod health;
pub mod index;

use axum::{
    routing::{get, post},
    Router,
};

use crate::digest::handlers as digest_handlers;
use crate::recommend::handlers as recommend_handlers;
use crate::settings::handlers as settings_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index::index_handler))
        .route("/health", get(health::health_handler))
        .route("/search", post(digest_handlers::handle_search))
        .route(
            "/api/config/deepseek",
            get(settings_handlers::handle_get_deepseek_config)
                .post(settings_handlers::handle_set_deepseek_config),
        )
        .route("/recommend", post(recommend_handlers::handle_recommend))
        .with_state(state)
}
