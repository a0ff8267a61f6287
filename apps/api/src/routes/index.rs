use axum::response::Html;

/// GET /
/// Serves the embedded single-page UI shell.
pub async fn index_handler() -> Html<&'static str> {
    Html(include_str!("../../static/index.html"))
}
