use std::sync::Arc;

use crate::config::Config;
use crate::digest::content::ContentFetcher;
use crate::llm_client::DeepSeekClient;
use crate::mp_client::ArticleSource;
use crate::settings::KeyStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Platform search/listing calls. Trait object so tests substitute stubs.
    pub source: Arc<dyn ArticleSource>,
    /// Article body fetch. Trait object for the same reason.
    pub fetcher: Arc<dyn ContentFetcher>,
    pub llm: DeepSeekClient,
    pub store: KeyStore,
    pub config: Config,
}
