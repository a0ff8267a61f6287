mod config;
mod digest;
mod errors;
mod llm_client;
mod mp_client;
mod recommend;
mod routes;
mod settings;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::digest::content::HttpContentFetcher;
use crate::llm_client::DeepSeekClient;
use crate::mp_client::MpClient;
use crate::routes::build_router;
use crate::settings::KeyStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Structured logging: console plus a daily-rolling file mirror.
    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "wxdigest.log");
    let (file_writer, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false),
        )
        .init();

    info!("Starting wxdigest API v{}", env!("CARGO_PKG_VERSION"));

    let state = AppState {
        source: Arc::new(MpClient::new(config.mp_base_url.clone())?),
        fetcher: Arc::new(HttpContentFetcher::new()?),
        llm: DeepSeekClient::new(config.deepseek_base_url.clone()),
        store: KeyStore::new(config.config_file.clone()),
        config: config.clone(),
    };
    info!(
        "Key store at {}, platform base {}",
        state.config.config_file.display(),
        state.config.mp_base_url
    );

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
