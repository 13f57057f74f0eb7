mod agent;
mod config;
mod db;
mod drafts;
mod editor;
mod errors;
mod export;
mod layout;
mod llm_client;
mod models;
mod profiles;
mod render;
mod resume;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::agent::LlmResumeAgent;
use crate::config::Config;
use crate::db::create_pool;
use crate::layout::LayoutConfig;
use crate::llm_client::LlmClient;
use crate::profiles::PgProfileRepository;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration first: missing required env vars abort startup.
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Pagewright API v{}", env!("CARGO_PKG_VERSION"));

    let db = create_pool(&config.database_url, config.db_max_connections).await?;
    let repo = Arc::new(PgProfileRepository::new(db));

    let llm = LlmClient::new(config.anthropic_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);
    let agent = Arc::new(LlmResumeAgent::new(llm));

    let layout = LayoutConfig::for_dpi(config.page_dpi);
    info!(
        dpi = layout.dpi,
        width = layout.page_width_px,
        height = layout.page_height_px,
        content_height = layout.content_height_px(),
        "Page geometry"
    );

    let state = AppState {
        repo,
        agent,
        config: config.clone(),
        layout,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
