use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use assessment_api::analysis::LlmAnalyzer;
use assessment_api::capture::FileStimulus;
use assessment_api::config::Config;
use assessment_api::llm_client::{self, LlmClient};
use assessment_api::reports::ReportRequester;
use assessment_api::routes::build_router;
use assessment_api::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Assessment API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = LlmClient::with_endpoint(
        config.anthropic_api_key.clone(),
        config.llm_api_url.clone(),
    )?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let requester = ReportRequester::new(Arc::new(LlmAnalyzer::new(llm)));

    let capture = Arc::new(FileStimulus::new(config.ppdt_image_path.clone()));
    info!("PPDT stimulus: {}", config.ppdt_image_path.display());

    let state = AppState { requester, capture };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
