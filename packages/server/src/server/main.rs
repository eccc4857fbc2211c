// Main entry point for the title doctor API server

use anyhow::{Context, Result};
use title_doctor::kernel::ServerDeps;
use title_doctor::server::{build_app, AppState};
use title_doctor::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,title_doctor=debug,seesaw=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Youtube Title Doctor API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Wire collaborators and the job pipeline
    let deps = ServerDeps::from_config(&config).context("Failed to create dependencies")?;
    let state = AppState::new(deps).context("Failed to build job pipeline")?;
    tracing::info!(topics = ?state.engine.bus().topics(), "Job pipeline ready");

    let app = build_app(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
