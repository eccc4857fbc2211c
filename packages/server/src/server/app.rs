//! Application setup and server configuration.

use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::domains::jobs::{build_engine, AppEngine};
use crate::kernel::ServerDeps;
use crate::server::routes::{get_job_handler, health_handler, submit_handler};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: AppEngine,
}

impl AppState {
    /// Wire the job pipeline over `deps`.
    pub fn new(deps: ServerDeps) -> anyhow::Result<Self> {
        Ok(Self {
            engine: build_engine(deps)?,
        })
    }

    /// Use an engine built elsewhere (tests attach their own taps).
    pub fn with_engine(engine: AppEngine) -> Self {
        Self { engine }
    }

    pub fn deps(&self) -> &ServerDeps {
        self.engine.deps()
    }
}

/// Build the Axum application router
pub fn build_app(state: AppState) -> Router {
    // CORS configuration - allow any origin, the API has no credentials
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/submit", post(submit_handler))
        .route("/jobs/:job_id", get(get_job_handler))
        .route("/health", get(health_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(Extension(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
