//! HTTP interface - multipart upload in, repair/replace diagnosis out

pub mod error;
pub mod routes;
pub mod schemas;

pub use error::ApiError;
pub use schemas::{AnalyzeResult, ErrorResponse, HealthResponse};

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use fixbrain_app::{Config, DiagnosisAgent};
use fixbrain_types::Result;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<DiagnosisAgent>,
}

impl AppState {
    pub fn new(agent: DiagnosisAgent) -> Self {
        Self {
            agent: Arc::new(agent),
        }
    }
}

/// Build the router with a request body limit of `max_upload_bytes`
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/tasks/:task_id", get(routes::get_task))
        .route("/tasks/:task_id/analyze", post(routes::analyze))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until the process is stopped
pub async fn serve(config: &Config) -> Result<()> {
    let state = AppState::new(DiagnosisAgent::from_config(config)?);
    let app = router(state, config.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(
        addr = %config.bind_addr,
        data_dir = %config.data_dir.display(),
        model = %config.model,
        "fixbrain listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
