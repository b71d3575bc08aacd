//! HTTP gateway (Axum) for photo verification.
//!
//! This module is primarily used by the `sdg-verify` server binary.

pub mod error;
pub mod handler;
pub mod payload;
pub mod state;
pub mod upload;

#[cfg(test)]
mod handler_tests;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use handler::{analyze_image_handler, predict_handler};
pub use state::HandlerState;

use sdgverify::config::PipelineMode;

/// Headroom above the upload cap for multipart framing and text fields, so
/// oversized files are reported by the upload policy.
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Mounts `/health` plus the submission route of the configured mode.
pub fn create_router_with_state(state: HandlerState) -> Router {
    let body_limit = state
        .upload_policy
        .max_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    let router = Router::new().route("/health", get(health_handler));
    let router = match state.mode {
        PipelineMode::CandidateLabels => {
            router.route("/analyze-image", post(analyze_image_handler))
        }
        PipelineMode::FixedClass => router.route("/predict", post(predict_handler)),
    };

    router
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service_ready: bool,
}

#[tracing::instrument(skip(state))]
pub async fn health_handler(State(state): State<HandlerState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service_ready: state.lifecycle.is_ready(),
    })
}
