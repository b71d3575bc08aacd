use axum::{
    Json,
    extract::{Multipart, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{error, info, instrument, warn};
use tokio::task::JoinError;
use uuid::Uuid;

use sdgverify::pipeline::PipelineError;
use sdgverify::scoring::{ImageBytes, ScoringError};

use crate::gateway::error::GatewayError;
use crate::gateway::state::HandlerState;
use crate::gateway::upload::read_submission;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Two-stage verification of one uploaded photo.
#[instrument(
    skip(state, multipart),
    fields(request_id = tracing::field::Empty, digest = tracing::field::Empty)
)]
pub async fn analyze_image_handler(
    State(state): State<HandlerState>,
    multipart: Multipart,
) -> Result<Response, GatewayError> {
    let request_id = start_request();
    let service = state.service()?;

    let form = read_submission(multipart, service.upload_policy()).await?;
    let (file, options) = form.into_analyze_parts(service.default_min_sdg_score())?;
    let image = accept_image(&file.filename, &file.bytes);

    let result = tokio::task::spawn_blocking(move || {
        let pipeline = service.validation().ok_or_else(|| wrong_mode("candidate-label"))?;
        pipeline.analyze(&image, &options)
    })
    .await
    .map_err(|e| task_failure(request_id, "analysis", e))?
    .map_err(|e| pipeline_failure(request_id, e))?;

    info!(
        valid = result.valid,
        sdg_label = result.sdg_label.as_deref(),
        "Analysis complete"
    );
    Ok(make_response(request_id, &result))
}

/// Single-stage fixed-class verdict for one uploaded photo.
#[instrument(
    skip(state, multipart),
    fields(request_id = tracing::field::Empty, digest = tracing::field::Empty)
)]
pub async fn predict_handler(
    State(state): State<HandlerState>,
    multipart: Multipart,
) -> Result<Response, GatewayError> {
    let request_id = start_request();
    let service = state.service()?;

    let file = read_submission(multipart, service.upload_policy())
        .await?
        .into_file()?;
    let image = accept_image(&file.filename, &file.bytes);

    let result = tokio::task::spawn_blocking(move || {
        let pipeline = service.classification().ok_or_else(|| wrong_mode("fixed-class"))?;
        pipeline.predict(&image)
    })
    .await
    .map_err(|e| task_failure(request_id, "prediction", e))?
    .map_err(|e| pipeline_failure(request_id, e))?;

    info!(
        verdict = %result.verdict,
        is_verified = result.is_verified,
        "Prediction complete"
    );
    Ok(make_response(request_id, &result))
}

fn wrong_mode(expected: &str) -> PipelineError {
    PipelineError::Scoring(ScoringError::ServiceUnavailable {
        reason: format!("service is not running the {expected} pipeline"),
    })
}

fn start_request() -> Uuid {
    let request_id = Uuid::new_v4();
    tracing::Span::current().record("request_id", tracing::field::display(&request_id));
    request_id
}

/// Records a short content digest for correlation. The bytes themselves are
/// never logged.
fn accept_image(filename: &str, bytes: &[u8]) -> ImageBytes {
    let digest = short_digest(bytes);
    tracing::Span::current().record("digest", tracing::field::display(&digest));
    info!(filename, size = bytes.len(), "Image received");
    ImageBytes::from(bytes)
}

pub fn short_digest(bytes: &[u8]) -> String {
    let hash = blake3::hash(bytes);
    hash.to_hex().as_str()[..16].to_string()
}

fn pipeline_failure(request_id: Uuid, err: PipelineError) -> GatewayError {
    let gateway_err = GatewayError::from(err);
    match &gateway_err {
        GatewayError::Processing(detail) => {
            error!(%request_id, error = %detail, "Image processing failed");
        }
        GatewayError::ServiceUnavailable => {
            error!(%request_id, "Scorer unavailable");
        }
        other => warn!(%request_id, error = %other, "Request rejected"),
    }
    gateway_err
}

/// A panicked or cancelled inference task.
pub(crate) fn task_failure(request_id: Uuid, task: &str, err: JoinError) -> GatewayError {
    error!(%request_id, task, error = %err, panicked = err.is_panic(), "Inference task failed");
    GatewayError::Internal(format!("{task} task failed: {err}"))
}

fn make_response<T: Serialize>(request_id: Uuid, body: &T) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        REQUEST_ID_HEADER,
        HeaderValue::from_str(&request_id.to_string())
            .unwrap_or(HeaderValue::from_static("unknown")),
    );
    (StatusCode::OK, headers, Json(body)).into_response()
}
