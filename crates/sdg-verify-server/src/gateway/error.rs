use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use sdgverify::pipeline::PipelineError;
use sdgverify::scoring::ScoringError;
use sdgverify::upload::UploadRejection;

/// Body of every 500 response. Internal detail stays in the logs.
pub const PROCESSING_ERROR_MESSAGE: &str = "Error processing image";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{0}")]
    Upload(#[from] UploadRejection),

    #[error("request body exceeds limit of {limit} bytes")]
    BodyTooLarge { limit: usize },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid value for {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("unknown label preset: {0}")]
    UnknownPreset(String),

    #[error("uploaded file is not a valid image")]
    InvalidImage,

    #[error("image analysis service not initialized")]
    ServiceUnavailable,

    /// Pipeline failure. The detail is logged, never returned.
    #[error("processing failed: {0}")]
    Processing(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<PipelineError> for GatewayError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::InvalidThreshold { value } => GatewayError::InvalidField {
                field: "min_sdg_score",
                reason: format!("{value} is not within [0, 1]"),
            },
            PipelineError::Scoring(ScoringError::ServiceUnavailable { .. }) => {
                GatewayError::ServiceUnavailable
            }
            PipelineError::Scoring(ScoringError::Decode(_)) => GatewayError::InvalidImage,
            PipelineError::Scoring(ScoringError::InvalidInput { reason }) => {
                GatewayError::InvalidRequest(reason)
            }
            other => GatewayError::Processing(other.to_string()),
        }
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Upload(UploadRejection::PayloadTooLarge { .. })
            | GatewayError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::Upload(_)
            | GatewayError::InvalidRequest(_)
            | GatewayError::InvalidField { .. }
            | GatewayError::UnknownPreset(_)
            | GatewayError::InvalidImage => StatusCode::BAD_REQUEST,
            GatewayError::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::Processing(_) | GatewayError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match &self {
            GatewayError::Processing(_) | GatewayError::Internal(_) => {
                PROCESSING_ERROR_MESSAGE.to_string()
            }
            _ => self.to_string(),
        };

        let body = Json(ErrorResponse {
            error: error_message,
            code: status.as_u16(),
        });

        (status, body).into_response()
    }
}
