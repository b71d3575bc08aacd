use thiserror::Error;

use crate::config::ConfigError;
use crate::inference::InferenceError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to load models: {0}")]
    Inference(#[from] InferenceError),
}
