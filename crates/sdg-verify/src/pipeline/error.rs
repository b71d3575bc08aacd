use thiserror::Error;

use crate::scoring::ScoringError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("min_sdg_score must be a finite value in [0, 1], got {value}")]
    InvalidThreshold { value: f32 },

    #[error(transparent)]
    Scoring(#[from] ScoringError),
}

impl PipelineError {
    /// True when a model behind the pipeline is not available.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            PipelineError::Scoring(ScoringError::ServiceUnavailable { .. })
        )
    }
}
