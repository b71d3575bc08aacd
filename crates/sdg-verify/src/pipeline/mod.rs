//! Orchestration of the scorers into a final verdict.
//!
//! - [`ValidationPipeline`]: authenticity veto, then zero-shot activity
//!   scoring gated on `min_sdg_score`.
//! - [`ClassificationPipeline`]: one fixed-class model plus a
//!   [`VerdictTable`](crate::verdict::VerdictTable).

/// Fixed-class pipeline.
pub mod classification;
/// Pipeline error types.
pub mod error;
/// Request options and result types.
pub mod types;
/// Two-stage pipeline.
pub mod validation;


pub use classification::{
    ClassificationPipeline, ConfidenceFormat, FixedClassPolicy, PredictionResult,
    SOURCE_AI_GENERATED, SOURCE_REAL, UNKNOWN_PREDICTION,
};
pub use error::PipelineError;
pub use types::{
    AnalyzeOptions, ExecutionMode, MESSAGE_AI_GENERATED, MESSAGE_NO_SDG_ACTIVITY,
    ValidationOutcome, ValidationResult,
};
pub use validation::ValidationPipeline;
