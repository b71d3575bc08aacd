//! SDG mission photo verification (used by the server and integration tests).
//!
//! # Public API Surface
//!
//! ## Pipelines
//! - [`ValidationPipeline`] - authenticity veto, then zero-shot activity scoring
//! - [`ClassificationPipeline`] - single fixed-class model plus a [`VerdictTable`]
//! - [`VerificationService`], [`ServiceLifecycle`] - loaded models shared across requests
//!
//! ## Scorers
//! - [`AuthenticityScorer`], [`ActivityScorer`], [`ClassScorer`] - trait seams
//! - [`VitAuthenticityScorer`], [`ClipActivityScorer`], [`VitClassScorer`] - candle backends
//!
//! ## Boundary
//! - [`UploadPolicy`], [`UploadRejection`] - checks applied before decoding
//! - [`Config`], [`ConfigError`] - `SDG_*` environment configuration
//!
//! ## Test/Mock Support
//! Mock scorers and image fixtures are available behind
//! `#[cfg(any(test, feature = "mock"))]`.

pub mod config;
pub mod constants;
#[cfg(any(test, feature = "mock"))]
pub mod fixtures;
pub mod inference;
pub mod lifecycle;
pub mod pipeline;
pub mod preprocess;
pub mod scoring;
pub mod service;
pub mod upload;
pub mod verdict;

pub use config::{Config, ConfigError, PipelineMode, VerdictProfile};
pub use constants::{
    DEFAULT_MIN_SDG_SCORE, DEFAULT_SDG_LABELS, LABEL_PRESETS, LARGE_MAX_UPLOAD_BYTES,
    STANDARD_MAX_UPLOAD_BYTES, preset_labels,
};
pub use inference::{DevicePreference, InferenceError, select_device};
pub use lifecycle::{LifecycleError, LifecycleState, ServiceLifecycle};
pub use pipeline::{
    AnalyzeOptions, ClassificationPipeline, ConfidenceFormat, ExecutionMode, FixedClassPolicy,
    PipelineError, PredictionResult, ValidationOutcome, ValidationPipeline, ValidationResult,
};
pub use preprocess::{ImagePreprocessor, NormalizedImage, PreprocessConfig, PreprocessError, ResizeMode};
#[cfg(any(test, feature = "mock"))]
pub use scoring::{MockActivityScorer, MockAuthenticityScorer, MockClassScorer};
pub use scoring::{
    ActivityResult, ActivityScorer, AuthenticityLabel, AuthenticityResult, AuthenticityScorer,
    CandidateLabelSet, ClassPrediction, ClassScorer, ClipActivityScorer, ImageBytes, ScoringError,
    VitAuthenticityScorer, VitClassScorer,
};
pub use service::{ServiceError, ServicePipeline, VerificationService};
pub use upload::{UploadPolicy, UploadRejection};
pub use verdict::{MatchMode, Verdict, VerdictCategory, VerdictRule, VerdictTable};
