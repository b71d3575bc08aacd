use serde::Serialize;

use crate::constants::DEFAULT_MIN_SDG_SCORE;
use crate::scoring::{ActivityResult, AuthenticityResult, CandidateLabelSet};

pub const MESSAGE_AI_GENERATED: &str = "Image is AI generated";
pub const MESSAGE_NO_SDG_ACTIVITY: &str = "No significant SDG activity detected";

/// How the two scorers are scheduled within one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// Authenticity first; the activity scorer only runs on Real images.
    #[default]
    Sequential,
    /// Both scorers run concurrently. The activity result is dropped when
    /// authenticity comes back Fake.
    Speculative,
}

impl ExecutionMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sequential" => Some(Self::Sequential),
            "speculative" => Some(Self::Speculative),
            _ => None,
        }
    }
}

/// Per-request knobs of [`ValidationPipeline::analyze`](super::ValidationPipeline::analyze).
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzeOptions {
    /// Candidate activities. `None` uses the pipeline's default set.
    pub labels: Option<CandidateLabelSet>,
    /// Inclusive acceptance threshold on the activity score.
    pub min_sdg_score: f32,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            labels: None,
            min_sdg_score: DEFAULT_MIN_SDG_SCORE,
        }
    }
}

impl AnalyzeOptions {
    pub fn with_labels(mut self, labels: CandidateLabelSet) -> Self {
        self.labels = Some(labels);
        self
    }

    pub fn with_min_sdg_score(mut self, min_sdg_score: f32) -> Self {
        self.min_sdg_score = min_sdg_score;
        self
    }
}

/// Terminal state reached by the two-stage pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationOutcome {
    RejectedFake,
    Accepted,
    RejectedLowScore,
}

/// Response of the two-stage pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub message: String,
    pub deepfake_confidence: f32,
    pub sdg_label: Option<String>,
    pub sdg_score: Option<f32>,
    #[serde(skip)]
    outcome: ValidationOutcome,
}

impl ValidationResult {
    pub fn rejected_fake(authenticity: &AuthenticityResult) -> Self {
        Self {
            valid: false,
            message: MESSAGE_AI_GENERATED.to_string(),
            deepfake_confidence: authenticity.confidence,
            sdg_label: None,
            sdg_score: None,
            outcome: ValidationOutcome::RejectedFake,
        }
    }

    /// Applies the inclusive threshold. Label and score are reported either way.
    pub fn scored(
        authenticity: &AuthenticityResult,
        activity: ActivityResult,
        min_sdg_score: f32,
    ) -> Self {
        let (valid, message, outcome) = if activity.score >= min_sdg_score {
            (
                true,
                format!("Valid SDG activity detected: {}", activity.label),
                ValidationOutcome::Accepted,
            )
        } else {
            (
                false,
                MESSAGE_NO_SDG_ACTIVITY.to_string(),
                ValidationOutcome::RejectedLowScore,
            )
        };

        Self {
            valid,
            message,
            deepfake_confidence: authenticity.confidence,
            sdg_label: Some(activity.label),
            sdg_score: Some(activity.score),
            outcome,
        }
    }

    pub fn outcome(&self) -> ValidationOutcome {
        self.outcome
    }
}
