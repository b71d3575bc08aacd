use std::sync::Arc;

use tracing::{debug, info};

use super::error::PipelineError;
use super::types::{AnalyzeOptions, ExecutionMode, ValidationResult};
use crate::scoring::{
    ActivityResult, ActivityScorer, AuthenticityResult, AuthenticityScorer, CandidateLabelSet,
    ImageBytes, ScoringError,
};

/// Authenticity veto followed by a threshold-gated activity match.
#[derive(Clone)]
pub struct ValidationPipeline {
    authenticity: Arc<dyn AuthenticityScorer>,
    activity: Arc<dyn ActivityScorer>,
    default_labels: CandidateLabelSet,
    execution: ExecutionMode,
}

impl std::fmt::Debug for ValidationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationPipeline")
            .field("authenticity", &self.authenticity.name())
            .field("activity", &self.activity.name())
            .field("default_labels", &self.default_labels.len())
            .field("execution", &self.execution)
            .finish()
    }
}

impl ValidationPipeline {
    pub fn new(
        authenticity: Arc<dyn AuthenticityScorer>,
        activity: Arc<dyn ActivityScorer>,
    ) -> Self {
        Self {
            authenticity,
            activity,
            default_labels: CandidateLabelSet::default_sdg(),
            execution: ExecutionMode::default(),
        }
    }

    pub fn with_execution(mut self, execution: ExecutionMode) -> Self {
        self.execution = execution;
        self
    }

    pub fn with_default_labels(mut self, labels: CandidateLabelSet) -> Self {
        self.default_labels = labels;
        self
    }

    pub fn default_labels(&self) -> &CandidateLabelSet {
        &self.default_labels
    }

    pub fn execution(&self) -> ExecutionMode {
        self.execution
    }

    pub fn analyze(
        &self,
        image: &ImageBytes,
        options: &AnalyzeOptions,
    ) -> Result<ValidationResult, PipelineError> {
        let threshold = options.min_sdg_score;
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(PipelineError::InvalidThreshold { value: threshold });
        }
        let labels = options.labels.as_ref().unwrap_or(&self.default_labels);

        let (authenticity, activity) = match self.execution {
            ExecutionMode::Sequential => self.run_sequential(image, labels)?,
            ExecutionMode::Speculative => self.run_speculative(image, labels)?,
        };

        let result = match activity {
            None => ValidationResult::rejected_fake(&authenticity),
            Some(activity) => ValidationResult::scored(&authenticity, activity, threshold),
        };

        info!(
            outcome = ?result.outcome(),
            deepfake_confidence = result.deepfake_confidence,
            sdg_label = result.sdg_label.as_deref(),
            sdg_score = result.sdg_score,
            min_sdg_score = threshold,
            "Image analyzed"
        );
        Ok(result)
    }

    fn run_sequential(
        &self,
        image: &ImageBytes,
        labels: &CandidateLabelSet,
    ) -> Result<(AuthenticityResult, Option<ActivityResult>), ScoringError> {
        let authenticity = self.authenticity.score(image)?;
        if authenticity.label.is_fake() {
            debug!(confidence = authenticity.confidence, "Authenticity veto");
            return Ok((authenticity, None));
        }

        let activity = self.activity.score(image, labels)?;
        Ok((authenticity, Some(activity)))
    }

    fn run_speculative(
        &self,
        image: &ImageBytes,
        labels: &CandidateLabelSet,
    ) -> Result<(AuthenticityResult, Option<ActivityResult>), ScoringError> {
        let (authenticity, activity) = std::thread::scope(|scope| {
            let activity = scope.spawn(|| self.activity.score(image, labels));
            let authenticity = self.authenticity.score(image);
            let activity = activity.join().unwrap_or_else(|_| {
                Err(ScoringError::ScoringFailure {
                    reason: "activity scorer panicked".to_string(),
                })
            });
            (authenticity, activity)
        });

        let authenticity = authenticity?;
        if authenticity.label.is_fake() {
            debug!(
                confidence = authenticity.confidence,
                activity_failed = activity.is_err(),
                "Authenticity veto, discarding speculative activity result"
            );
            return Ok((authenticity, None));
        }

        Ok((authenticity, Some(activity?)))
    }
}
