use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use super::error::PipelineError;
use crate::constants::{LEGACY_CLASS_CONFIDENCE_PERCENT, STANDARD_CLASS_CONFIDENCE_PERCENT};
use crate::scoring::{AuthenticityScorer, ClassScorer, ImageBytes};
use crate::verdict::{Verdict, VerdictTable};

/// Prediction text reported when the classifier is below its gate.
pub const UNKNOWN_PREDICTION: &str = "UNKNOWN";

pub const SOURCE_REAL: &str = "REAL";
pub const SOURCE_AI_GENERATED: &str = "AI_GENERATED";

/// Precision of the reported confidence percentage. The f32 probability is
/// widened to f64 before scaling and then truncated, never rounded. The gate
/// compares the truncated value, so `0.59999996` is `59%` and stays below a
/// 60% gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceFormat {
    /// `"87%"`
    IntegerPercent,
    /// `"87.45%"`
    TwoDecimalPercent,
}

impl ConfidenceFormat {
    /// Truncated percentage of a probability in `[0, 1]`.
    pub fn truncate(&self, probability: f32) -> f64 {
        let percent = f64::from(probability.clamp(0.0, 1.0)) * 100.0;
        match self {
            ConfidenceFormat::IntegerPercent => percent.trunc(),
            ConfidenceFormat::TwoDecimalPercent => (percent * 100.0).trunc() / 100.0,
        }
    }

    pub fn render(&self, probability: f32) -> String {
        let value = self.truncate(probability);
        match self {
            ConfidenceFormat::IntegerPercent => format!("{}%", value as u32),
            ConfidenceFormat::TwoDecimalPercent => format!("{:.2}%", value),
        }
    }
}

/// Gate, verdict table and presentation of the single-stage pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedClassPolicy {
    pub table: VerdictTable,
    /// Inclusive confidence gate in percent.
    pub min_confidence_percent: f32,
    pub confidence_format: ConfidenceFormat,
    /// Report the predicted class name uppercased.
    pub uppercase_prediction: bool,
}

impl FixedClassPolicy {
    /// 40% gate, case-sensitive class names, two-decimal percentages.
    pub fn standard() -> Self {
        Self {
            table: VerdictTable::standard(),
            min_confidence_percent: f32::from(STANDARD_CLASS_CONFIDENCE_PERCENT),
            confidence_format: ConfidenceFormat::TwoDecimalPercent,
            uppercase_prediction: false,
        }
    }

    /// 60% gate, lowercase matching, integer percentages.
    pub fn legacy() -> Self {
        Self {
            table: VerdictTable::legacy(),
            min_confidence_percent: f32::from(LEGACY_CLASS_CONFIDENCE_PERCENT),
            confidence_format: ConfidenceFormat::IntegerPercent,
            uppercase_prediction: true,
        }
    }

    pub fn with_min_confidence_percent(mut self, percent: u8) -> Self {
        self.min_confidence_percent = f32::from(percent.min(100));
        self
    }
}

impl Default for FixedClassPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

/// Response of the single-stage pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub prediction: String,
    pub confidence: String,
    pub verdict: String,
    pub message: String,
    pub is_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sdg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_check: Option<String>,
}

impl PredictionResult {
    fn from_verdict(
        prediction: String,
        confidence: String,
        verdict: &Verdict,
        source_check: Option<&str>,
    ) -> Self {
        Self {
            prediction,
            confidence,
            verdict: verdict.verdict.clone(),
            message: verdict.message.clone(),
            is_verified: verdict.is_verified(),
            sdg: verdict.sdg.clone(),
            source_check: source_check.map(str::to_string),
        }
    }
}

/// Single multi-class model mapped to a verdict through a [`VerdictTable`].
#[derive(Clone)]
pub struct ClassificationPipeline {
    classifier: Arc<dyn ClassScorer>,
    policy: FixedClassPolicy,
    source_check: Option<Arc<dyn AuthenticityScorer>>,
}

impl std::fmt::Debug for ClassificationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassificationPipeline")
            .field("labels", &self.classifier.labels())
            .field("policy", &self.policy)
            .field("source_check", &self.source_check.as_ref().map(|s| s.name()))
            .finish()
    }
}

impl ClassificationPipeline {
    pub fn new(classifier: Arc<dyn ClassScorer>, policy: FixedClassPolicy) -> Self {
        Self {
            classifier,
            policy,
            source_check: None,
        }
    }

    /// Runs `scorer` before classification; a Fake result rejects outright.
    pub fn with_source_check(mut self, scorer: Arc<dyn AuthenticityScorer>) -> Self {
        self.source_check = Some(scorer);
        self
    }

    pub fn policy(&self) -> &FixedClassPolicy {
        &self.policy
    }

    pub fn predict(&self, image: &ImageBytes) -> Result<PredictionResult, PipelineError> {
        let format = self.policy.confidence_format;

        let source_check = match &self.source_check {
            None => None,
            Some(scorer) => {
                let authenticity = scorer.score(image)?;
                if authenticity.label.is_fake() {
                    debug!(confidence = authenticity.confidence, "Source check rejected image");
                    return Ok(PredictionResult::from_verdict(
                        UNKNOWN_PREDICTION.to_string(),
                        format.render(authenticity.confidence),
                        &Verdict::ai_generated(),
                        Some(SOURCE_AI_GENERATED),
                    ));
                }
                Some(SOURCE_REAL)
            }
        };

        let class = self.classifier.classify(image)?;
        let percent = format.truncate(class.probability);
        let confidence = format.render(class.probability);

        let result = if percent < f64::from(self.policy.min_confidence_percent) {
            PredictionResult::from_verdict(
                UNKNOWN_PREDICTION.to_string(),
                confidence,
                &Verdict::uncertain(),
                source_check,
            )
        } else {
            let prediction = if self.policy.uppercase_prediction {
                class.label.to_uppercase()
            } else {
                class.label.clone()
            };
            PredictionResult::from_verdict(
                prediction,
                confidence,
                self.policy.table.evaluate(&class.label),
                source_check,
            )
        };

        info!(
            class = %class.label,
            confidence = %result.confidence,
            verdict = %result.verdict,
            is_verified = result.is_verified,
            "Image classified"
        );
        Ok(result)
    }
}
