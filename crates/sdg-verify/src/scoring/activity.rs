use std::path::Path;

use candle_core::Device;
use tracing::debug;

use super::error::ScoringError;
use super::types::{ActivityResult, CandidateLabelSet, ImageBytes};
use crate::inference::{ClipZeroShot, InferenceError};
use crate::preprocess::{ImagePreprocessor, PreprocessConfig};

/// Zero-shot matcher of an image against caller-supplied activity labels.
pub trait ActivityScorer: Send + Sync {
    fn score(
        &self,
        image: &ImageBytes,
        labels: &CandidateLabelSet,
    ) -> Result<ActivityResult, ScoringError>;

    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// [`ActivityScorer`] backed by CLIP.
#[derive(Debug)]
pub struct ClipActivityScorer {
    model: ClipZeroShot,
    preprocessor: ImagePreprocessor,
}

impl ClipActivityScorer {
    pub fn load(model_dir: &Path, device: &Device) -> Result<Self, InferenceError> {
        let model = ClipZeroShot::load(model_dir, device)?;
        let preprocessor =
            ImagePreprocessor::new(PreprocessConfig::clip().with_target_size(model.image_size()))
                .map_err(|e| InferenceError::InvalidConfig {
                    reason: e.to_string(),
                })?;

        Ok(Self {
            model,
            preprocessor,
        })
    }
}

impl ActivityScorer for ClipActivityScorer {
    fn score(
        &self,
        image: &ImageBytes,
        labels: &CandidateLabelSet,
    ) -> Result<ActivityResult, ScoringError> {
        let normalized = self.preprocessor.normalize(image.as_bytes())?;
        let logits = self.model.logits_per_image(normalized, labels.labels())?;
        let result = ActivityResult::from_logits(labels, &logits)?;

        debug!(
            label = %result.label,
            score = result.score,
            candidates = labels.len(),
            "Activity scored"
        );
        Ok(result)
    }

    fn name(&self) -> &str {
        "clip-activity"
    }
}
