use std::path::Path;

use candle_core::Device;
use tracing::debug;

use super::error::ScoringError;
use super::types::{AuthenticityLabel, AuthenticityResult, ImageBytes};
use crate::inference::{InferenceError, VitClassifier, softmax};
use crate::preprocess::{ImagePreprocessor, PreprocessConfig};

/// Binary real/AI-generated classifier.
pub trait AuthenticityScorer: Send + Sync {
    fn score(&self, image: &ImageBytes) -> Result<AuthenticityResult, ScoringError>;

    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// [`AuthenticityScorer`] backed by a two-class ViT.
#[derive(Debug)]
pub struct VitAuthenticityScorer {
    classifier: VitClassifier,
    preprocessor: ImagePreprocessor,
}

impl VitAuthenticityScorer {
    pub fn load(model_dir: &Path, device: &Device) -> Result<Self, InferenceError> {
        let classifier = VitClassifier::load(model_dir, None, device)?;
        let labels = classifier.labels();

        if labels.len() != 2 {
            return Err(InferenceError::InvalidConfig {
                reason: format!(
                    "authenticity model must have exactly two classes, found {:?}",
                    labels
                ),
            });
        }
        // A model whose labels never normalise to Fake would pass every image.
        if !labels
            .iter()
            .any(|l| AuthenticityLabel::from_model_label(l).is_fake())
        {
            return Err(InferenceError::InvalidConfig {
                reason: format!("no authenticity label maps to Fake: {:?}", labels),
            });
        }

        let preprocessor = ImagePreprocessor::new(
            PreprocessConfig::vit().with_target_size(classifier.image_size()),
        )
        .map_err(|e| InferenceError::InvalidConfig {
            reason: e.to_string(),
        })?;

        Ok(Self {
            classifier,
            preprocessor,
        })
    }
}

impl AuthenticityScorer for VitAuthenticityScorer {
    fn score(&self, image: &ImageBytes) -> Result<AuthenticityResult, ScoringError> {
        let normalized = self.preprocessor.normalize(image.as_bytes())?;
        let logits = self.classifier.logits(normalized)?;
        let result = AuthenticityResult::from_probabilities(&softmax(&logits), self.classifier.labels())?;

        debug!(
            label = %result.label,
            confidence = result.confidence,
            "Authenticity scored"
        );
        Ok(result)
    }

    fn name(&self) -> &str {
        "vit-authenticity"
    }
}
