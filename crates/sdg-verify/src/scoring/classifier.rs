use std::path::Path;

use candle_core::Device;
use tracing::debug;

use super::error::ScoringError;
use super::types::{ClassPrediction, ImageBytes};
use crate::inference::{InferenceError, VitClassifier, softmax};
use crate::preprocess::{ImagePreprocessor, PreprocessConfig};

/// Multi-class classifier over a fixed label space (single-stage mode).
pub trait ClassScorer: Send + Sync {
    fn classify(&self, image: &ImageBytes) -> Result<ClassPrediction, ScoringError>;

    fn labels(&self) -> &[String];
}

/// [`ClassScorer`] backed by a ViT whose class names come from a label file.
#[derive(Debug)]
pub struct VitClassScorer {
    classifier: VitClassifier,
    preprocessor: ImagePreprocessor,
}

impl VitClassScorer {
    pub fn load(
        model_dir: &Path,
        labels: Vec<String>,
        device: &Device,
    ) -> Result<Self, InferenceError> {
        let classifier = VitClassifier::load(model_dir, Some(labels), device)?;
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

impl ClassScorer for VitClassScorer {
    fn classify(&self, image: &ImageBytes) -> Result<ClassPrediction, ScoringError> {
        let normalized = self.preprocessor.normalize(image.as_bytes())?;
        let logits = self.classifier.logits(normalized)?;
        let prediction = ClassPrediction::from_probabilities(&softmax(&logits), self.labels())?;

        debug!(
            label = %prediction.label,
            probability = prediction.probability,
            "Image classified"
        );
        Ok(prediction)
    }

    fn labels(&self) -> &[String] {
        self.classifier.labels()
    }
}
