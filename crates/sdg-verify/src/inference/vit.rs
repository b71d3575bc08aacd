//! ViT image classifier loaded from a Hugging Face style directory
//! (`config.json` + `model.safetensors`).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use candle_transformers::models::vit;
use serde::Deserialize;
use tracing::info;

use super::error::InferenceError;
use super::labels::labels_from_id2label;
use crate::constants::DEFAULT_IMAGE_SIZE;
use crate::preprocess::NormalizedImage;

/// Fields of `config.json` that candle's ViT config does not carry.
#[derive(Debug, Default, Deserialize)]
struct ClassifierMeta {
    #[serde(default)]
    id2label: BTreeMap<String, String>,
    #[serde(default)]
    image_size: Option<u32>,
}

pub struct VitClassifier {
    model: vit::Model,
    labels: Vec<String>,
    image_size: u32,
    device: Device,
    model_dir: PathBuf,
}

impl std::fmt::Debug for VitClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VitClassifier")
            .field("model_dir", &self.model_dir)
            .field("labels", &self.labels)
            .field("image_size", &self.image_size)
            .field("device", &format!("{:?}", self.device))
            .finish()
    }
}

impl VitClassifier {
    /// Loads a classifier. `labels` overrides the `id2label` map of `config.json`.
    pub fn load(
        model_dir: &Path,
        labels: Option<Vec<String>>,
        device: &Device,
    ) -> Result<Self, InferenceError> {
        if !model_dir.is_dir() {
            return Err(InferenceError::ModelNotFound {
                path: model_dir.to_path_buf(),
            });
        }

        let config_path = model_dir.join("config.json");
        let weights_path = model_dir.join("model.safetensors");
        for required in [&config_path, &weights_path] {
            if !required.exists() {
                return Err(InferenceError::ModelLoadFailed {
                    reason: format!("missing {}", required.display()),
                });
            }
        }

        let raw = std::fs::read_to_string(&config_path)?;
        let config: vit::Config =
            serde_json::from_str(&raw).map_err(|e| InferenceError::InvalidConfig {
                reason: format!("failed to parse {}: {}", config_path.display(), e),
            })?;
        let meta: ClassifierMeta = serde_json::from_str(&raw).unwrap_or_default();

        let labels = labels.unwrap_or_else(|| labels_from_id2label(&meta.id2label));
        if labels.len() < 2 {
            return Err(InferenceError::InvalidConfig {
                reason: format!(
                    "classifier needs at least two labels, found {} in {}",
                    labels.len(),
                    model_dir.display()
                ),
            });
        }

        // SAFETY: weights are memory-mapped read-only and never modified while mapped.
        let vb =
            unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, device) }
                .map_err(|e| InferenceError::ModelLoadFailed {
                    reason: format!("failed to map weights: {}", e),
                })?;
        let model = vit::Model::new(&config, labels.len(), vb).map_err(|e| {
            InferenceError::ModelLoadFailed {
                reason: format!("failed to build ViT model: {}", e),
            }
        })?;

        let image_size = meta.image_size.unwrap_or(DEFAULT_IMAGE_SIZE);

        info!(
            model_dir = %model_dir.display(),
            num_labels = labels.len(),
            image_size,
            "ViT classifier loaded"
        );

        Ok(Self {
            model,
            labels,
            image_size,
            device: device.clone(),
            model_dir: model_dir.to_path_buf(),
        })
    }

    /// Class names in logit order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Square input edge the model was trained on.
    pub fn image_size(&self) -> u32 {
        self.image_size
    }

    /// Raw class logits for one image.
    pub fn logits(&self, image: NormalizedImage) -> Result<Vec<f32>, InferenceError> {
        let input = image
            .into_tensor(&self.device)
            .map_err(|e| InferenceError::InferenceFailed {
                reason: e.to_string(),
            })?;
        let logits = self.model.forward(&input)?;
        let logits = logits.flatten_all()?.to_vec1::<f32>()?;

        if logits.len() != self.labels.len() {
            return Err(InferenceError::InferenceFailed {
                reason: format!(
                    "model produced {} logits for {} labels",
                    logits.len(),
                    self.labels.len()
                ),
            });
        }
        Ok(logits)
    }
}
