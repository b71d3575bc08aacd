//! CLIP ViT-B/32 zero-shot wrapper: one image against N text prompts.

use std::path::{Path, PathBuf};

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::clip::{ClipConfig, ClipModel};
use tokenizers::Tokenizer;
use tracing::{debug, info};

use super::error::InferenceError;
use super::utils::load_tokenizer;
use crate::preprocess::NormalizedImage;

const PAD_TOKEN: &str = "<|endoftext|>";

pub struct ClipZeroShot {
    model: ClipModel,
    tokenizer: Tokenizer,
    pad_id: u32,
    max_position_embeddings: usize,
    image_size: u32,
    device: Device,
    model_dir: PathBuf,
}

impl std::fmt::Debug for ClipZeroShot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipZeroShot")
            .field("model_dir", &self.model_dir)
            .field("image_size", &self.image_size)
            .field("device", &format!("{:?}", self.device))
            .finish()
    }
}

impl ClipZeroShot {
    /// Loads `model.safetensors` and `tokenizer.json` from `model_dir`.
    pub fn load(model_dir: &Path, device: &Device) -> Result<Self, InferenceError> {
        if !model_dir.is_dir() {
            return Err(InferenceError::ModelNotFound {
                path: model_dir.to_path_buf(),
            });
        }

        let weights_path = model_dir.join("model.safetensors");
        if !weights_path.exists() {
            return Err(InferenceError::ModelLoadFailed {
                reason: format!("missing {}", weights_path.display()),
            });
        }

        let tokenizer =
            load_tokenizer(model_dir).map_err(|e| InferenceError::TokenizationFailed {
                reason: format!("failed to load tokenizer: {}", e),
            })?;
        let pad_id = pad_token_id(&tokenizer)?;

        let config = ClipConfig::vit_base_patch32();
        // SAFETY: weights are memory-mapped read-only and never modified while mapped.
        let vb =
            unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, device) }
                .map_err(|e| InferenceError::ModelLoadFailed {
                    reason: format!("failed to map weights: {}", e),
                })?;
        let model = ClipModel::new(vb, &config).map_err(|e| InferenceError::ModelLoadFailed {
            reason: format!("failed to build CLIP model: {}", e),
        })?;

        info!(model_dir = %model_dir.display(), "CLIP model loaded");

        Ok(Self {
            model,
            tokenizer,
            pad_id,
            max_position_embeddings: config.text_config.max_position_embeddings,
            image_size: config.image_size as u32,
            device: device.clone(),
            model_dir: model_dir.to_path_buf(),
        })
    }

    pub fn image_size(&self) -> u32 {
        self.image_size
    }

    /// Scaled image-text similarity logits, one per prompt, in prompt order.
    pub fn logits_per_image(
        &self,
        image: NormalizedImage,
        prompts: &[String],
    ) -> Result<Vec<f32>, InferenceError> {
        if prompts.is_empty() {
            return Err(InferenceError::InvalidConfig {
                reason: "at least one prompt is required".to_string(),
            });
        }

        let input_ids = self.tokenize(prompts)?;
        let pixel_values = image
            .into_tensor(&self.device)
            .map_err(|e| InferenceError::InferenceFailed {
                reason: e.to_string(),
            })?;

        let (_logits_per_text, logits_per_image) = self.model.forward(&pixel_values, &input_ids)?;
        let logits = logits_per_image.flatten_all()?.to_vec1::<f32>()?;

        debug!(prompts = prompts.len(), "Computed CLIP similarities");
        Ok(logits)
    }

    fn tokenize(&self, prompts: &[String]) -> Result<Tensor, InferenceError> {
        let tokens = encode_prompts(
            &self.tokenizer,
            prompts,
            self.pad_id,
            self.max_position_embeddings,
        )?;
        Ok(Tensor::new(tokens, &self.device)?)
    }
}

fn pad_token_id(tokenizer: &Tokenizer) -> Result<u32, InferenceError> {
    tokenizer
        .token_to_id(PAD_TOKEN)
        .ok_or_else(|| InferenceError::TokenizationFailed {
            reason: format!("tokenizer has no {PAD_TOKEN} token"),
        })
}

/// Token ids per prompt, truncated to `max_len` and right-padded with `pad_id`
/// to the longest prompt.
fn encode_prompts(
    tokenizer: &Tokenizer,
    prompts: &[String],
    pad_id: u32,
    max_len: usize,
) -> Result<Vec<Vec<u32>>, InferenceError> {
    let mut tokens = Vec::with_capacity(prompts.len());
    for prompt in prompts {
        let encoding = tokenizer.encode(prompt.as_str(), true).map_err(|e| {
            InferenceError::TokenizationFailed {
                reason: e.to_string(),
            }
        })?;
        let mut ids = encoding.get_ids().to_vec();
        ids.truncate(max_len);
        tokens.push(ids);
    }

    let longest = tokens.iter().map(Vec::len).max().unwrap_or(0);
    for ids in tokens.iter_mut() {
        ids.resize(longest, pad_id);
    }
    Ok(tokens)
}
