//! Image preprocessing: raw upload bytes to a fixed-size, normalised RGB tensor.
//!
//! Each scorer owns an [`ImagePreprocessor`] configured for its model, so the
//! [`NormalizedImage`] it produces never leaves that scoring stage.

pub mod error;


pub use error::PreprocessError;

use candle_core::{Device, Tensor};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, RgbImage};
use tracing::debug;

use crate::constants::DEFAULT_IMAGE_SIZE;

/// Per-channel statistics used by ViT-style classifiers.
pub const VIT_MEAN: [f32; 3] = [0.5, 0.5, 0.5];
pub const VIT_STD: [f32; 3] = [0.5, 0.5, 0.5];

/// OpenAI CLIP image statistics.
pub const CLIP_MEAN: [f32; 3] = [0.481_454_66, 0.457_827_5, 0.408_210_73];
pub const CLIP_STD: [f32; 3] = [0.268_629_54, 0.261_302_58, 0.275_777_11];

/// How an arbitrary input is brought to the square target size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizeMode {
    /// Resize both axes independently (aspect ratio is not kept).
    #[default]
    Stretch,
    /// Fit inside the square and pad the remainder with black.
    Letterbox,
    /// Fill the square and crop the overflow around the centre.
    CenterCrop,
}

#[derive(Debug, Clone, PartialEq)]
/// Configuration for [`ImagePreprocessor`].
pub struct PreprocessConfig {
    /// Output edge length in pixels.
    pub target_size: u32,
    /// Per-channel mean subtracted after scaling to `[0, 1]`.
    pub mean: [f32; 3],
    /// Per-channel divisor applied after mean subtraction.
    pub std: [f32; 3],
    pub resize: ResizeMode,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self::vit()
    }
}

impl PreprocessConfig {
    /// ViT classifier input: stretched 224x224, mean/std 0.5.
    pub fn vit() -> Self {
        Self {
            target_size: DEFAULT_IMAGE_SIZE,
            mean: VIT_MEAN,
            std: VIT_STD,
            resize: ResizeMode::Stretch,
        }
    }

    /// CLIP input: centre-cropped 224x224 with CLIP statistics.
    pub fn clip() -> Self {
        Self {
            target_size: DEFAULT_IMAGE_SIZE,
            mean: CLIP_MEAN,
            std: CLIP_STD,
            resize: ResizeMode::CenterCrop,
        }
    }

    pub fn with_resize(mut self, resize: ResizeMode) -> Self {
        self.resize = resize;
        self
    }

    pub fn with_target_size(mut self, target_size: u32) -> Self {
        self.target_size = target_size;
        self
    }

    pub fn validate(&self) -> Result<(), PreprocessError> {
        if self.target_size == 0 {
            return Err(PreprocessError::InvalidConfig {
                reason: "target_size must be greater than zero".to_string(),
            });
        }
        if self.std.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(PreprocessError::InvalidConfig {
                reason: format!("std must be positive, got {:?}", self.std),
            });
        }
        if self.mean.iter().any(|m| !m.is_finite()) {
            return Err(PreprocessError::InvalidConfig {
                reason: format!("mean must be finite, got {:?}", self.mean),
            });
        }
        Ok(())
    }
}

/// Channel-first (`CHW`) normalised pixels of a square RGB image.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedImage {
    data: Vec<f32>,
    size: u32,
}

impl NormalizedImage {
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Raw `CHW` values, `3 * size * size` long.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Value of channel `c` at `(x, y)`.
    pub fn pixel(&self, c: usize, x: u32, y: u32) -> f32 {
        let plane = (self.size * self.size) as usize;
        self.data[c * plane + (y * self.size + x) as usize]
    }

    /// Consumes the image into a `(1, 3, size, size)` tensor.
    pub fn into_tensor(self, device: &Device) -> Result<Tensor, PreprocessError> {
        let size = self.size as usize;
        Ok(Tensor::from_vec(self.data, (1, 3, size, size), device)?)
    }
}

/// Decodes and normalises images for a single model.
#[derive(Debug, Clone)]
pub struct ImagePreprocessor {
    config: PreprocessConfig,
}

impl ImagePreprocessor {
    pub fn new(config: PreprocessConfig) -> Result<Self, PreprocessError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PreprocessConfig {
        &self.config
    }

    /// Decodes PNG/JPEG/WEBP (or any other compiled-in format) from memory.
    pub fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, PreprocessError> {
        if bytes.is_empty() {
            return Err(PreprocessError::EmptyInput);
        }

        let format = image::guess_format(bytes).map_err(|_| PreprocessError::UnknownFormat)?;
        let img = image::load_from_memory_with_format(bytes, format)?;

        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(PreprocessError::InvalidDimensions { width, height });
        }

        debug!(?format, width, height, "Decoded image");
        Ok(img)
    }

    /// Decodes, converts to RGB, resizes and normalises.
    pub fn normalize(&self, bytes: &[u8]) -> Result<NormalizedImage, PreprocessError> {
        let img = self.decode(bytes)?;
        Ok(self.normalize_decoded(&img))
    }

    pub fn normalize_decoded(&self, img: &DynamicImage) -> NormalizedImage {
        let size = self.config.target_size;
        let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
        let resized = self.resize(&rgb);

        let plane = (size * size) as usize;
        let mut data = vec![0f32; 3 * plane];
        for (x, y, pixel) in resized.enumerate_pixels() {
            let idx = (y * size + x) as usize;
            for c in 0..3 {
                let scaled = pixel[c] as f32 / 255.0;
                data[c * plane + idx] = (scaled - self.config.mean[c]) / self.config.std[c];
            }
        }

        NormalizedImage { data, size }
    }

    fn resize(&self, img: &DynamicImage) -> RgbImage {
        let size = self.config.target_size;
        match self.config.resize {
            ResizeMode::Stretch => img.resize_exact(size, size, FilterType::Triangle).to_rgb8(),
            ResizeMode::CenterCrop => img.resize_to_fill(size, size, FilterType::Triangle).to_rgb8(),
            ResizeMode::Letterbox => {
                let fitted = img.resize(size, size, FilterType::Triangle).to_rgb8();
                let mut canvas = RgbImage::new(size, size);
                let x = (size - fitted.width()) / 2;
                let y = (size - fitted.height()) / 2;
                imageops::overlay(&mut canvas, &fitted, x as i64, y as i64);
                canvas
            }
        }
    }
}
