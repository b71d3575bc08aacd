//! In-memory image fixtures and tiny model directories for tests.

use std::collections::BTreeMap;
use std::io::Cursor;
use std::path::Path;

use candle_core::{DType, Device};
use candle_nn::{Activation, VarBuilder, VarMap};
use candle_transformers::models::vit;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

/// Encodes a single-colour image in the given format.
pub fn solid_image(width: u32, height: u32, rgb: [u8; 3], format: ImageFormat) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(rgb)));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format)
        .expect("encoding an in-memory fixture cannot fail");
    buf.into_inner()
}

pub fn solid_png(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    solid_image(width, height, rgb, ImageFormat::Png)
}

pub fn solid_jpeg(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    solid_image(width, height, rgb, ImageFormat::Jpeg)
}

/// Edge of the images the tiny ViT from [`write_tiny_vit`] expects.
pub const TINY_VIT_IMAGE_SIZE: u32 = 8;

/// Writes a randomly initialised ViT (`config.json` + `model.safetensors`)
/// with a `num_classes` head into `dir`. `id2label` fills the config map and
/// may disagree with `num_classes`.
pub fn write_tiny_vit(dir: &Path, num_classes: usize, id2label: &[&str]) {
    let config = vit::Config {
        hidden_size: 8,
        num_hidden_layers: 1,
        num_attention_heads: 2,
        intermediate_size: 16,
        hidden_act: Activation::Gelu,
        layer_norm_eps: 1e-12,
        image_size: TINY_VIT_IMAGE_SIZE as usize,
        patch_size: 4,
        num_channels: 3,
        qkv_bias: true,
    };

    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
    vit::Model::new(&config, num_classes, vb).expect("tiny ViT builds from a fresh VarMap");
    varmap
        .save(dir.join("model.safetensors"))
        .expect("writing fixture weights");

    let id2label: BTreeMap<String, &str> = id2label
        .iter()
        .enumerate()
        .map(|(idx, label)| (idx.to_string(), *label))
        .collect();
    let json = serde_json::json!({
        "hidden_size": config.hidden_size,
        "num_hidden_layers": config.num_hidden_layers,
        "num_attention_heads": config.num_attention_heads,
        "intermediate_size": config.intermediate_size,
        "hidden_act": "gelu",
        "layer_norm_eps": config.layer_norm_eps,
        "image_size": config.image_size,
        "patch_size": config.patch_size,
        "num_channels": config.num_channels,
        "qkv_bias": config.qkv_bias,
        "id2label": id2label,
    });
    std::fs::write(dir.join("config.json"), json.to_string()).expect("writing fixture config");
}
