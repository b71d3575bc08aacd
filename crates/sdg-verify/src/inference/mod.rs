//! Model plumbing behind the scorers.
//!
//! - [`vit`] wraps a ViT image classifier (authenticity and fixed-class modes).
//! - [`clip`] wraps CLIP for zero-shot activity matching.

/// CLIP zero-shot wrapper.
pub mod clip;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
mod error;
/// Label files and `id2label` maps.
pub mod labels;
/// Softmax, argmax and rounding helpers.
pub mod utils;
/// ViT classifier wrapper.
pub mod vit;

pub use clip::ClipZeroShot;
pub use device::{DevicePreference, select_device};
pub use error::InferenceError;
pub use labels::{load_label_file, parse_labels};
pub use utils::{argmax_first, round_to, softmax};
pub use vit::VitClassifier;
