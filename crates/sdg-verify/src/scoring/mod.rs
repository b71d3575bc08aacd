//! The two scoring stages and the fixed-class classifier behind trait seams.
//!
//! - [`AuthenticityScorer`]: real vs AI-generated.
//! - [`ActivityScorer`]: zero-shot match against candidate activity labels.
//! - [`ClassScorer`]: single-stage classification over a trained label space.
//!
//! Every scorer consumes raw [`ImageBytes`] and owns its own preprocessing.

/// Zero-shot activity scoring.
pub mod activity;
/// Real/fake scoring.
pub mod authenticity;
/// Fixed-class scoring.
pub mod classifier;
/// Scoring error types.
pub mod error;
#[cfg(any(test, feature = "mock"))]
/// Scripted scorers (enabled with `mock` feature).
pub mod mock;
/// Scoring result types.
pub mod types;


pub use activity::{ActivityScorer, ClipActivityScorer};
pub use authenticity::{AuthenticityScorer, VitAuthenticityScorer};
pub use classifier::{ClassScorer, VitClassScorer};
pub use error::ScoringError;
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockActivityScorer, MockAuthenticityScorer, MockClassScorer};
pub use types::{
    ActivityResult, AuthenticityLabel, AuthenticityResult, CandidateLabelSet, ClassPrediction,
    ImageBytes,
};
