use std::sync::Arc;

use serde::Serialize;

use super::error::ScoringError;
use crate::constants::{DEFAULT_SDG_LABELS, FAKE_LABEL_MARKER, SCORE_DECIMALS, preset_labels};
use crate::inference::{argmax_first, round_to, softmax};

/// Immutable upload payload, shared cheaply between scorers.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageBytes(Arc<[u8]>);

impl ImageBytes {
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for ImageBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl From<&[u8]> for ImageBytes {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes)
    }
}

impl std::fmt::Debug for ImageBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageBytes").field("len", &self.len()).finish()
    }
}

/// Canonical authenticity classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AuthenticityLabel {
    Real,
    Fake,
}

impl AuthenticityLabel {
    /// Any model label containing "fake" (any case) is Fake; everything else is Real.
    pub fn from_model_label(label: &str) -> Self {
        if label.to_lowercase().contains(FAKE_LABEL_MARKER) {
            AuthenticityLabel::Fake
        } else {
            AuthenticityLabel::Real
        }
    }

    pub fn is_fake(&self) -> bool {
        matches!(self, AuthenticityLabel::Fake)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuthenticityLabel::Real => "Real",
            AuthenticityLabel::Fake => "Fake",
        }
    }
}

impl std::fmt::Display for AuthenticityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AuthenticityResult {
    pub label: AuthenticityLabel,
    /// Probability mass on the predicted class, rounded to four places.
    pub confidence: f32,
}

impl AuthenticityResult {
    pub fn new(label: AuthenticityLabel, confidence: f32) -> Self {
        Self {
            label,
            confidence: round_to(confidence.clamp(0.0, 1.0), SCORE_DECIMALS),
        }
    }

    /// Picks the most probable model class and normalises its label.
    pub fn from_probabilities(probs: &[f32], labels: &[String]) -> Result<Self, ScoringError> {
        if probs.len() != labels.len() {
            return Err(ScoringError::ScoringFailure {
                reason: format!(
                    "{} probabilities for {} authenticity labels",
                    probs.len(),
                    labels.len()
                ),
            });
        }
        let idx = argmax_first(probs).ok_or_else(|| ScoringError::ScoringFailure {
            reason: "authenticity model produced no usable probabilities".to_string(),
        })?;

        Ok(Self::new(
            AuthenticityLabel::from_model_label(&labels[idx]),
            probs[idx],
        ))
    }
}

/// Best-matching candidate label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityResult {
    pub label: String,
    /// Softmax probability over the candidate set, rounded to four places.
    pub score: f32,
}

impl ActivityResult {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score: round_to(score.clamp(0.0, 1.0), SCORE_DECIMALS),
        }
    }

    /// Softmax over raw similarity logits; ties go to the earliest candidate.
    pub fn from_logits(labels: &CandidateLabelSet, logits: &[f32]) -> Result<Self, ScoringError> {
        if logits.len() != labels.len() {
            return Err(ScoringError::ScoringFailure {
                reason: format!(
                    "{} similarity logits for {} candidate labels",
                    logits.len(),
                    labels.len()
                ),
            });
        }

        let probs = softmax(logits);
        let idx = argmax_first(&probs).ok_or_else(|| ScoringError::ScoringFailure {
            reason: "activity model produced no usable similarities".to_string(),
        })?;

        Ok(Self::new(labels.labels()[idx].clone(), probs[idx]))
    }
}

/// Ordered, non-empty list of activity descriptions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateLabelSet(Vec<String>);

impl CandidateLabelSet {
    /// Trims every label and drops blanks. Fails if nothing remains.
    pub fn new<I, S>(labels: I) -> Result<Self, ScoringError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let labels: Vec<String> = labels
            .into_iter()
            .map(|l| l.as_ref().trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();

        if labels.is_empty() {
            return Err(ScoringError::InvalidInput {
                reason: "candidate label set must not be empty".to_string(),
            });
        }
        Ok(Self(labels))
    }

    pub fn default_sdg() -> Self {
        Self(DEFAULT_SDG_LABELS.iter().map(|l| l.to_string()).collect())
    }

    pub fn preset(name: &str) -> Option<Self> {
        preset_labels(name).map(|labels| Self(labels.iter().map(|l| l.to_string()).collect()))
    }

    /// Parses a comma-separated form value. `None` when no label survives trimming.
    pub fn from_comma_separated(value: &str) -> Option<Self> {
        Self::new(value.split(',')).ok()
    }

    pub fn labels(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for CandidateLabelSet {
    fn default() -> Self {
        Self::default_sdg()
    }
}

/// Top class of a fixed-class classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassPrediction {
    pub index: usize,
    pub label: String,
    /// Unrounded probability in `[0, 1]`.
    pub probability: f32,
}

impl ClassPrediction {
    pub fn from_probabilities(probs: &[f32], labels: &[String]) -> Result<Self, ScoringError> {
        if probs.len() != labels.len() {
            return Err(ScoringError::ScoringFailure {
                reason: format!("{} probabilities for {} classes", probs.len(), labels.len()),
            });
        }
        let index = argmax_first(probs).ok_or_else(|| ScoringError::ScoringFailure {
            reason: "classifier produced no usable probabilities".to_string(),
        })?;

        Ok(Self {
            index,
            label: labels[index].clone(),
            probability: probs[index].clamp(0.0, 1.0),
        })
    }
}
