use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use super::activity::ActivityScorer;
use super::authenticity::AuthenticityScorer;
use super::classifier::ClassScorer;
use super::error::ScoringError;
use super::types::{
    ActivityResult, AuthenticityLabel, AuthenticityResult, CandidateLabelSet, ClassPrediction,
    ImageBytes,
};

type AuthenticityFn = dyn Fn(&ImageBytes) -> Result<AuthenticityResult, ScoringError> + Send + Sync;
type ActivityFn =
    dyn Fn(&ImageBytes, &CandidateLabelSet) -> Result<ActivityResult, ScoringError> + Send + Sync;
type ClassFn = dyn Fn(&ImageBytes) -> Result<ClassPrediction, ScoringError> + Send + Sync;

/// Scripted [`AuthenticityScorer`] that counts invocations.
#[derive(Clone)]
pub struct MockAuthenticityScorer {
    respond: Arc<AuthenticityFn>,
    calls: Arc<AtomicUsize>,
}

impl MockAuthenticityScorer {
    pub fn from_fn<F>(respond: F) -> Self
    where
        F: Fn(&ImageBytes) -> Result<AuthenticityResult, ScoringError> + Send + Sync + 'static,
    {
        Self {
            respond: Arc::new(respond),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn real(confidence: f32) -> Self {
        Self::from_fn(move |_| Ok(AuthenticityResult::new(AuthenticityLabel::Real, confidence)))
    }

    pub fn fake(confidence: f32) -> Self {
        Self::from_fn(move |_| Ok(AuthenticityResult::new(AuthenticityLabel::Fake, confidence)))
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self::from_fn(move |_| {
            Err(ScoringError::ScoringFailure {
                reason: reason.clone(),
            })
        })
    }

    pub fn unavailable() -> Self {
        Self::from_fn(|_| {
            Err(ScoringError::ServiceUnavailable {
                reason: "authenticity model not loaded".to_string(),
            })
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AuthenticityScorer for MockAuthenticityScorer {
    fn score(&self, image: &ImageBytes) -> Result<AuthenticityResult, ScoringError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.respond)(image)
    }

    fn name(&self) -> &str {
        "mock-authenticity"
    }
}

/// Scripted [`ActivityScorer`] that records the label sets it was given.
#[derive(Clone)]
pub struct MockActivityScorer {
    respond: Arc<ActivityFn>,
    calls: Arc<AtomicUsize>,
    last_labels: Arc<Mutex<Option<CandidateLabelSet>>>,
}

impl MockActivityScorer {
    pub fn from_fn<F>(respond: F) -> Self
    where
        F: Fn(&ImageBytes, &CandidateLabelSet) -> Result<ActivityResult, ScoringError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            respond: Arc::new(respond),
            calls: Arc::new(AtomicUsize::new(0)),
            last_labels: Arc::new(Mutex::new(None)),
        }
    }

    /// Always answers with `label` at `score`, whatever the candidates are.
    pub fn fixed(label: impl Into<String>, score: f32) -> Self {
        let label = label.into();
        Self::from_fn(move |_, _| Ok(ActivityResult::new(label.clone(), score)))
    }

    /// Feeds `logits` through the real softmax/argmax path.
    pub fn from_logits(logits: Vec<f32>) -> Self {
        Self::from_fn(move |_, labels| ActivityResult::from_logits(labels, &logits))
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self::from_fn(move |_, _| {
            Err(ScoringError::ScoringFailure {
                reason: reason.clone(),
            })
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_labels(&self) -> Option<CandidateLabelSet> {
        self.last_labels.lock().clone()
    }
}

impl ActivityScorer for MockActivityScorer {
    fn score(
        &self,
        image: &ImageBytes,
        labels: &CandidateLabelSet,
    ) -> Result<ActivityResult, ScoringError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_labels.lock() = Some(labels.clone());
        (self.respond)(image, labels)
    }

    fn name(&self) -> &str {
        "mock-activity"
    }
}

/// Scripted [`ClassScorer`] over a fixed label list.
#[derive(Clone)]
pub struct MockClassScorer {
    labels: Vec<String>,
    respond: Arc<ClassFn>,
    calls: Arc<AtomicUsize>,
}

impl MockClassScorer {
    pub fn from_fn<F>(labels: Vec<String>, respond: F) -> Self
    where
        F: Fn(&ImageBytes) -> Result<ClassPrediction, ScoringError> + Send + Sync + 'static,
    {
        Self {
            labels,
            respond: Arc::new(respond),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Predicts `label` with `probability`. `label` is appended to the label
    /// space when absent.
    pub fn predicting(labels: &[&str], label: &str, probability: f32) -> Self {
        let mut labels: Vec<String> = labels.iter().map(|l| l.to_string()).collect();
        let index = match labels.iter().position(|l| l == label) {
            Some(idx) => idx,
            None => {
                labels.push(label.to_string());
                labels.len() - 1
            }
        };
        let prediction = ClassPrediction {
            index,
            label: label.to_string(),
            probability,
        };
        Self::from_fn(labels, move |_| Ok(prediction.clone()))
    }

    pub fn failing(labels: &[&str], reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self::from_fn(labels.iter().map(|l| l.to_string()).collect(), move |_| {
            Err(ScoringError::ScoringFailure {
                reason: reason.clone(),
            })
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ClassScorer for MockClassScorer {
    fn classify(&self, image: &ImageBytes) -> Result<ClassPrediction, ScoringError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.respond)(image)
    }

    fn labels(&self) -> &[String] {
        &self.labels
    }
}
