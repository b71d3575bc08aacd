//! The loaded, shareable verification service.
//!
//! [`VerificationService::load`] builds everything the configured mode needs
//! once at startup. The result is placed in a
//! [`ServiceLifecycle`](crate::lifecycle::ServiceLifecycle) and shared
//! read-only by every request.

pub mod error;


pub use error::ServiceError;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use candle_core::Device;
use tracing::info;

use crate::config::{Config, ConfigError, PipelineMode};
use crate::inference::{load_label_file, select_device};
use crate::pipeline::{ClassificationPipeline, ValidationPipeline};
use crate::scoring::{
    AuthenticityScorer, ClipActivityScorer, VitAuthenticityScorer, VitClassScorer,
};
use crate::upload::UploadPolicy;

/// The pipeline of one mode.
#[derive(Debug, Clone)]
pub enum ServicePipeline {
    CandidateLabels(ValidationPipeline),
    FixedClass(ClassificationPipeline),
}

#[derive(Debug, Clone)]
pub struct VerificationService {
    pipeline: ServicePipeline,
    upload_policy: UploadPolicy,
    default_min_sdg_score: f32,
}

impl VerificationService {
    /// Validates `config`, selects a device and loads the mode's models.
    pub fn load(config: &Config) -> Result<Self, ServiceError> {
        config.validate()?;
        let started = Instant::now();
        let device = select_device(config.device)?;

        let pipeline = match config.pipeline_mode {
            PipelineMode::CandidateLabels => {
                let authenticity = Self::load_authenticity(config, &device)?;
                let activity_dir = required_path(
                    config.activity_model_path.as_deref(),
                    Config::ENV_ACTIVITY_MODEL_PATH,
                )?;
                let activity = ClipActivityScorer::load(activity_dir, &device)?;

                ServicePipeline::CandidateLabels(
                    ValidationPipeline::new(authenticity, Arc::new(activity))
                        .with_execution(config.execution),
                )
            }
            PipelineMode::FixedClass => {
                let classifier_dir = required_path(
                    config.classifier_model_path.as_deref(),
                    Config::ENV_CLASSIFIER_MODEL_PATH,
                )?;
                let labels_file = config.labels_file().ok_or(ConfigError::MissingEnvVar {
                    name: Config::ENV_LABELS_PATH,
                })?;
                let labels = load_label_file(&labels_file)?;
                let classifier = VitClassScorer::load(classifier_dir, labels, &device)?;

                let mut pipeline =
                    ClassificationPipeline::new(Arc::new(classifier), config.fixed_class_policy());
                if config.source_check {
                    pipeline = pipeline.with_source_check(Self::load_authenticity(config, &device)?);
                }
                ServicePipeline::FixedClass(pipeline)
            }
        };

        info!(
            mode = ?config.pipeline_mode,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Models loaded"
        );

        Ok(Self::from_parts(pipeline, config.upload_policy())
            .with_default_min_sdg_score(config.min_sdg_score))
    }

    /// Assembles a service from already-built parts.
    pub fn from_parts(pipeline: ServicePipeline, upload_policy: UploadPolicy) -> Self {
        Self {
            pipeline,
            upload_policy,
            default_min_sdg_score: crate::constants::DEFAULT_MIN_SDG_SCORE,
        }
    }

    pub fn with_default_min_sdg_score(mut self, min_sdg_score: f32) -> Self {
        self.default_min_sdg_score = min_sdg_score;
        self
    }

    pub fn mode(&self) -> PipelineMode {
        match self.pipeline {
            ServicePipeline::CandidateLabels(_) => PipelineMode::CandidateLabels,
            ServicePipeline::FixedClass(_) => PipelineMode::FixedClass,
        }
    }

    pub fn validation(&self) -> Option<&ValidationPipeline> {
        match &self.pipeline {
            ServicePipeline::CandidateLabels(pipeline) => Some(pipeline),
            ServicePipeline::FixedClass(_) => None,
        }
    }

    pub fn classification(&self) -> Option<&ClassificationPipeline> {
        match &self.pipeline {
            ServicePipeline::FixedClass(pipeline) => Some(pipeline),
            ServicePipeline::CandidateLabels(_) => None,
        }
    }

    pub fn upload_policy(&self) -> &UploadPolicy {
        &self.upload_policy
    }

    /// Threshold applied when a request does not send `min_sdg_score`.
    pub fn default_min_sdg_score(&self) -> f32 {
        self.default_min_sdg_score
    }

    fn load_authenticity(
        config: &Config,
        device: &Device,
    ) -> Result<Arc<dyn AuthenticityScorer>, ServiceError> {
        let dir = required_path(
            config.authenticity_model_path.as_deref(),
            Config::ENV_AUTHENTICITY_MODEL_PATH,
        )?;
        Ok(Arc::new(VitAuthenticityScorer::load(dir, device)?))
    }
}

fn required_path<'a>(path: Option<&'a Path>, name: &'static str) -> Result<&'a Path, ConfigError> {
    path.ok_or(ConfigError::MissingEnvVar { name })
}
