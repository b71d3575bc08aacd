use std::sync::Arc;

use sdgverify::config::{Config, PipelineMode};
use sdgverify::lifecycle::{LifecycleError, ServiceLifecycle};
use sdgverify::service::VerificationService;
use sdgverify::upload::UploadPolicy;

use crate::gateway::error::GatewayError;

#[derive(Clone)]
pub struct HandlerState {
    pub lifecycle: Arc<ServiceLifecycle<VerificationService>>,

    /// Decides which routes are mounted.
    pub mode: PipelineMode,

    /// Known before the models load so the body limit can be set up front.
    pub upload_policy: UploadPolicy,
}

impl HandlerState {
    pub fn new(
        lifecycle: Arc<ServiceLifecycle<VerificationService>>,
        mode: PipelineMode,
        upload_policy: UploadPolicy,
    ) -> Self {
        Self {
            lifecycle,
            mode,
            upload_policy,
        }
    }

    pub fn from_config(
        config: &Config,
        lifecycle: Arc<ServiceLifecycle<VerificationService>>,
    ) -> Self {
        Self::new(lifecycle, config.pipeline_mode, config.upload_policy())
    }

    /// State around an already-loaded service.
    pub fn with_service(service: VerificationService) -> Result<Self, LifecycleError> {
        let mode = service.mode();
        let upload_policy = service.upload_policy().clone();
        let lifecycle = Arc::new(ServiceLifecycle::new());
        lifecycle.mark_ready(service)?;
        Ok(Self::new(lifecycle, mode, upload_policy))
    }

    /// The loaded service, or 503 while models are loading / after teardown.
    pub fn service(&self) -> Result<Arc<VerificationService>, GatewayError> {
        self.lifecycle.get().ok_or(GatewayError::ServiceUnavailable)
    }
}
