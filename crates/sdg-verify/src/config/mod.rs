//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `SDG_*` environment variables.
//! Model directories have no default: the configured pipeline mode decides
//! which of them [`Config::validate`] requires.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use crate::constants::{
    DEFAULT_MIN_SDG_SCORE, LARGE_MAX_UPLOAD_BYTES, STANDARD_MAX_UPLOAD_BYTES,
};
use crate::inference::DevicePreference;
use crate::pipeline::{ExecutionMode, FixedClassPolicy};
use crate::upload::UploadPolicy;

/// File name looked up inside the classifier directory when no label file is set.
pub const DEFAULT_LABELS_FILENAME: &str = "labels.txt";

/// Which pipeline the service runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineMode {
    /// Authenticity veto plus zero-shot activity labels (`/analyze-image`).
    #[default]
    CandidateLabels,
    /// Single fixed-class classifier (`/predict`).
    FixedClass,
}

impl PipelineMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "candidate-labels" | "candidate_labels" | "labels" => Some(Self::CandidateLabels),
            "fixed-class" | "fixed_class" | "classifier" => Some(Self::FixedClass),
            _ => None,
        }
    }
}

/// Gate and matching style of the fixed-class verdict table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerdictProfile {
    /// 40% gate, case-sensitive class names, two-decimal percentages.
    #[default]
    Standard,
    /// 60% gate, lowercase matching, integer percentages.
    Legacy,
}

impl VerdictProfile {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "standard" => Some(Self::Standard),
            "legacy" => Some(Self::Legacy),
            _ => None,
        }
    }
}

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8000`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    pub pipeline_mode: PipelineMode,

    /// ViT real/fake classifier directory.
    pub authenticity_model_path: Option<PathBuf>,

    /// CLIP model directory (weights + `tokenizer.json`).
    pub activity_model_path: Option<PathBuf>,

    /// ViT multi-class classifier directory (fixed-class mode).
    pub classifier_model_path: Option<PathBuf>,

    /// Class label file. Default: `<classifier>/labels.txt`.
    pub labels_path: Option<PathBuf>,

    /// Default activity threshold when a request does not send one. Default: `0.3`.
    pub min_sdg_score: f32,

    pub verdict_profile: VerdictProfile,

    /// Overrides the profile's confidence gate (percent).
    pub class_confidence_percent: Option<u8>,

    /// Run the authenticity model before the fixed-class classifier.
    pub source_check: bool,

    /// Upload cap in bytes. Default: 5 MiB.
    pub max_upload_bytes: usize,

    pub execution: ExecutionMode,

    pub device: DevicePreference,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            pipeline_mode: PipelineMode::default(),
            authenticity_model_path: None,
            activity_model_path: None,
            classifier_model_path: None,
            labels_path: None,
            min_sdg_score: DEFAULT_MIN_SDG_SCORE,
            verdict_profile: VerdictProfile::default(),
            class_confidence_percent: None,
            source_check: false,
            max_upload_bytes: STANDARD_MAX_UPLOAD_BYTES,
            execution: ExecutionMode::default(),
            device: DevicePreference::default(),
        }
    }
}

impl Config {
    pub const ENV_PORT: &'static str = "SDG_PORT";
    pub const ENV_BIND_ADDR: &'static str = "SDG_BIND_ADDR";
    pub const ENV_PIPELINE_MODE: &'static str = "SDG_PIPELINE_MODE";
    pub const ENV_AUTHENTICITY_MODEL_PATH: &'static str = "SDG_AUTHENTICITY_MODEL_PATH";
    pub const ENV_ACTIVITY_MODEL_PATH: &'static str = "SDG_ACTIVITY_MODEL_PATH";
    pub const ENV_CLASSIFIER_MODEL_PATH: &'static str = "SDG_CLASSIFIER_MODEL_PATH";
    pub const ENV_LABELS_PATH: &'static str = "SDG_LABELS_PATH";
    pub const ENV_MIN_SDG_SCORE: &'static str = "SDG_MIN_SDG_SCORE";
    pub const ENV_VERDICT_PROFILE: &'static str = "SDG_VERDICT_PROFILE";
    pub const ENV_CLASS_CONFIDENCE_PERCENT: &'static str = "SDG_CLASS_CONFIDENCE_PERCENT";
    pub const ENV_SOURCE_CHECK: &'static str = "SDG_SOURCE_CHECK";
    pub const ENV_UPLOAD_PROFILE: &'static str = "SDG_UPLOAD_PROFILE";
    pub const ENV_MAX_UPLOAD_BYTES: &'static str = "SDG_MAX_UPLOAD_BYTES";
    pub const ENV_EXECUTION: &'static str = "SDG_EXECUTION";
    pub const ENV_DEVICE: &'static str = "SDG_DEVICE";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let pipeline_mode = Self::parse_enum_from_env(
            Self::ENV_PIPELINE_MODE,
            defaults.pipeline_mode,
            PipelineMode::parse,
            "expected candidate-labels or fixed-class",
        )?;
        let verdict_profile = Self::parse_enum_from_env(
            Self::ENV_VERDICT_PROFILE,
            defaults.verdict_profile,
            VerdictProfile::parse,
            "expected standard or legacy",
        )?;
        let execution = Self::parse_enum_from_env(
            Self::ENV_EXECUTION,
            defaults.execution,
            ExecutionMode::parse,
            "expected sequential or speculative",
        )?;
        let device = Self::parse_enum_from_env(
            Self::ENV_DEVICE,
            defaults.device,
            DevicePreference::parse,
            "expected auto or cpu",
        )?;

        let upload_default = Self::parse_enum_from_env(
            Self::ENV_UPLOAD_PROFILE,
            defaults.max_upload_bytes,
            |v| match v.trim().to_ascii_lowercase().as_str() {
                "standard" => Some(STANDARD_MAX_UPLOAD_BYTES),
                "large" => Some(LARGE_MAX_UPLOAD_BYTES),
                _ => None,
            },
            "expected standard or large",
        )?;
        let max_upload_bytes = Self::parse_number_from_env(
            Self::ENV_MAX_UPLOAD_BYTES,
            upload_default,
        )?;

        let min_sdg_score =
            Self::parse_number_from_env(Self::ENV_MIN_SDG_SCORE, defaults.min_sdg_score)?;
        let class_confidence_percent =
            Self::parse_optional_number_from_env(Self::ENV_CLASS_CONFIDENCE_PERCENT)?;
        let source_check = Self::parse_bool_from_env(Self::ENV_SOURCE_CHECK, defaults.source_check)?;

        Ok(Self {
            port,
            bind_addr,
            pipeline_mode,
            authenticity_model_path: Self::parse_optional_path_from_env(
                Self::ENV_AUTHENTICITY_MODEL_PATH,
            ),
            activity_model_path: Self::parse_optional_path_from_env(Self::ENV_ACTIVITY_MODEL_PATH),
            classifier_model_path: Self::parse_optional_path_from_env(
                Self::ENV_CLASSIFIER_MODEL_PATH,
            ),
            labels_path: Self::parse_optional_path_from_env(Self::ENV_LABELS_PATH),
            min_sdg_score,
            verdict_profile,
            class_confidence_percent,
            source_check,
            max_upload_bytes,
            execution,
            device,
        })
    }

    /// Validates value ranges and the paths the configured mode needs
    /// (does not load anything).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.min_sdg_score.is_finite() || !(0.0..=1.0).contains(&self.min_sdg_score) {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_MIN_SDG_SCORE,
                value: self.min_sdg_score.to_string(),
                reason: "must be within [0, 1]".to_string(),
            });
        }
        if let Some(percent) = self.class_confidence_percent
            && percent > 100
        {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_CLASS_CONFIDENCE_PERCENT,
                value: percent.to_string(),
                reason: "must be within [0, 100]".to_string(),
            });
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_MAX_UPLOAD_BYTES,
                value: "0".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        match self.pipeline_mode {
            PipelineMode::CandidateLabels => {
                Self::require_dir(
                    Self::ENV_AUTHENTICITY_MODEL_PATH,
                    self.authenticity_model_path.as_deref(),
                )?;
                Self::require_dir(
                    Self::ENV_ACTIVITY_MODEL_PATH,
                    self.activity_model_path.as_deref(),
                )?;
            }
            PipelineMode::FixedClass => {
                Self::require_dir(
                    Self::ENV_CLASSIFIER_MODEL_PATH,
                    self.classifier_model_path.as_deref(),
                )?;
                Self::require_file(Self::ENV_LABELS_PATH, self.labels_file().as_deref())?;
                if self.source_check {
                    Self::require_dir(
                        Self::ENV_AUTHENTICITY_MODEL_PATH,
                        self.authenticity_model_path.as_deref(),
                    )?;
                }
            }
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    /// Effective label file: explicit path, else `labels.txt` next to the classifier.
    pub fn labels_file(&self) -> Option<PathBuf> {
        self.labels_path.clone().or_else(|| {
            self.classifier_model_path
                .as_ref()
                .map(|dir| dir.join(DEFAULT_LABELS_FILENAME))
        })
    }

    pub fn upload_policy(&self) -> UploadPolicy {
        UploadPolicy::new(self.max_upload_bytes)
    }

    pub fn fixed_class_policy(&self) -> FixedClassPolicy {
        let policy = match self.verdict_profile {
            VerdictProfile::Standard => FixedClassPolicy::standard(),
            VerdictProfile::Legacy => FixedClassPolicy::legacy(),
        };
        match self.class_confidence_percent {
            Some(percent) => policy.with_min_confidence_percent(percent),
            None => policy,
        }
    }

    fn require_dir(name: &'static str, path: Option<&Path>) -> Result<(), ConfigError> {
        let path = path.ok_or(ConfigError::MissingEnvVar { name })?;
        if !path.exists() {
            return Err(ConfigError::PathNotFound {
                path: path.to_path_buf(),
            });
        }
        if !path.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: path.to_path_buf(),
            });
        }
        Ok(())
    }

    fn require_file(name: &'static str, path: Option<&Path>) -> Result<(), ConfigError> {
        let path = path.ok_or(ConfigError::MissingEnvVar { name })?;
        if !path.exists() {
            return Err(ConfigError::PathNotFound {
                path: path.to_path_buf(),
            });
        }
        if !path.is_file() {
            return Err(ConfigError::NotAFile {
                path: path.to_path_buf(),
            });
        }
        Ok(())
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match Self::non_empty_var(Self::ENV_PORT) {
            Some(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            None => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match Self::non_empty_var(Self::ENV_BIND_ADDR) {
            Some(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            None => Ok(default),
        }
    }

    fn parse_enum_from_env<T>(
        name: &'static str,
        default: T,
        parse: impl Fn(&str) -> Option<T>,
        expected: &str,
    ) -> Result<T, ConfigError> {
        match Self::non_empty_var(name) {
            Some(value) => parse(&value).ok_or_else(|| ConfigError::InvalidValue {
                name,
                value,
                reason: expected.to_string(),
            }),
            None => Ok(default),
        }
    }

    fn parse_number_from_env<T>(name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        Ok(Self::parse_optional_number_from_env(name)?.unwrap_or(default))
    }

    fn parse_optional_number_from_env<T>(name: &'static str) -> Result<Option<T>, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match Self::non_empty_var(name) {
            Some(value) => value
                .parse()
                .map(Some)
                .map_err(|e: T::Err| ConfigError::InvalidValue {
                    name,
                    reason: e.to_string(),
                    value,
                }),
            None => Ok(None),
        }
    }

    fn parse_bool_from_env(name: &'static str, default: bool) -> Result<bool, ConfigError> {
        Self::parse_enum_from_env(
            name,
            default,
            |v| match v.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Some(true),
                "0" | "false" | "no" | "off" => Some(false),
                _ => None,
            },
            "expected true or false",
        )
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        Self::non_empty_var(var_name).map(PathBuf::from)
    }

    fn non_empty_var(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}
