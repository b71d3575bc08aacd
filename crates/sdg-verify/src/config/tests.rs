use super::*;
use serial_test::serial;
use std::env;
use std::net::IpAddr;
use tempfile::TempDir;

const ALL_VARS: &[&str] = &[
    Config::ENV_PORT,
    Config::ENV_BIND_ADDR,
    Config::ENV_PIPELINE_MODE,
    Config::ENV_AUTHENTICITY_MODEL_PATH,
    Config::ENV_ACTIVITY_MODEL_PATH,
    Config::ENV_CLASSIFIER_MODEL_PATH,
    Config::ENV_LABELS_PATH,
    Config::ENV_MIN_SDG_SCORE,
    Config::ENV_VERDICT_PROFILE,
    Config::ENV_CLASS_CONFIDENCE_PERCENT,
    Config::ENV_SOURCE_CHECK,
    Config::ENV_UPLOAD_PROFILE,
    Config::ENV_MAX_UPLOAD_BYTES,
    Config::ENV_EXECUTION,
    Config::ENV_DEVICE,
];

fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    clear_sdg_env();
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, value) in vars {
        unsafe { env::set_var(key, value) };
    }

    let result = f();

    clear_sdg_env();
    result
}

fn clear_sdg_env() {
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for key in ALL_VARS {
        unsafe { env::remove_var(key) };
    }
}

fn model_dirs() -> (TempDir, Config) {
    let root = TempDir::new().unwrap();
    let authenticity = root.path().join("deepfake");
    let activity = root.path().join("clip");
    std::fs::create_dir_all(&authenticity).unwrap();
    std::fs::create_dir_all(&activity).unwrap();

    let config = Config {
        authenticity_model_path: Some(authenticity),
        activity_model_path: Some(activity),
        ..Default::default()
    };
    (root, config)
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.port, 8000);
    assert_eq!(
        config.bind_addr,
        IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1))
    );
    assert_eq!(config.pipeline_mode, PipelineMode::CandidateLabels);
    assert_eq!(config.min_sdg_score, 0.3);
    assert_eq!(config.max_upload_bytes, STANDARD_MAX_UPLOAD_BYTES);
    assert_eq!(config.execution, ExecutionMode::Sequential);
    assert!(config.authenticity_model_path.is_none());
    assert!(!config.source_check);
}

#[test]
fn test_socket_addr() {
    let config = Config {
        port: 3000,
        bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(0, 0, 0, 0)),
        ..Default::default()
    };
    assert_eq!(config.socket_addr(), "0.0.0.0:3000");
}

#[test]
#[serial]
fn test_from_env_with_defaults() {
    let config = with_env_vars(&[], || Config::from_env().expect("should parse with defaults"));
    assert_eq!(config.port, 8000);
    assert_eq!(config.verdict_profile, VerdictProfile::Standard);
}

#[test]
#[serial]
fn test_from_env_overrides() {
    let config = with_env_vars(
        &[
            ("SDG_PORT", "9100"),
            ("SDG_BIND_ADDR", "0.0.0.0"),
            ("SDG_PIPELINE_MODE", "fixed-class"),
            ("SDG_CLASSIFIER_MODEL_PATH", "/models/sdg"),
            ("SDG_MIN_SDG_SCORE", "0.45"),
            ("SDG_VERDICT_PROFILE", "Legacy"),
            ("SDG_CLASS_CONFIDENCE_PERCENT", "55"),
            ("SDG_SOURCE_CHECK", "true"),
            ("SDG_EXECUTION", "speculative"),
            ("SDG_DEVICE", "cpu"),
        ],
        || Config::from_env().unwrap(),
    );

    assert_eq!(config.port, 9100);
    assert_eq!(config.bind_addr.to_string(), "0.0.0.0");
    assert_eq!(config.pipeline_mode, PipelineMode::FixedClass);
    assert_eq!(config.classifier_model_path, Some(PathBuf::from("/models/sdg")));
    assert_eq!(config.min_sdg_score, 0.45);
    assert_eq!(config.verdict_profile, VerdictProfile::Legacy);
    assert_eq!(config.class_confidence_percent, Some(55));
    assert!(config.source_check);
    assert_eq!(config.execution, ExecutionMode::Speculative);
    assert_eq!(config.device, DevicePreference::Cpu);
}

#[test]
#[serial]
fn test_upload_profile_and_explicit_cap() {
    let large = with_env_vars(&[("SDG_UPLOAD_PROFILE", "large")], || {
        Config::from_env().unwrap()
    });
    assert_eq!(large.max_upload_bytes, LARGE_MAX_UPLOAD_BYTES);

    let explicit = with_env_vars(
        &[("SDG_UPLOAD_PROFILE", "large"), ("SDG_MAX_UPLOAD_BYTES", "1024")],
        || Config::from_env().unwrap(),
    );
    assert_eq!(explicit.max_upload_bytes, 1024);
}

#[test]
#[serial]
fn test_invalid_values_rejected() {
    let cases: &[(&str, &str)] = &[
        ("SDG_PORT", "0"),
        ("SDG_PORT", "http"),
        ("SDG_BIND_ADDR", "localhost:80"),
        ("SDG_PIPELINE_MODE", "both"),
        ("SDG_MIN_SDG_SCORE", "high"),
        ("SDG_VERDICT_PROFILE", "strict"),
        ("SDG_CLASS_CONFIDENCE_PERCENT", "-5"),
        ("SDG_SOURCE_CHECK", "maybe"),
        ("SDG_UPLOAD_PROFILE", "huge"),
        ("SDG_EXECUTION", "parallel"),
        ("SDG_DEVICE", "tpu"),
    ];
    for (key, value) in cases {
        let result = with_env_vars(&[(*key, *value)], Config::from_env);
        assert!(result.is_err(), "{key}={value} should be rejected");
    }
}

#[test]
#[serial]
fn test_blank_values_fall_back_to_defaults() {
    let config = with_env_vars(
        &[
            ("SDG_PIPELINE_MODE", "  "),
            ("SDG_AUTHENTICITY_MODEL_PATH", ""),
            ("SDG_PORT", ""),
            ("SDG_BIND_ADDR", " "),
        ],
        || Config::from_env().unwrap(),
    );
    let defaults = Config::default();
    assert_eq!(config.port, defaults.port);
    assert_eq!(config.bind_addr, defaults.bind_addr);
    assert_eq!(config.pipeline_mode, PipelineMode::CandidateLabels);
    assert!(config.authenticity_model_path.is_none());
}

#[test]
fn test_validate_candidate_labels_mode() {
    let (_root, config) = model_dirs();
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_requires_model_paths() {
    let err = Config::default().validate().unwrap_err();
    assert!(matches!(
        err,
        ConfigError::MissingEnvVar {
            name: "SDG_AUTHENTICITY_MODEL_PATH"
        }
    ));

    let (_root, mut config) = model_dirs();
    config.activity_model_path = None;
    assert!(matches!(
        config.validate().unwrap_err(),
        ConfigError::MissingEnvVar {
            name: "SDG_ACTIVITY_MODEL_PATH"
        }
    ));
}

#[test]
fn test_validate_model_path_must_be_directory() {
    let (root, mut config) = model_dirs();
    let file = root.path().join("weights.bin");
    std::fs::write(&file, b"x").unwrap();

    config.activity_model_path = Some(file);
    assert!(matches!(
        config.validate().unwrap_err(),
        ConfigError::NotADirectory { .. }
    ));

    config.activity_model_path = Some(root.path().join("missing"));
    assert!(matches!(
        config.validate().unwrap_err(),
        ConfigError::PathNotFound { .. }
    ));
}

#[test]
fn test_validate_fixed_class_mode() {
    let root = TempDir::new().unwrap();
    let classifier = root.path().join("sdg");
    std::fs::create_dir_all(&classifier).unwrap();

    let mut config = Config {
        pipeline_mode: PipelineMode::FixedClass,
        classifier_model_path: Some(classifier.clone()),
        ..Default::default()
    };
    assert!(matches!(
        config.validate().unwrap_err(),
        ConfigError::PathNotFound { .. }
    ));

    std::fs::write(classifier.join("labels.txt"), "Planting\nRecycling\n").unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.labels_file(), Some(classifier.join("labels.txt")));

    config.source_check = true;
    assert!(matches!(
        config.validate().unwrap_err(),
        ConfigError::MissingEnvVar {
            name: "SDG_AUTHENTICITY_MODEL_PATH"
        }
    ));
}

#[test]
fn test_validate_ranges() {
    let (_root, mut config) = model_dirs();

    config.min_sdg_score = 1.5;
    assert!(matches!(
        config.validate().unwrap_err(),
        ConfigError::InvalidValue { .. }
    ));

    config.min_sdg_score = 0.3;
    config.class_confidence_percent = Some(101);
    assert!(config.validate().is_err());

    config.class_confidence_percent = None;
    config.max_upload_bytes = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_fixed_class_policy_selection() {
    let legacy = Config {
        verdict_profile: VerdictProfile::Legacy,
        ..Default::default()
    };
    assert_eq!(legacy.fixed_class_policy(), FixedClassPolicy::legacy());

    let overridden = Config {
        class_confidence_percent: Some(75),
        ..Default::default()
    };
    assert_eq!(overridden.fixed_class_policy().min_confidence_percent, 75.0);
}

#[test]
fn test_explicit_labels_path_wins() {
    let config = Config {
        classifier_model_path: Some(PathBuf::from("/models/sdg")),
        labels_path: Some(PathBuf::from("/etc/sdg/classes.txt")),
        ..Default::default()
    };
    assert_eq!(
        config.labels_file(),
        Some(PathBuf::from("/etc/sdg/classes.txt"))
    );
}

#[test]
fn test_mode_parsing() {
    assert_eq!(
        PipelineMode::parse("Candidate-Labels"),
        Some(PipelineMode::CandidateLabels)
    );
    assert_eq!(PipelineMode::parse("fixed_class"), Some(PipelineMode::FixedClass));
    assert_eq!(PipelineMode::parse("other"), None);
    assert_eq!(VerdictProfile::parse(" legacy "), Some(VerdictProfile::Legacy));
}
