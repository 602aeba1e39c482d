use super::*;
use serial_test::serial;

#[test]
fn test_config_defaults() {
    let config = EvaluatorConfig::default();

    assert_eq!(config.primary_model, DEFAULT_PRIMARY_MODEL);
    assert_eq!(
        config.refinement_model.as_deref(),
        Some(DEFAULT_REFINEMENT_MODEL)
    );
    assert_eq!(config.endpoint_url, DEFAULT_ENDPOINT_URL);
    assert_eq!(config.remote_model, DEFAULT_REMOTE_MODEL);
    assert_eq!(config.max_retries, DEFAULT_MAX_RETRIES);
    assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    assert_eq!(config.evaluator, EvaluatorKind::Local);
    assert!(!config.testing_stub);
}

#[test]
fn test_default_weights_sum_to_one() {
    let w = Weights::default();
    let sum = w.length + w.semantic + w.keyword + w.concept;
    assert!((sum - 1.0).abs() < 1e-6);
}

#[test]
fn test_stub_config_validates() {
    let config = EvaluatorConfig::stub();
    assert!(config.testing_stub);
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_rejects_missing_model_dir() {
    let config = EvaluatorConfig {
        model_dir: PathBuf::from("/nonexistent/model/root"),
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::PathNotFound { .. })
    ));
}

#[test]
fn test_validate_rejects_negative_weight() {
    let config = EvaluatorConfig {
        weights: Weights {
            semantic: -0.1,
            ..Default::default()
        },
        ..EvaluatorConfig::stub()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidValue { .. })
    ));
}

#[test]
fn test_validate_rejects_out_of_range_threshold() {
    let config = EvaluatorConfig {
        thresholds: Thresholds {
            irrelevance: 1.5,
            ..Default::default()
        },
        ..EvaluatorConfig::stub()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_zero_length_ratio() {
    let config = EvaluatorConfig {
        thresholds: Thresholds {
            min_length_ratio: 0.0,
            ..Default::default()
        },
        ..EvaluatorConfig::stub()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_with_quality_threshold() {
    let config = EvaluatorConfig::stub().with_quality_threshold(0.45);
    assert_eq!(config.thresholds.quality, 0.45);
}

#[test]
#[should_panic(expected = "threshold must be between 0.0 and 1.0")]
fn test_with_quality_threshold_rejects_out_of_range() {
    let _ = EvaluatorConfig::stub().with_quality_threshold(1.2);
}

#[test]
fn test_evaluator_kind_parsing() {
    assert_eq!(EvaluatorKind::parse_or_default("local"), EvaluatorKind::Local);
    assert_eq!(EvaluatorKind::parse_or_default("LLM"), EvaluatorKind::Remote);
    assert_eq!(
        EvaluatorKind::parse_or_default(" remote "),
        EvaluatorKind::Remote
    );
    assert_eq!(
        EvaluatorKind::parse_or_default("filter"),
        EvaluatorKind::Filter
    );
}

#[test]
fn test_evaluator_kind_unknown_falls_back_to_local() {
    assert_eq!(
        EvaluatorKind::parse_or_default("no-such-strategy"),
        EvaluatorKind::Local
    );
}

#[test]
fn test_evaluator_kind_round_trip() {
    for kind in [
        EvaluatorKind::Local,
        EvaluatorKind::Remote,
        EvaluatorKind::Filter,
    ] {
        assert_eq!(EvaluatorKind::parse_or_default(kind.as_str()), kind);
    }
}

#[test]
#[serial]
fn test_from_env_defaults_when_unset() {
    unsafe {
        env::remove_var(EvaluatorConfig::ENV_MODEL_DIR);
        env::remove_var(EvaluatorConfig::ENV_PRIMARY_MODEL);
        env::remove_var(EvaluatorConfig::ENV_REFINEMENT_MODEL);
        env::remove_var(EvaluatorConfig::ENV_ENDPOINT_URL);
        env::remove_var(EvaluatorConfig::ENV_REMOTE_MODEL);
        env::remove_var(EvaluatorConfig::ENV_MAX_RETRIES);
        env::remove_var(EvaluatorConfig::ENV_TIMEOUT_SECS);
        env::remove_var(EvaluatorConfig::ENV_EVALUATOR);
    }

    let config = EvaluatorConfig::from_env().expect("should parse empty env");
    assert_eq!(config.primary_model, DEFAULT_PRIMARY_MODEL);
    assert_eq!(config.evaluator, EvaluatorKind::Local);
}

#[test]
#[serial]
fn test_from_env_overrides() {
    unsafe {
        env::set_var(EvaluatorConfig::ENV_MODEL_DIR, "/opt/encoders");
        env::set_var(EvaluatorConfig::ENV_ENDPOINT_URL, "http://10.0.0.2:11434");
        env::set_var(EvaluatorConfig::ENV_MAX_RETRIES, "5");
        env::set_var(EvaluatorConfig::ENV_EVALUATOR, "remote");
    }

    let config = EvaluatorConfig::from_env().expect("should parse env");
    assert_eq!(config.model_dir, PathBuf::from("/opt/encoders"));
    assert_eq!(config.endpoint_url, "http://10.0.0.2:11434");
    assert_eq!(config.max_retries, 5);
    assert_eq!(config.evaluator, EvaluatorKind::Remote);

    unsafe {
        env::remove_var(EvaluatorConfig::ENV_MODEL_DIR);
        env::remove_var(EvaluatorConfig::ENV_ENDPOINT_URL);
        env::remove_var(EvaluatorConfig::ENV_MAX_RETRIES);
        env::remove_var(EvaluatorConfig::ENV_EVALUATOR);
    }
}

#[test]
#[serial]
fn test_from_env_empty_refinement_disables_it() {
    unsafe {
        env::set_var(EvaluatorConfig::ENV_REFINEMENT_MODEL, "  ");
    }

    let config = EvaluatorConfig::from_env().expect("should parse env");
    assert!(config.refinement_model.is_none());

    unsafe {
        env::remove_var(EvaluatorConfig::ENV_REFINEMENT_MODEL);
    }
}

#[test]
#[serial]
fn test_from_env_rejects_unparseable_retries() {
    unsafe {
        env::set_var(EvaluatorConfig::ENV_MAX_RETRIES, "many");
    }

    let result = EvaluatorConfig::from_env();
    assert!(matches!(result, Err(ConfigError::EnvParseError { .. })));

    unsafe {
        env::remove_var(EvaluatorConfig::ENV_MAX_RETRIES);
    }
}

#[test]
fn test_model_dir_helpers() {
    let config = EvaluatorConfig {
        model_dir: PathBuf::from("/models"),
        primary_model: "primary".to_string(),
        refinement_model: Some("refine".to_string()),
        ..EvaluatorConfig::stub()
    };

    assert_eq!(config.primary_model_dir(), PathBuf::from("/models/primary"));
    assert_eq!(
        config.refinement_model_dir(),
        Some(PathBuf::from("/models/refine"))
    );
}
