//! Environment-backed evaluator configuration.
//!
//! Most settings have defaults. Override with `RUBRIC_*` environment
//! variables or by building an [`EvaluatorConfig`] directly. A config is
//! immutable for the lifetime of the evaluator constructed from it;
//! reconfiguring means constructing a new evaluator.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    DEFAULT_ENDPOINT_URL, DEFAULT_FILTER_THRESHOLD, DEFAULT_IRRELEVANCE_THRESHOLD,
    DEFAULT_MAX_RETRIES, DEFAULT_MAX_SEQ_LEN, DEFAULT_MIN_LENGTH_RATIO, DEFAULT_PENALTY_BANDS,
    DEFAULT_PRIMARY_MODEL, DEFAULT_QUALITY_THRESHOLD, DEFAULT_REFINEMENT_MODEL,
    DEFAULT_REMOTE_MODEL, DEFAULT_SEMANTIC_BLEND, DEFAULT_TIMEOUT_SECS, DEFAULT_WEIGHTS,
};

/// Aggregation weights for the local pipeline signals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights {
    /// Weight of the length-adequacy score.
    pub length: f32,
    /// Weight of the blended semantic score.
    pub semantic: f32,
    /// Weight of the tf-idf keyword score.
    pub keyword: f32,
    /// Weight of the concept-overlap score.
    pub concept: f32,
}

impl Default for Weights {
    fn default() -> Self {
        let (length, semantic, keyword, concept) = DEFAULT_WEIGHTS;
        Self {
            length,
            semantic,
            keyword,
            concept,
        }
    }
}

impl Weights {
    /// Validates that every weight is finite and non-negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("length", self.length),
            ("semantic", self.semantic),
            ("keyword", self.keyword),
            ("concept", self.concept),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue {
                    field: format!("weights.{name}"),
                    reason: format!("must be a non-negative finite number, got {value}"),
                });
            }
        }
        Ok(())
    }
}

/// Decision thresholds consumed by the scoring strategies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Primary similarity below this marks an answer irrelevant.
    pub irrelevance: f32,
    /// Fraction of the reference length below which the length score is penalized.
    pub min_length_ratio: f32,
    /// Remote pre-filter similarity threshold.
    pub filter: f32,
    /// Standalone quality-filter similarity threshold.
    pub quality: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            irrelevance: DEFAULT_IRRELEVANCE_THRESHOLD,
            min_length_ratio: DEFAULT_MIN_LENGTH_RATIO,
            filter: DEFAULT_FILTER_THRESHOLD,
            quality: DEFAULT_QUALITY_THRESHOLD,
        }
    }
}

impl Thresholds {
    /// Validates that every threshold lies in `[0, 1]` and the length ratio is positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("irrelevance", self.irrelevance),
            ("filter", self.filter),
            ("quality", self.quality),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidValue {
                    field: format!("thresholds.{name}"),
                    reason: format!("must be within [0, 1], got {value}"),
                });
            }
        }
        if !self.min_length_ratio.is_finite() || self.min_length_ratio <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "thresholds.min_length_ratio".to_string(),
                reason: format!("must be positive, got {}", self.min_length_ratio),
            });
        }
        Ok(())
    }
}

/// Which grading strategy an evaluator instance dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvaluatorKind {
    /// Local multi-signal pipeline (the documented default).
    #[default]
    Local,
    /// Remote LLM-backed pipeline with local pre-filter.
    Remote,
    /// Standalone similarity filter.
    Filter,
}

impl EvaluatorKind {
    /// Parses a configured strategy name; unknown names fall back to
    /// [`EvaluatorKind::Local`] with a warning rather than erroring.
    pub fn parse_or_default(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" | "ai" => Self::Local,
            "remote" | "llm" => Self::Remote,
            "filter" | "sas" => Self::Filter,
            other => {
                tracing::warn!(
                    requested = other,
                    "Unknown evaluator kind, falling back to local pipeline"
                );
                Self::Local
            }
        }
    }

    /// Returns the canonical configuration name for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
            Self::Filter => "filter",
        }
    }
}

/// Evaluator configuration.
///
/// Use [`EvaluatorConfig::from_env`] to read `RUBRIC_*` overrides on top of
/// defaults, or [`EvaluatorConfig::stub`] for model-free testing.
#[derive(Debug, Clone)]
pub struct EvaluatorConfig {
    /// Root directory holding sentence-encoder artifact directories.
    pub model_dir: PathBuf,

    /// Primary encoder directory name under `model_dir`. Required.
    pub primary_model: String,

    /// Refinement encoder directory name under `model_dir`. Optional;
    /// a missing model degrades scoring to single-model mode.
    pub refinement_model: Option<String>,

    /// Max tokens fed to the encoders.
    pub max_seq_len: usize,

    /// Signal aggregation weights.
    pub weights: Weights,

    /// Decision thresholds.
    pub thresholds: Thresholds,

    /// Primary/refinement blend applied when both encoders are loaded.
    pub semantic_blend: (f32, f32),

    /// Length-penalty bands `(ratio_percent, cap_percent)` for the remote
    /// pipeline, evaluated in ascending ratio order.
    pub penalty_bands: Vec<(f32, f32)>,

    /// Model-serving endpoint base URL.
    pub endpoint_url: String,

    /// Remote model identifier requested at the endpoint.
    pub remote_model: String,

    /// Remote call attempts before giving up.
    pub max_retries: u32,

    /// Per-call remote timeout.
    pub timeout: Duration,

    /// Strategy the selector dispatches to.
    pub evaluator: EvaluatorKind,

    /// If true, encoders run in deterministic stub mode (no model files).
    pub testing_stub: bool,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("./models"),
            primary_model: DEFAULT_PRIMARY_MODEL.to_string(),
            refinement_model: Some(DEFAULT_REFINEMENT_MODEL.to_string()),
            max_seq_len: DEFAULT_MAX_SEQ_LEN,
            weights: Weights::default(),
            thresholds: Thresholds::default(),
            semantic_blend: DEFAULT_SEMANTIC_BLEND,
            penalty_bands: DEFAULT_PENALTY_BANDS.to_vec(),
            endpoint_url: DEFAULT_ENDPOINT_URL.to_string(),
            remote_model: DEFAULT_REMOTE_MODEL.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            evaluator: EvaluatorKind::Local,
            testing_stub: false,
        }
    }
}

impl EvaluatorConfig {
    /// Env var for the model artifact root directory.
    pub const ENV_MODEL_DIR: &'static str = "RUBRIC_MODEL_DIR";
    /// Env var for the primary encoder directory name.
    pub const ENV_PRIMARY_MODEL: &'static str = "RUBRIC_PRIMARY_MODEL";
    /// Env var for the refinement encoder directory name (empty disables it).
    pub const ENV_REFINEMENT_MODEL: &'static str = "RUBRIC_REFINEMENT_MODEL";
    /// Env var for the model-serving endpoint URL.
    pub const ENV_ENDPOINT_URL: &'static str = "RUBRIC_ENDPOINT_URL";
    /// Env var for the remote model identifier.
    pub const ENV_REMOTE_MODEL: &'static str = "RUBRIC_REMOTE_MODEL";
    /// Env var for the remote retry count.
    pub const ENV_MAX_RETRIES: &'static str = "RUBRIC_MAX_RETRIES";
    /// Env var for the remote timeout in seconds.
    pub const ENV_TIMEOUT_SECS: &'static str = "RUBRIC_TIMEOUT_SECS";
    /// Env var for the evaluator strategy name.
    pub const ENV_EVALUATOR: &'static str = "RUBRIC_EVALUATOR";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let model_dir = Self::parse_path_from_env(Self::ENV_MODEL_DIR, defaults.model_dir);
        let primary_model =
            Self::parse_string_from_env(Self::ENV_PRIMARY_MODEL, defaults.primary_model);
        let refinement_model = match env::var(Self::ENV_REFINEMENT_MODEL) {
            Ok(value) => {
                let trimmed = value.trim().to_string();
                if trimmed.is_empty() { None } else { Some(trimmed) }
            }
            Err(_) => defaults.refinement_model,
        };
        let endpoint_url =
            Self::parse_string_from_env(Self::ENV_ENDPOINT_URL, defaults.endpoint_url);
        let remote_model =
            Self::parse_string_from_env(Self::ENV_REMOTE_MODEL, defaults.remote_model);
        let max_retries = Self::parse_u32_from_env(Self::ENV_MAX_RETRIES, defaults.max_retries)?;
        let timeout_secs =
            Self::parse_u32_from_env(Self::ENV_TIMEOUT_SECS, defaults.timeout.as_secs() as u32)?;
        let evaluator = match env::var(Self::ENV_EVALUATOR) {
            Ok(value) => EvaluatorKind::parse_or_default(&value),
            Err(_) => defaults.evaluator,
        };

        Ok(Self {
            model_dir,
            primary_model,
            refinement_model,
            max_seq_len: defaults.max_seq_len,
            weights: defaults.weights,
            thresholds: defaults.thresholds,
            semantic_blend: defaults.semantic_blend,
            penalty_bands: defaults.penalty_bands,
            endpoint_url,
            remote_model,
            max_retries,
            timeout: Duration::from_secs(u64::from(timeout_secs)),
            evaluator,
            testing_stub: defaults.testing_stub,
        })
    }

    /// Creates a stub config: encoders run deterministically with no model
    /// files, suitable for tests and environments without artifacts.
    pub fn stub() -> Self {
        Self {
            testing_stub: true,
            ..Default::default()
        }
    }

    /// Returns a copy with the standalone quality-filter threshold replaced.
    ///
    /// # Panics
    ///
    /// Panics if `threshold` is outside `[0.0, 1.0]`.
    pub fn with_quality_threshold(mut self, threshold: f32) -> Self {
        assert!(
            (0.0..=1.0).contains(&threshold),
            "threshold must be between 0.0 and 1.0"
        );
        self.thresholds.quality = threshold;
        self
    }

    /// Validates numeric ranges and, for non-stub mode, artifact paths.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;
        self.thresholds.validate()?;

        let (a, b) = self.semantic_blend;
        if !a.is_finite() || !b.is_finite() || a < 0.0 || b < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "semantic_blend".to_string(),
                reason: format!("components must be non-negative, got ({a}, {b})"),
            });
        }

        for (ratio, cap) in &self.penalty_bands {
            if !ratio.is_finite() || !cap.is_finite() || *ratio < 0.0 || *cap < 0.0 {
                return Err(ConfigError::InvalidValue {
                    field: "penalty_bands".to_string(),
                    reason: format!("band ({ratio}, {cap}) must be non-negative"),
                });
            }
        }

        if self.primary_model.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "primary_model".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        if self.testing_stub {
            return Ok(());
        }

        if !self.model_dir.exists() {
            return Err(ConfigError::PathNotFound {
                path: self.model_dir.clone(),
            });
        }
        if !self.model_dir.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.model_dir.clone(),
            });
        }

        Ok(())
    }

    /// Returns the artifact directory for the primary encoder.
    pub fn primary_model_dir(&self) -> PathBuf {
        self.model_dir.join(&self.primary_model)
    }

    /// Returns the artifact directory for the refinement encoder, if configured.
    pub fn refinement_model_dir(&self) -> Option<PathBuf> {
        self.refinement_model
            .as_ref()
            .map(|name| self.model_dir.join(name))
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or(default)
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(default)
    }

    fn parse_u32_from_env(var_name: &str, default: u32) -> Result<u32, ConfigError> {
        match env::var(var_name) {
            Ok(value) => value.trim().parse().map_err(|e| ConfigError::EnvParseError {
                var: var_name.to_string(),
                value,
                reason: format!("{e}"),
            }),
            Err(_) => Ok(default),
        }
    }
}
