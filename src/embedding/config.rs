use std::path::PathBuf;

use crate::constants::DEFAULT_MAX_SEQ_LEN;
use crate::embedding::error::EmbeddingError;

/// Configuration for a [`SentenceEncoder`](super::SentenceEncoder).
///
/// An encoder directory holds `config.json`, `model.safetensors`, and
/// `tokenizer.json` (the sentence-transformers export layout).
#[derive(Debug, Clone)]
pub struct EncoderConfig {
    /// Display name of the encoder (artifact directory name, or "stub").
    pub name: String,
    /// Path to the artifact directory.
    pub model_dir: PathBuf,
    /// Max tokens to consider per text.
    pub max_seq_len: usize,
    /// If true, run in deterministic stub mode (no model files required).
    pub testing_stub: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            model_dir: PathBuf::new(),
            max_seq_len: DEFAULT_MAX_SEQ_LEN,
            testing_stub: false,
        }
    }
}

impl EncoderConfig {
    /// Creates a config for an artifact directory, deriving the encoder name
    /// from the directory name.
    pub fn new<P: Into<PathBuf>>(model_dir: P) -> Self {
        let model_dir = model_dir.into();
        let name = model_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            name,
            model_dir,
            ..Default::default()
        }
    }

    /// Creates a stub config (no model files; deterministic outputs).
    pub fn stub() -> Self {
        Self {
            name: "stub".to_string(),
            testing_stub: true,
            ..Default::default()
        }
    }

    /// Returns a copy with a different max sequence length.
    pub fn with_max_seq_len(mut self, max_seq_len: usize) -> Self {
        self.max_seq_len = max_seq_len;
        self
    }

    /// Validates required fields for non-stub mode.
    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if self.testing_stub {
            return Ok(());
        }

        if self.model_dir.as_os_str().is_empty() {
            return Err(EmbeddingError::InvalidConfig {
                reason: "model_dir is required (stubbing is disabled)".to_string(),
            });
        }

        if !self.model_dir.is_dir() {
            return Err(EmbeddingError::ModelNotFound {
                path: self.model_dir.clone(),
            });
        }

        if self.max_seq_len == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "max_seq_len must be positive".to_string(),
            });
        }

        Ok(())
    }

    /// Path to the model architecture config.
    pub fn config_path(&self) -> PathBuf {
        self.model_dir.join("config.json")
    }

    /// Path to the model weights.
    pub fn weights_path(&self) -> PathBuf {
        self.model_dir.join("model.safetensors")
    }

    /// Path to the tokenizer definition.
    pub fn tokenizer_path(&self) -> PathBuf {
        self.model_dir.join("tokenizer.json")
    }

    /// Returns `true` if all required artifact files exist.
    pub fn artifacts_available(&self) -> bool {
        self.config_path().is_file()
            && self.weights_path().is_file()
            && self.tokenizer_path().is_file()
    }
}
