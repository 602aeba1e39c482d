use thiserror::Error;

use crate::config::ConfigError;
use crate::embedding::EmbeddingError;

#[derive(Debug, Error)]
pub enum EvaluatorError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),
}
