use thiserror::Error;

use crate::embedding::EmbeddingError;

#[derive(Debug, Error)]
pub enum SignalError {
    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("signal computation failed: {reason}")]
    ComputationFailed { reason: String },
}
