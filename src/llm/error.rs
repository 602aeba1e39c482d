use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM endpoint unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("deadline exceeded after {attempts} attempt(s)")]
    DeadlineExceeded { attempts: u32 },

    #[error("no usable response after {attempts} attempt(s): {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },
}
