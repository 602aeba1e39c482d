use tracing::{info, warn};

use crate::config::EvaluatorConfig;

use super::config::EncoderConfig;
use super::encoder::SentenceEncoder;
use super::error::EmbeddingError;

/// Process-wide handle to the loaded sentence encoders.
///
/// Constructed once at evaluator build time and shared by reference into
/// every strategy. The primary encoder is required: construction fails if
/// its artifacts are unavailable (there is no network fallback). The
/// refinement encoder is optional; a failed load degrades scoring to
/// single-model mode with a warning and never fails requests.
pub struct ModelSet {
    primary: SentenceEncoder,
    refinement: Option<SentenceEncoder>,
}

impl std::fmt::Debug for ModelSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSet")
            .field("primary", &self.primary.name())
            .field(
                "refinement",
                &self.refinement.as_ref().map(SentenceEncoder::name),
            )
            .finish()
    }
}

impl ModelSet {
    /// Loads the encoders named by `config` (construct-or-fail lifecycle).
    pub fn load(config: &EvaluatorConfig) -> Result<Self, EmbeddingError> {
        let primary_config = if config.testing_stub {
            EncoderConfig {
                name: config.primary_model.clone(),
                ..EncoderConfig::stub()
            }
        } else {
            EncoderConfig::new(config.primary_model_dir()).with_max_seq_len(config.max_seq_len)
        };
        let primary = SentenceEncoder::load(primary_config)?;

        let refinement = match (&config.refinement_model, config.testing_stub) {
            (None, _) => None,
            (Some(name), true) => Some(SentenceEncoder::load(EncoderConfig {
                name: name.clone(),
                ..EncoderConfig::stub()
            })?),
            (Some(name), false) => {
                let refinement_config = EncoderConfig::new(config.model_dir.join(name))
                    .with_max_seq_len(config.max_seq_len);
                match SentenceEncoder::load(refinement_config) {
                    Ok(encoder) => Some(encoder),
                    Err(e) => {
                        warn!(
                            model = %name,
                            error = %e,
                            "Refinement encoder unavailable, continuing with primary only"
                        );
                        None
                    }
                }
            }
        };

        info!(
            primary = %primary.name(),
            refinement = refinement.as_ref().map(SentenceEncoder::name),
            "Model set ready"
        );

        Ok(Self {
            primary,
            refinement,
        })
    }

    /// Loads a primary-only stub model set (no files).
    pub fn stub() -> Result<Self, EmbeddingError> {
        Ok(Self {
            primary: SentenceEncoder::load(EncoderConfig::stub())?,
            refinement: None,
        })
    }

    /// Returns the required primary encoder.
    pub fn primary(&self) -> &SentenceEncoder {
        &self.primary
    }

    /// Returns the refinement encoder, if loaded.
    pub fn refinement(&self) -> Option<&SentenceEncoder> {
        self.refinement.as_ref()
    }

    /// Returns `true` if both encoders are loaded.
    pub fn has_refinement(&self) -> bool {
        self.refinement.is_some()
    }
}
