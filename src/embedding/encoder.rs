use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config, DTYPE};
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use crate::text::Lexicon;

use super::config::EncoderConfig;
use super::device::select_device;
use super::error::EmbeddingError;

enum EncoderBackend {
    Model {
        model: BertModel,
        tokenizer: Tokenizer,
        device: Device,
        hidden_size: usize,
    },
    Stub,
}

/// Sentence encoder producing L2-normalized mean-pooled embeddings.
///
/// Loads a BERT-family sentence-transformers export (safetensors) via
/// candle. Stub mode needs no model files and produces deterministic
/// outputs, for tests and artifact-free environments.
pub struct SentenceEncoder {
    backend: EncoderBackend,
    config: EncoderConfig,
}

impl std::fmt::Debug for SentenceEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentenceEncoder")
            .field(
                "backend",
                &match &self.backend {
                    EncoderBackend::Model { device, .. } => format!("Model({device:?})"),
                    EncoderBackend::Stub => "Stub".to_string(),
                },
            )
            .field("name", &self.config.name)
            .field("max_seq_len", &self.config.max_seq_len)
            .finish()
    }
}

impl SentenceEncoder {
    /// Loads the encoder from a config (stub mode is supported).
    pub fn load(config: EncoderConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;

        if config.testing_stub {
            warn!("Sentence encoder running in STUB mode (testing only)");
            return Ok(Self {
                backend: EncoderBackend::Stub,
                config,
            });
        }

        if !config.artifacts_available() {
            return Err(EmbeddingError::ModelNotFound {
                path: config.model_dir.clone(),
            });
        }

        let device = select_device()?;
        debug!(?device, encoder = %config.name, "Selected compute device");

        let (model, tokenizer, hidden_size) = Self::load_model(&config, &device)?;

        info!(
            encoder = %config.name,
            model_dir = %config.model_dir.display(),
            hidden_size,
            max_seq_len = config.max_seq_len,
            "Sentence encoder loaded"
        );

        Ok(Self {
            backend: EncoderBackend::Model {
                model,
                tokenizer,
                device,
                hidden_size,
            },
            config,
        })
    }

    fn load_model(
        config: &EncoderConfig,
        device: &Device,
    ) -> Result<(BertModel, Tokenizer, usize), EmbeddingError> {
        let config_content = std::fs::read_to_string(config.config_path())?;
        let bert_config: Config =
            serde_json::from_str(&config_content).map_err(|e| EmbeddingError::ModelLoadFailed {
                reason: format!("Failed to parse config.json: {e}"),
            })?;
        let hidden_size = bert_config.hidden_size;

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[config.weights_path()], DTYPE, device)?
        };
        let model = if vb.contains_tensor("bert.embeddings.word_embeddings.weight") {
            BertModel::load(vb.pp("bert"), &bert_config)
        } else {
            BertModel::load(vb, &bert_config)
        }
        .map_err(|e| EmbeddingError::ModelLoadFailed {
            reason: format!("Failed to load BERT weights: {e}"),
        })?;

        let mut tokenizer = Tokenizer::from_file(config.tokenizer_path()).map_err(|e| {
            EmbeddingError::TokenizationFailed {
                reason: format!("Failed to load tokenizer: {e}"),
            }
        })?;
        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length: config.max_seq_len,
                ..Default::default()
            }))
            .map_err(|e| EmbeddingError::TokenizationFailed {
                reason: format!("Failed to configure truncation: {e}"),
            })?;

        Ok((model, tokenizer, hidden_size))
    }

    /// Generates an L2-normalized embedding for a single text.
    pub fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        match &self.backend {
            EncoderBackend::Model {
                model,
                tokenizer,
                device,
                hidden_size,
            } => Self::embed_with_model(text, model, tokenizer, device, *hidden_size),
            EncoderBackend::Stub => Ok(self.embed_stub(text)),
        }
    }

    /// Computes the cosine similarity between two texts.
    ///
    /// With a loaded model this is the cosine of the two embeddings; in stub
    /// mode it is a deterministic lexical-overlap placeholder, so related
    /// texts still score higher than unrelated ones.
    pub fn similarity(&self, first: &str, second: &str) -> Result<f32, EmbeddingError> {
        match &self.backend {
            EncoderBackend::Model { .. } => {
                let a = self.embed(first)?;
                let b = self.embed(second)?;
                Ok(super::cosine_similarity(&a, &b))
            }
            EncoderBackend::Stub => Ok(placeholder_similarity(first, second)),
        }
    }

    fn embed_with_model(
        text: &str,
        model: &BertModel,
        tokenizer: &Tokenizer,
        device: &Device,
        hidden_size: usize,
    ) -> Result<Vec<f32>, EmbeddingError> {
        let encoding =
            tokenizer
                .encode(text, true)
                .map_err(|e| EmbeddingError::TokenizationFailed {
                    reason: e.to_string(),
                })?;

        let ids = encoding.get_ids();
        if ids.is_empty() {
            return Ok(vec![0.0; hidden_size]);
        }

        debug!(
            text_len = text.len(),
            token_count = ids.len(),
            "Generating embedding"
        );

        let input_ids = Tensor::new(ids, device)?.unsqueeze(0)?;
        let type_ids = Tensor::new(encoding.get_type_ids(), device)?.unsqueeze(0)?;
        let attention_mask = Tensor::new(encoding.get_attention_mask(), device)?.unsqueeze(0)?;

        // [1, seq, hidden]
        let hidden = model.forward(&input_ids, &type_ids, Some(&attention_mask))?;

        // Mean pooling over non-padding positions.
        let mask = attention_mask.to_dtype(DType::F32)?.unsqueeze(2)?;
        let summed = hidden.broadcast_mul(&mask)?.sum(1)?;
        // ids are non-empty, so at least one position is attended
        let counts = mask.sum(1)?;
        let mean = summed.broadcast_div(&counts)?;

        let embedding = mean.squeeze(0)?.to_vec1::<f32>()?;
        Ok(normalize_l2(embedding))
    }

    fn embed_stub(&self, text: &str) -> Vec<f32> {
        use std::hash::{DefaultHasher, Hash, Hasher};

        debug!(text_len = text.len(), "Generating stub embedding");

        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let seed = hasher.finish();

        let mut embedding = Vec::with_capacity(crate::constants::STUB_EMBEDDING_DIM);
        let mut state = seed;

        for _ in 0..crate::constants::STUB_EMBEDDING_DIM {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            let value = ((state >> 32) as f32 / u32::MAX as f32) * 2.0 - 1.0;
            embedding.push(value);
        }

        normalize_l2(embedding)
    }

    /// Returns the encoder's display name.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Returns `true` if running in stub mode.
    pub fn is_stub(&self) -> bool {
        matches!(self.backend, EncoderBackend::Stub)
    }

    /// Returns `true` if a model is loaded.
    pub fn has_model(&self) -> bool {
        matches!(self.backend, EncoderBackend::Model { .. })
    }

    /// Returns the encoder configuration.
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }
}

fn normalize_l2(mut embedding: Vec<f32>) -> Vec<f32> {
    let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm > 0.0 {
        for x in &mut embedding {
            *x /= norm;
        }
    }

    embedding
}

/// Deterministic stub-mode similarity: content-word recall and jaccard,
/// squashed through a sigmoid so scores spread over (0, 1).
fn placeholder_similarity(first: &str, second: &str) -> f32 {
    use std::collections::HashSet;

    let lexicon = Lexicon::shared();
    let content_words = |text: &str| -> HashSet<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty() && !lexicon.is_stopword(w))
            .map(str::to_string)
            .collect()
    };

    let first_words = content_words(first);
    let second_words = content_words(second);

    if first_words.is_empty() {
        let len_ratio = (first.len().min(second.len()) as f32)
            / (first.len().max(second.len()).max(1) as f32);
        return len_ratio * 0.3;
    }

    let matches = first_words.intersection(&second_words).count();
    let recall = matches as f32 / first_words.len() as f32;

    let union = first_words.union(&second_words).count();
    let jaccard = if union > 0 {
        matches as f32 / union as f32
    } else {
        0.0
    };

    let base_score = 0.6 * recall + 0.4 * jaccard;
    let normalized = 1.0 / (1.0 + (-8.0 * (base_score - 0.5)).exp());

    normalized.clamp(0.0, 1.0)
}
