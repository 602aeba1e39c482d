//! Cross-cutting, shared default constants.
//!
//! These are the documented defaults behind [`EvaluatorConfig`](crate::config::EvaluatorConfig).
//! They are empirically chosen calibration values, not algorithmic invariants;
//! override them through configuration rather than editing them here.

/// Default maximum marks a question is graded out of.
pub const DEFAULT_MAX_MARKS: f32 = 10.0;

/// Default aggregation weights: length, semantic blend, keyword, concept.
pub const DEFAULT_WEIGHTS: (f32, f32, f32, f32) = (0.15, 0.45, 0.25, 0.15);

/// Default blend between the primary and refinement embedding scores.
pub const DEFAULT_SEMANTIC_BLEND: (f32, f32) = (0.6, 0.4);

/// Primary similarity below this marks an answer irrelevant.
pub const DEFAULT_IRRELEVANCE_THRESHOLD: f32 = 0.2;

/// Student answers shorter than this fraction of the reference enter the
/// sub-linear length-penalty zone.
pub const DEFAULT_MIN_LENGTH_RATIO: f32 = 0.5;

/// Pre-filter similarity threshold for the remote pipeline.
pub const DEFAULT_FILTER_THRESHOLD: f32 = 0.3;

/// Similarity threshold for the standalone quality filter.
pub const DEFAULT_QUALITY_THRESHOLD: f32 = 0.6;

/// Concept coherence below this marks an answer incoherent.
pub const COHERENCE_FLOOR: f32 = 0.3;

/// Contradiction likelihood above this marks an answer incoherent.
pub const CONTRADICTION_CEILING: f32 = 0.7;

/// Neutral contradiction likelihood used when no refinement model is loaded.
pub const NEUTRAL_CONTRADICTION: f32 = 0.3;

/// Concept tokens considered per text by the irrelevance gate.
pub const MAX_CONCEPT_TOKENS: usize = 16;

/// Reference keywords selected by the lexical scorer.
pub const REFERENCE_KEYWORD_COUNT: usize = 10;

/// Length-penalty bands: model scores for answers shorter than the ratio
/// percentage (of the reference length) are capped at the cap percentage.
pub const DEFAULT_PENALTY_BANDS: [(f32, f32); 3] = [(5.0, 30.0), (15.0, 50.0), (25.0, 70.0)];

/// Default model-serving endpoint.
pub const DEFAULT_ENDPOINT_URL: &str = "http://localhost:11434";

/// Default remote model identifier.
pub const DEFAULT_REMOTE_MODEL: &str = "llama2:latest";

/// Default remote call attempts.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default remote call timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Upper bound on a single backoff sleep between remote attempts.
pub const MAX_BACKOFF_SECS: u64 = 30;

/// Default primary sentence-encoder artifact directory name.
pub const DEFAULT_PRIMARY_MODEL: &str = "all-MiniLM-L12-v2";

/// Default refinement sentence-encoder artifact directory name.
pub const DEFAULT_REFINEMENT_MODEL: &str = "all-MiniLM-L6-v2";

/// Default max tokens fed to a sentence encoder.
pub const DEFAULT_MAX_SEQ_LEN: usize = 384;

/// Embedding dimension used by the deterministic stub backend.
pub const STUB_EMBEDDING_DIM: usize = 768;
