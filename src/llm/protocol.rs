//! Wire types for the model-serving endpoint.
//!
//! The endpoint exposes a model listing at `/api/tags` and a generation
//! call at `/api/generate` returning a JSON body with a `response` field.

use serde::{Deserialize, Serialize};

/// Generation request body.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub stream: bool,
    pub options: GenerateOptions,
}

/// Sampling options for the generation call.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GenerateOptions {
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        // low temperature keeps grading output consistent across calls
        Self {
            temperature: 0.3,
            top_p: 0.9,
            max_tokens: 1000,
        }
    }
}

/// Generation response body.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub response: String,
}

/// Model listing response body.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelList {
    #[serde(default)]
    pub models: Vec<ModelEntry>,
}

/// One entry of the model listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelEntry {
    pub name: String,
}
