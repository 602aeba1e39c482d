//! The remote LLM-backed grading pipeline.
//!
//! Per request: pre-filter on local similarity, build a deterministic
//! prompt, call the model-serving endpoint with bounded retry and
//! exponential backoff, parse the free-text response into a score, and
//! apply a deterministic length-penalty override. Score-producing failures
//! here are fail-closed: a response that cannot be verified scores zero.

mod error;
/// Response parsing.
pub mod parse;
/// Prompt construction.
pub mod prompt;
/// Endpoint wire types.
pub mod protocol;


pub use error::LlmError;

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::EvaluatorConfig;
use crate::constants::MAX_BACKOFF_SECS;
use crate::embedding::ModelSet;
use crate::evaluator::{
    Breakdown, Evaluator, GradingRequest, GradingResult, RemoteBreakdown, Status,
};

use parse::parse_response;
use prompt::build_prompt;
use protocol::{GenerateOptions, GenerateRequest, GenerateResponse, ModelList};

/// Remote evaluator status and configuration snapshot.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RemoteInfo {
    pub endpoint_url: String,
    pub model_name: String,
    pub is_available: bool,
    pub max_retries: u32,
    pub timeout_secs: u64,
}

/// Grades answers through an external model-serving endpoint.
pub struct RemoteEvaluator {
    client: Client,
    endpoint_url: String,
    model_name: String,
    available: bool,
    max_retries: u32,
    filter_threshold: f32,
    penalty_bands: Vec<(f32, f32)>,
    timeout: Duration,
    models: Option<Arc<ModelSet>>,
}

impl std::fmt::Debug for RemoteEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteEvaluator")
            .field("endpoint_url", &self.endpoint_url)
            .field("model_name", &self.model_name)
            .field("available", &self.available)
            .field("max_retries", &self.max_retries)
            .field("has_filter", &self.models.is_some())
            .finish()
    }
}

impl RemoteEvaluator {
    /// Connects to the endpoint and resolves the model to use.
    ///
    /// The connectivity check queries the endpoint's model listing: a
    /// missing configured model is substituted with the first available
    /// one; an unreachable endpoint or empty listing marks the evaluator
    /// permanently unavailable (every call then returns an error result
    /// without a network attempt). `models` backs the optional pre-filter;
    /// pass `None` to grade unfiltered.
    pub fn connect(config: &EvaluatorConfig, models: Option<Arc<ModelSet>>) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        let endpoint_url = config.endpoint_url.trim_end_matches('/').to_string();
        let (model_name, available) =
            Self::resolve_model(&client, &endpoint_url, &config.remote_model);

        if models.is_none() {
            warn!("No local models for pre-filtering; remote pipeline runs unfiltered");
        }

        Self {
            client,
            endpoint_url,
            model_name,
            available,
            max_retries: config.max_retries.max(1),
            filter_threshold: config.thresholds.filter,
            penalty_bands: config.penalty_bands.clone(),
            timeout: config.timeout,
            models,
        }
    }

    fn resolve_model(client: &Client, endpoint_url: &str, requested: &str) -> (String, bool) {
        let url = format!("{endpoint_url}/api/tags");
        let listing = client
            .get(&url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<ModelList>());

        match listing {
            Ok(listing) => {
                let names: Vec<String> = listing.models.into_iter().map(|m| m.name).collect();
                if names.iter().any(|n| n == requested) {
                    info!(model = requested, "Remote evaluator ready");
                    (requested.to_string(), true)
                } else if let Some(first) = names.first() {
                    warn!(
                        requested,
                        substitute = %first,
                        "Configured model not found, using first available model"
                    );
                    (first.clone(), true)
                } else {
                    error!(endpoint = endpoint_url, "No models available at endpoint");
                    (requested.to_string(), false)
                }
            }
            Err(e) => {
                error!(endpoint = endpoint_url, error = %e, "Failed to reach endpoint");
                (requested.to_string(), false)
            }
        }
    }

    /// Returns `true` if the connectivity check succeeded.
    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Returns the resolved model identifier.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Returns a status and configuration snapshot.
    pub fn model_info(&self) -> RemoteInfo {
        RemoteInfo {
            endpoint_url: self.endpoint_url.clone(),
            model_name: self.model_name.clone(),
            is_available: self.available,
            max_retries: self.max_retries,
            timeout_secs: self.timeout.as_secs(),
        }
    }

    /// Grades a request, aborting remaining retries once `deadline` passes.
    pub fn evaluate_with_deadline(
        &self,
        request: &GradingRequest,
        deadline: Instant,
    ) -> GradingResult {
        self.grade(request, Some(deadline))
    }

    fn breakdown(
        &self,
        llm_score: f32,
        raw_response: Option<String>,
        filter_score: f32,
        filter_passed: bool,
    ) -> Breakdown {
        Breakdown::Remote(RemoteBreakdown {
            llm_score,
            model_name: self.model_name.clone(),
            raw_response,
            filter_score,
            filter_passed,
            timestamp: chrono::Utc::now().to_rfc3339(),
        })
    }

    fn grade(&self, request: &GradingRequest, deadline: Option<Instant>) -> GradingResult {
        if !self.available {
            return GradingResult {
                final_score: 0.0,
                status: Status::Error,
                breakdown: self.breakdown(0.0, None, 0.0, false),
                explanation: "System error: LLM not available".to_string(),
            };
        }

        if request.student_answer.trim().is_empty() {
            return GradingResult {
                final_score: 0.0,
                status: Status::Empty,
                breakdown: self.breakdown(0.0, None, 0.0, false),
                explanation: "No answer provided".to_string(),
            };
        }

        // Pre-filter: skip the expensive remote call for obviously
        // irrelevant answers. A filter-internal error proceeds unfiltered.
        let (filter_score, filter_passed) = match &self.models {
            Some(models) => {
                match models
                    .primary()
                    .similarity(&request.student_answer, &request.reference_answer)
                {
                    Ok(score) => (score, score >= self.filter_threshold),
                    Err(e) => {
                        warn!(error = %e, "Pre-filter failed, proceeding with LLM evaluation");
                        (0.0, true)
                    }
                }
            }
            None => (0.0, true),
        };
        if !filter_passed {
            debug!(
                filter_score,
                threshold = self.filter_threshold,
                "Answer rejected by pre-filter"
            );
            return GradingResult {
                final_score: 0.0,
                status: Status::Filtered,
                breakdown: self.breakdown(0.0, None, filter_score, false),
                explanation: "Irrelevant answer".to_string(),
            };
        }

        let prompt = build_prompt(
            request.question.as_deref(),
            &request.reference_answer,
            &request.student_answer,
        );

        let response = match self.call_with_retries(&prompt, deadline) {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "Remote evaluation failed");
                return GradingResult {
                    final_score: 0.0,
                    status: Status::Error,
                    breakdown: self.breakdown(0.0, None, filter_score, filter_passed),
                    explanation: format!("System error: Could not evaluate answer ({e})"),
                };
            }
        };

        let parsed = parse_response(&response, request.max_marks);
        let Some(llm_score) = parsed.score else {
            // fail-closed: unverified marks are never awarded
            return GradingResult {
                final_score: 0.0,
                status: Status::Error,
                breakdown: self.breakdown(0.0, Some(response), filter_score, filter_passed),
                explanation: "Could not parse a score from the model response".to_string(),
            };
        };

        let length_ratio = (request.student_answer.len() as f32
            / request.reference_answer.len().max(1) as f32)
            * 100.0;
        let penalized = apply_length_penalty(
            llm_score,
            length_ratio,
            request.max_marks,
            &self.penalty_bands,
        );

        let mut explanation = parsed.explanation;
        if penalized < llm_score {
            explanation = format!(
                "{explanation} (Length penalty applied: {length_ratio:.1}% of reference length)"
            );
        }

        let mut final_score = penalized;
        if !(0.0..=request.max_marks).contains(&final_score) {
            warn!(final_score, max_marks = request.max_marks, "Clamping out-of-range score");
            final_score = final_score.clamp(0.0, request.max_marks);
            explanation = format!("Score adjusted to valid range. {explanation}");
        }

        GradingResult {
            final_score,
            status: Status::Ok,
            breakdown: self.breakdown(final_score, Some(response), filter_score, filter_passed),
            explanation,
        }
    }

    /// Calls the generation endpoint, retrying transport failures and
    /// non-success statuses with exponential backoff. The backoff schedule
    /// is precomputed, so worst-case latency is `timeout × attempts` plus
    /// the schedule's sum. A successfully parsed response is never retried.
    fn call_with_retries(
        &self,
        prompt: &str,
        deadline: Option<Instant>,
    ) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.endpoint_url);
        let payload = GenerateRequest {
            model: &self.model_name,
            prompt,
            stream: false,
            options: GenerateOptions::default(),
        };

        let backoffs: Vec<Duration> = (0..self.max_retries.saturating_sub(1))
            .map(|n| {
                let secs = if n < 6 {
                    (1u64 << n).min(MAX_BACKOFF_SECS)
                } else {
                    MAX_BACKOFF_SECS
                };
                Duration::from_secs(secs)
            })
            .collect();

        let mut last_error = String::new();
        for attempt in 0..self.max_retries {
            if attempt > 0 {
                let backoff = backoffs[(attempt - 1) as usize];
                if let Some(deadline) = deadline {
                    if Instant::now() + backoff >= deadline {
                        return Err(LlmError::DeadlineExceeded { attempts: attempt });
                    }
                }
                std::thread::sleep(backoff);
            }

            match self.client.post(&url).json(&payload).send() {
                Ok(resp) if resp.status().is_success() => match resp.json::<GenerateResponse>() {
                    Ok(body) => return Ok(body.response.trim().to_string()),
                    Err(e) => {
                        warn!(attempt = attempt + 1, error = %e, "Malformed response body");
                        last_error = e.to_string();
                    }
                },
                Ok(resp) => {
                    warn!(attempt = attempt + 1, status = %resp.status(), "Non-success response");
                    last_error = format!("HTTP {}", resp.status());
                }
                Err(e) => {
                    warn!(attempt = attempt + 1, error = %e, "Request failed");
                    last_error = e.to_string();
                }
            }
        }

        Err(LlmError::RetriesExhausted {
            attempts: self.max_retries,
            last_error,
        })
    }
}

impl Evaluator for RemoteEvaluator {
    fn evaluate(&self, request: &GradingRequest) -> GradingResult {
        self.grade(request, None)
    }
}

/// Caps the model's score by the student answer's brevity.
///
/// `length_ratio` is the raw character-length ratio as a percentage. Bands
/// are `(ratio_percent, cap_percent)` in ascending ratio order; the first
/// band whose ratio exceeds the answer's sets the cap, and answers at or
/// above the last band are uncapped. Computed independently of the model's
/// own judgement.
pub fn apply_length_penalty(
    llm_score: f32,
    length_ratio: f32,
    max_marks: f32,
    bands: &[(f32, f32)],
) -> f32 {
    let llm_percentage = (llm_score / max_marks) * 100.0;

    let cap = bands
        .iter()
        .find(|(ratio, _)| length_ratio < *ratio)
        .map(|(_, cap)| *cap)
        .unwrap_or(100.0);

    let final_percentage = llm_percentage.min(cap);
    (final_percentage / 100.0) * max_marks
}
