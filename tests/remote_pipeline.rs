//! End-to-end tests of the remote grading pipeline against a mock
//! model-serving endpoint.

use std::sync::Arc;
use std::time::{Duration, Instant};

use httpmock::Method::{GET, POST};
use httpmock::MockServer;
use serde_json::json;

use rubric::{Evaluator, EvaluatorConfig, GradingRequest, ModelSet, RemoteEvaluator, Status};

const STUDENT: &str =
    "Photosynthesis is how plants make food using sunlight, water, and carbon dioxide.";
const REFERENCE: &str = "Photosynthesis is the process by which plants convert light energy into \
     chemical energy, using carbon dioxide and water to produce glucose and oxygen.";

fn remote_config(server: &MockServer) -> EvaluatorConfig {
    EvaluatorConfig {
        endpoint_url: server.base_url(),
        max_retries: 1,
        timeout: Duration::from_secs(5),
        ..EvaluatorConfig::stub()
    }
}

fn stub_models(config: &EvaluatorConfig) -> Arc<ModelSet> {
    Arc::new(ModelSet::load(config).expect("stub models"))
}

fn mock_tags(server: &MockServer, names: &[&str]) {
    let models: Vec<_> = names.iter().map(|n| json!({ "name": n })).collect();
    server.mock(|when, then| {
        when.method(GET).path("/api/tags");
        then.status(200).json_body(json!({ "models": models }));
    });
}

fn mock_generate<'a>(server: &'a MockServer, response: &str) -> httpmock::Mock<'a> {
    let body = json!({ "response": response });
    server.mock(move |when, then| {
        when.method(POST).path("/api/generate");
        then.status(200).json_body(body);
    })
}

fn connect(server: &MockServer) -> RemoteEvaluator {
    let config = remote_config(server);
    let models = stub_models(&config);
    RemoteEvaluator::connect(&config, Some(models))
}

#[test]
fn parses_percentage_score() {
    let server = MockServer::start();
    mock_tags(&server, &["llama2:latest"]);
    mock_generate(&server, "Score: 85%\nReason: solid conceptual coverage");

    let evaluator = connect(&server);
    assert!(evaluator.is_available());

    let result = evaluator.evaluate(&GradingRequest::new(STUDENT, REFERENCE));

    assert_eq!(result.status, Status::Ok);
    assert!((result.final_score - 8.5).abs() < 1e-4, "score = {}", result.final_score);
    assert_eq!(result.explanation, "solid conceptual coverage");

    let breakdown = result.breakdown.remote().expect("remote breakdown");
    assert_eq!(breakdown.model_name, "llama2:latest");
    assert!(breakdown.filter_passed);
    assert!(breakdown.raw_response.as_deref().unwrap().contains("85%"));
    assert!(!breakdown.timestamp.is_empty());
}

#[test]
fn zero_score_keeps_model_reason() {
    let server = MockServer::start();
    mock_tags(&server, &["llama2:latest"]);
    mock_generate(&server, "Score: 0%\nReason: unrelated");

    let evaluator = connect(&server);
    let result = evaluator.evaluate(&GradingRequest::new(STUDENT, REFERENCE));

    assert_eq!(result.status, Status::Ok);
    assert_eq!(result.final_score, 0.0);
    assert!(result.explanation.contains("unrelated"));
}

#[test]
fn brevity_caps_model_score() {
    let server = MockServer::start();
    mock_tags(&server, &["llama2:latest"]);
    mock_generate(&server, "Score: 95%\nReason: great");

    // student is ~2% of the reference length, so the 30% cap applies
    let long_reference = REFERENCE.repeat(5);
    let evaluator = connect(&server);
    let result = evaluator.evaluate(&GradingRequest::new("photosynthesis", long_reference));

    assert_eq!(result.status, Status::Ok);
    assert!((result.final_score - 3.0).abs() < 1e-4, "score = {}", result.final_score);
    assert!(result.explanation.contains("Length penalty applied"));
}

#[test]
fn unparseable_response_fails_closed() {
    let server = MockServer::start();
    mock_tags(&server, &["llama2:latest"]);
    mock_generate(&server, "The answer demonstrates partial understanding.");

    let evaluator = connect(&server);
    let result = evaluator.evaluate(&GradingRequest::new(STUDENT, REFERENCE));

    assert_eq!(result.final_score, 0.0);
    assert_eq!(result.status, Status::Error);
    assert!(result.explanation.contains("parse"));
    // the raw response is retained for auditing
    let breakdown = result.breakdown.remote().expect("remote breakdown");
    assert!(breakdown.raw_response.is_some());
}

#[test]
fn irrelevant_answer_is_filtered_before_the_call() {
    let server = MockServer::start();
    mock_tags(&server, &["llama2:latest"]);
    let generate = mock_generate(&server, "Score: 50%\nReason: should never be called");

    let evaluator = connect(&server);
    let result = evaluator.evaluate(&GradingRequest::new(
        "quantum mechanics wave functions",
        "mitochondria produce cellular energy",
    ));

    assert_eq!(result.status, Status::Filtered);
    assert_eq!(result.final_score, 0.0);
    assert_eq!(result.explanation, "Irrelevant answer");
    assert_eq!(generate.hits(), 0);

    let breakdown = result.breakdown.remote().expect("remote breakdown");
    assert!(!breakdown.filter_passed);
    assert!(breakdown.filter_score < 0.3);
}

#[test]
fn empty_answer_skips_the_call() {
    let server = MockServer::start();
    mock_tags(&server, &["llama2:latest"]);
    let generate = mock_generate(&server, "Score: 50%\nReason: unused");

    let evaluator = connect(&server);
    let result = evaluator.evaluate(&GradingRequest::new("   ", REFERENCE));

    assert_eq!(result.status, Status::Empty);
    assert_eq!(result.final_score, 0.0);
    assert_eq!(generate.hits(), 0);
}

#[test]
fn missing_model_substitutes_first_available() {
    let server = MockServer::start();
    mock_tags(&server, &["mistral:7b", "phi3:mini"]);
    let generate = server.mock(|when, then| {
        when.method(POST)
            .path("/api/generate")
            .json_body_partial(r#"{ "model": "mistral:7b" }"#);
        then.status(200)
            .json_body(json!({ "response": "Score: 70%\nReason: decent" }));
    });

    let evaluator = connect(&server);
    assert!(evaluator.is_available());
    assert_eq!(evaluator.model_name(), "mistral:7b");

    let result = evaluator.evaluate(&GradingRequest::new(STUDENT, REFERENCE));
    assert_eq!(result.status, Status::Ok);
    assert!((result.final_score - 7.0).abs() < 1e-4);
    assert_eq!(generate.hits(), 1);
}

#[test]
fn empty_model_listing_marks_evaluator_unavailable() {
    let server = MockServer::start();
    mock_tags(&server, &[]);
    let generate = mock_generate(&server, "Score: 50%\nReason: unused");

    let evaluator = connect(&server);
    assert!(!evaluator.is_available());

    let result = evaluator.evaluate(&GradingRequest::new(STUDENT, REFERENCE));
    assert_eq!(result.status, Status::Error);
    assert_eq!(result.final_score, 0.0);
    assert!(result.explanation.contains("not available"));
    assert_eq!(generate.hits(), 0);
}

#[test]
fn unreachable_endpoint_marks_evaluator_unavailable() {
    let server = MockServer::start();
    // no /api/tags mock: the connectivity check gets a 404
    let generate = mock_generate(&server, "Score: 50%\nReason: unused");

    let evaluator = connect(&server);
    assert!(!evaluator.is_available());

    // every call errors without a network attempt
    for _ in 0..3 {
        let result = evaluator.evaluate(&GradingRequest::new(STUDENT, REFERENCE));
        assert_eq!(result.status, Status::Error);
    }
    assert_eq!(generate.hits(), 0);
}

#[test]
fn transport_failures_exhaust_retries_without_panicking() {
    let server = MockServer::start();
    mock_tags(&server, &["llama2:latest"]);
    let generate = server.mock(|when, then| {
        when.method(POST).path("/api/generate");
        then.status(500);
    });

    let config = EvaluatorConfig {
        max_retries: 3,
        ..remote_config(&server)
    };
    let models = stub_models(&config);
    let evaluator = RemoteEvaluator::connect(&config, Some(models));

    let result = evaluator.evaluate(&GradingRequest::new(STUDENT, REFERENCE));

    assert_eq!(result.status, Status::Error);
    assert_eq!(result.final_score, 0.0);
    assert_eq!(generate.hits(), 3);
}

#[test]
fn deadline_aborts_remaining_retries() {
    let server = MockServer::start();
    mock_tags(&server, &["llama2:latest"]);
    let generate = server.mock(|when, then| {
        when.method(POST).path("/api/generate");
        then.status(500);
    });

    let config = EvaluatorConfig {
        max_retries: 3,
        ..remote_config(&server)
    };
    let models = stub_models(&config);
    let evaluator = RemoteEvaluator::connect(&config, Some(models));

    let result =
        evaluator.evaluate_with_deadline(&GradingRequest::new(STUDENT, REFERENCE), Instant::now());

    assert_eq!(result.status, Status::Error);
    // the first attempt ran; backoff would cross the deadline, so no retry
    assert_eq!(generate.hits(), 1);
}

#[test]
fn runs_unfiltered_without_local_models() {
    let server = MockServer::start();
    mock_tags(&server, &["llama2:latest"]);
    let generate = mock_generate(&server, "Score: 40%\nReason: weak but related");

    let config = remote_config(&server);
    let evaluator = RemoteEvaluator::connect(&config, None);

    // an answer the pre-filter would have rejected still reaches the model
    let result = evaluator.evaluate(&GradingRequest::new(
        "quantum mechanics wave functions and also some longer padding text here",
        "mitochondria produce cellular energy for the cell using oxygen",
    ));

    assert_eq!(result.status, Status::Ok);
    assert!((result.final_score - 4.0).abs() < 1e-4);
    assert_eq!(generate.hits(), 1);

    let breakdown = result.breakdown.remote().expect("remote breakdown");
    assert!(breakdown.filter_passed);
    assert_eq!(breakdown.filter_score, 0.0);
}

#[test]
fn model_info_reports_status() {
    let server = MockServer::start();
    mock_tags(&server, &["llama2:latest"]);

    let evaluator = connect(&server);
    let info = evaluator.model_info();

    assert_eq!(info.model_name, "llama2:latest");
    assert!(info.is_available);
    assert_eq!(info.max_retries, 1);
    assert_eq!(info.endpoint_url, server.base_url());
}
