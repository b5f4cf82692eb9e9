use crate::support::{model_response, ollama_body};
use biotools_curator::assess::{
    DecisionKind, LlmRetryManager, ScoreNormalizer, Subscore, Thresholds, classify,
    scoring_failure,
};
use biotools_curator::candidate::Candidate;
use biotools_curator::config::LlmConfig;
use biotools_curator::crawl::EvidenceBundle;
use biotools_curator::error::ScoringError;
use biotools_curator::llm::{Generator, OllamaGenerator};
use std::sync::Arc;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FULL: [f64; 5] = [1.0; 5];

fn candidate() -> Candidate {
    Candidate {
        id: "seqtool".into(),
        title: "SeqTool".into(),
        description: "Read aligner".into(),
        homepage: Some("https://seqtool.example".into()),
        ..Candidate::default()
    }
}

fn manager(server: &MockServer, max_attempts: u32) -> LlmRetryManager {
    let config = LlmConfig {
        host: server.uri(),
        max_attempts,
        ..LlmConfig::default()
    };
    let generator: Arc<dyn Generator> = Arc::new(OllamaGenerator::new(&config));
    LlmRetryManager::new(generator, &config)
}

#[tokio::test]
async fn missing_key_is_repaired_on_the_second_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_string_contains("SCHEMA REPAIR"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(ollama_body(&model_response(FULL, FULL, &[]))),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(ollama_body(&model_response(FULL, FULL, &["B4"]))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let candidate = candidate();
    let run = manager(&server, 3)
        .run(&candidate, &EvidenceBundle::skipped())
        .await;

    let payload = run.result.unwrap();
    assert_eq!(run.diagnostics.attempts, 2);
    assert!(run.diagnostics.prompt_augmented);
    assert_eq!(run.diagnostics.schema_errors.len(), 1);
    assert!(
        run.diagnostics.schema_errors[0]
            .violations
            .iter()
            .any(|v| v.contains("B4"))
    );

    let normalized = ScoreNormalizer::default().normalize(&payload, &candidate);
    assert_eq!(normalized.subscores.get("B4"), Some(Subscore::Full));
    assert_eq!(normalized.publication_ids, vec!["DOI:10.1000/seq.1"]);
    let decision = classify(
        &normalized.scores,
        &normalized.subscores,
        &Thresholds::default(),
    );
    assert_eq!(decision.kind, DecisionKind::Add);
}

#[tokio::test]
async fn prose_without_json_exhausts_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "response": "I think this tool is great.",
            "done": true
        })))
        .expect(2)
        .mount(&server)
        .await;

    let run = manager(&server, 2)
        .run(&candidate(), &EvidenceBundle::skipped())
        .await;

    let err = run.result.unwrap_err();
    assert!(matches!(err, ScoringError::SchemaExhausted { attempts: 2 }));
    assert_eq!(run.diagnostics.attempts, 2);
    assert_eq!(run.diagnostics.schema_errors.len(), 2);
    let decision = scoring_failure(&err);
    assert_eq!(decision.kind, DecisionKind::Review);
    assert_eq!(decision.reasons, vec!["llm_schema_exhausted"]);
}

#[tokio::test]
async fn missing_model_is_a_generation_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(404).set_body_string("model not found"))
        .mount(&server)
        .await;

    let run = manager(&server, 3)
        .run(&candidate(), &EvidenceBundle::skipped())
        .await;

    let err = run.result.unwrap_err();
    assert!(matches!(err, ScoringError::Generation { attempt: 1, .. }));
    assert_eq!(scoring_failure(&err).reasons, vec!["llm_generation_failed"]);
}
