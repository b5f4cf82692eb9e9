use crate::support::model_response;
use biotools_curator::assess::{DecisionKind, ScoreNormalizer, Thresholds, classify};
use biotools_curator::candidate::Candidate;
use biotools_curator::config::DocWeights;

fn decide(bio: [f64; 5], doc: [f64; 5]) -> (DecisionKind, Vec<String>) {
    let payload = model_response(bio, doc, &[]);
    let payload = payload.as_object().unwrap().clone();
    let normalized = ScoreNormalizer::new(DocWeights::default())
        .normalize(&payload, &Candidate::default());
    let decision = classify(
        &normalized.scores,
        &normalized.subscores,
        &Thresholds::default(),
    );
    (decision.kind, decision.reasons)
}

#[test]
fn strong_candidate_is_added() {
    let (kind, reasons) = decide([1.0; 5], [1.0; 5]);
    assert_eq!(kind, DecisionKind::Add);
    assert_eq!(reasons, vec!["meets_score_thresholds"]);
}

#[test]
fn weak_bio_score_is_not_added() {
    let (kind, reasons) = decide([0.5, 0.5, 0.5, 0.5, 0.5], [1.0; 5]);
    assert_eq!(kind, DecisionKind::DoNotAdd);
    assert!(reasons.contains(&"bio_score_below_threshold".to_string()));
}

#[test]
fn no_execution_path_goes_to_review() {
    // A4 = 0 and B2 = 0: nothing shows how to run the tool.
    let (kind, reasons) = decide([1.0, 1.0, 1.0, 0.0, 1.0], [1.0, 0.0, 1.0, 1.0, 1.0]);
    assert_eq!(kind, DecisionKind::Review);
    assert!(reasons.contains(&"execution_path_missing".to_string()));
}

#[test]
fn missing_reproducibility_anchor_goes_to_review() {
    let (kind, reasons) = decide([1.0; 5], [1.0, 1.0, 0.0, 1.0, 1.0]);
    assert_eq!(kind, DecisionKind::Review);
    assert_eq!(reasons, vec!["reproducibility_anchor_missing"]);
}

#[test]
fn a4_alone_satisfies_execution_path() {
    let (kind, reasons) = decide([1.0; 5], [1.0, 0.0, 1.0, 1.0, 1.0]);
    assert_eq!(kind, DecisionKind::Add);
    assert!(reasons.contains(&"execution_path_via_a4".to_string()));
}
