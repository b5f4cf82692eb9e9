use super::types::{Decision, DecisionKind, RubricSubscores, ScoreBreakdown, Subscore};
use crate::config::ScoringConfig;
use crate::error::ScoringError;

/// Tolerance for comparing means against configured thresholds.
const EPSILON: f64 = 1e-9;

pub const REASON_MEETS_THRESHOLDS: &str = "meets_score_thresholds";
pub const REASON_EXECUTION_PATH_MISSING: &str = "execution_path_missing";
pub const REASON_REPRODUCIBILITY_MISSING: &str = "reproducibility_anchor_missing";
pub const REASON_EXECUTION_VIA_A4: &str = "execution_path_via_a4";
pub const REASON_BIO_BELOW: &str = "bio_score_below_threshold";
pub const REASON_DOC_BELOW: &str = "documentation_score_below_threshold";
pub const REASON_SCHEMA_EXHAUSTED: &str = "llm_schema_exhausted";
pub const REASON_GENERATION_FAILED: &str = "llm_generation_failed";
pub const REASON_NO_HOMEPAGE: &str = "no_usable_homepage";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub min_bio: f64,
    pub min_documentation: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::from_config(&ScoringConfig::default())
    }
}

impl Thresholds {
    pub fn from_config(config: &ScoringConfig) -> Self {
        Self {
            min_bio: config.min_bio_score,
            min_documentation: config.min_documentation_score,
        }
    }
}

fn at_least(value: f64, threshold: f64) -> bool {
    value + EPSILON >= threshold
}

/// Decide from scores alone. Pure: equal inputs give equal decisions.
pub fn classify(
    scores: &ScoreBreakdown,
    subscores: &RubricSubscores,
    thresholds: &Thresholds,
) -> Decision {
    let bio_ok = at_least(scores.bio_score, thresholds.min_bio);
    let doc_ok = at_least(scores.documentation_score, thresholds.min_documentation);

    if !(bio_ok && doc_ok) {
        let mut reasons = Vec::new();
        if !bio_ok {
            reasons.push(REASON_BIO_BELOW);
        }
        if !doc_ok {
            reasons.push(REASON_DOC_BELOW);
        }
        return Decision::new(DecisionKind::DoNotAdd, &reasons);
    }

    let b2_ok = subscores.b2() >= Subscore::Half;
    let a4_full = subscores.a4() == Subscore::Full;
    let b3_ok = subscores.b3() >= Subscore::Half;

    let mut gate_failures = Vec::new();
    if !(b2_ok || a4_full) {
        gate_failures.push(REASON_EXECUTION_PATH_MISSING);
    }
    if !b3_ok {
        gate_failures.push(REASON_REPRODUCIBILITY_MISSING);
    }
    if !gate_failures.is_empty() {
        return Decision::new(DecisionKind::Review, &gate_failures);
    }

    let mut reasons = vec![REASON_MEETS_THRESHOLDS];
    if !b2_ok {
        reasons.push(REASON_EXECUTION_VIA_A4);
    }
    Decision::new(DecisionKind::Add, &reasons)
}

/// Decision for a candidate whose scoring never produced valid output.
pub fn scoring_failure(error: &ScoringError) -> Decision {
    let reason = match error {
        ScoringError::SchemaExhausted { .. } => REASON_SCHEMA_EXHAUSTED,
        ScoringError::Generation { .. } => REASON_GENERATION_FAILED,
    };
    Decision::new(DecisionKind::Review, &[reason])
}

pub fn no_usable_homepage() -> Decision {
    Decision::new(DecisionKind::DoNotAdd, &[REASON_NO_HOMEPAGE])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;

    fn scores(bio: f64, doc: f64) -> ScoreBreakdown {
        ScoreBreakdown {
            bio_score: bio,
            documentation_score: doc,
            doc_score_v2: doc,
            confidence: 1.0,
        }
    }

    fn subscores(a4: Subscore, b2: Subscore, b3: Subscore) -> RubricSubscores {
        let mut s = RubricSubscores::default();
        s.bio[3] = a4;
        s.documentation[1] = b2;
        s.documentation[2] = b3;
        s
    }

    #[test]
    fn missing_reproducibility_anchor_forces_review() {
        let decision = classify(
            &scores(0.9, 0.8),
            &subscores(Subscore::Zero, Subscore::Full, Subscore::Zero),
            &Thresholds::default(),
        );
        assert_eq!(decision.kind, DecisionKind::Review);
        assert_eq!(decision.reasons, vec![REASON_REPRODUCIBILITY_MISSING]);
    }

    #[test]
    fn a4_substitutes_for_execution_path() {
        let decision = classify(
            &scores(0.7, 0.65),
            &subscores(Subscore::Full, Subscore::Zero, Subscore::Half),
            &Thresholds::default(),
        );
        assert_eq!(decision.kind, DecisionKind::Add);
        assert_eq!(
            decision.reasons,
            vec![REASON_MEETS_THRESHOLDS, REASON_EXECUTION_VIA_A4]
        );
    }

    #[test]
    fn half_a4_does_not_substitute() {
        let decision = classify(
            &scores(0.7, 0.65),
            &subscores(Subscore::Half, Subscore::Zero, Subscore::Half),
            &Thresholds::default(),
        );
        assert_eq!(decision.kind, DecisionKind::Review);
        assert_eq!(decision.reasons, vec![REASON_EXECUTION_PATH_MISSING]);
    }

    #[test]
    fn below_thresholds_is_do_not_add_with_every_reason() {
        let decision = classify(
            &scores(0.4, 0.2),
            &subscores(Subscore::Full, Subscore::Full, Subscore::Full),
            &Thresholds::default(),
        );
        assert_eq!(decision.kind, DecisionKind::DoNotAdd);
        assert_eq!(decision.reasons, vec![REASON_BIO_BELOW, REASON_DOC_BELOW]);
    }

    #[test]
    fn threshold_is_inclusive_despite_float_noise() {
        // 0.3 - 0.1 lands just under 0.2 in binary floating point.
        let decision = classify(
            &scores(0.3 - 0.1, 0.6),
            &subscores(Subscore::Zero, Subscore::Full, Subscore::Full),
            &Thresholds {
                min_bio: 0.2,
                min_documentation: 0.6,
            },
        );
        assert_eq!(decision.kind, DecisionKind::Add);
        assert_eq!(decision.reasons, vec![REASON_MEETS_THRESHOLDS]);
    }

    #[test]
    fn classify_is_idempotent() {
        let inputs = (
            scores(0.8, 0.6),
            subscores(Subscore::Half, Subscore::Zero, Subscore::Half),
            Thresholds {
                min_bio: 0.5,
                min_documentation: 0.5,
            },
        );
        let first = classify(&inputs.0, &inputs.1, &inputs.2);
        for _ in 0..10 {
            assert_eq!(classify(&inputs.0, &inputs.1, &inputs.2), first);
        }
    }

    #[test]
    fn scoring_failures_are_review_not_add() {
        let exhausted = scoring_failure(&ScoringError::SchemaExhausted { attempts: 3 });
        assert_eq!(exhausted.kind, DecisionKind::Review);
        assert_eq!(exhausted.reasons, vec![REASON_SCHEMA_EXHAUSTED]);

        let failed = scoring_failure(&ScoringError::Generation {
            attempt: 1,
            source: LlmError::Cancelled,
        });
        assert_eq!(failed.reasons, vec![REASON_GENERATION_FAILED]);
        assert_eq!(no_usable_homepage().kind, DecisionKind::DoNotAdd);
    }
}
