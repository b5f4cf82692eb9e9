use serde::{Deserialize, Serialize};

fn default_min_bio_score() -> f64 {
    0.6
}

fn default_min_documentation_score() -> f64 {
    0.6
}

/// Acceptance thresholds and documentation weighting policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_min_bio_score")]
    pub min_bio_score: f64,

    #[serde(default = "default_min_documentation_score")]
    pub min_documentation_score: f64,

    #[serde(default)]
    pub doc_weights: DocWeights,

    /// Record candidates without a usable homepage as `do_not_add` without
    /// calling the model.
    #[serde(default)]
    pub require_homepage: bool,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            min_bio_score: default_min_bio_score(),
            min_documentation_score: default_min_documentation_score(),
            doc_weights: DocWeights::default(),
            require_homepage: false,
        }
    }
}

/// Weights for `doc_score_v2`. Policy, never model output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DocWeights {
    #[serde(rename = "B1")]
    pub b1: f64,
    #[serde(rename = "B2")]
    pub b2: f64,
    #[serde(rename = "B3")]
    pub b3: f64,
    #[serde(rename = "B4")]
    pub b4: f64,
    #[serde(rename = "B5")]
    pub b5: f64,
}

impl Default for DocWeights {
    fn default() -> Self {
        Self {
            b1: 2.0,
            b2: 1.0,
            b3: 1.0,
            b4: 1.0,
            b5: 2.0,
        }
    }
}

impl DocWeights {
    /// Weights in `B1..B5` order.
    pub fn as_array(&self) -> [f64; 5] {
        [self.b1, self.b2, self.b3, self.b4, self.b5]
    }

    pub fn total(&self) -> f64 {
        self.as_array().iter().sum()
    }
}

impl ScoringConfig {
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        for (label, value) in [
            ("min_bio_score", self.min_bio_score),
            ("min_documentation_score", self.min_documentation_score),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                errors.push(format!("scoring.{label} must be in [0, 1], got {value}"));
            }
        }

        let weights = self.doc_weights.as_array();
        for (idx, weight) in weights.iter().enumerate() {
            if !weight.is_finite() || *weight < 0.0 {
                errors.push(format!(
                    "scoring.doc_weights.B{} must be a finite non-negative number, got {weight}",
                    idx + 1
                ));
            }
        }
        if weights.iter().all(|w| w.is_finite()) && self.doc_weights.total() <= 0.0 {
            errors.push("scoring.doc_weights must sum to a positive value".to_string());
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_favour_completeness_and_onboarding() {
        let weights = DocWeights::default();
        assert_eq!(weights.as_array(), [2.0, 1.0, 1.0, 1.0, 2.0]);
        assert!((weights.total() - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn weights_deserialize_from_rubric_keys() {
        let cfg: ScoringConfig = toml::from_str(
            r"
            min_bio_score = 0.5
            [doc_weights]
            B1 = 1.0
            B2 = 1.0
            B3 = 1.0
            B4 = 1.0
            B5 = 1.0
            ",
        )
        .unwrap();
        assert!((cfg.min_bio_score - 0.5).abs() < f64::EPSILON);
        assert!((cfg.min_documentation_score - 0.6).abs() < f64::EPSILON);
        assert!((cfg.doc_weights.total() - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_out_of_range_thresholds() {
        let cfg = ScoringConfig {
            min_bio_score: 1.5,
            min_documentation_score: -0.1,
            ..ScoringConfig::default()
        };
        assert_eq!(cfg.validate().len(), 2);
    }

    #[test]
    fn rejects_malformed_weights() {
        let cfg = ScoringConfig {
            doc_weights: DocWeights {
                b1: -1.0,
                b2: f64::NAN,
                b3: 0.0,
                b4: 0.0,
                b5: 0.0,
            },
            ..ScoringConfig::default()
        };
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.contains("B1")));
        assert!(errors.iter().any(|e| e.contains("B2")));
    }

    #[test]
    fn rejects_all_zero_weights() {
        let cfg = ScoringConfig {
            doc_weights: DocWeights {
                b1: 0.0,
                b2: 0.0,
                b3: 0.0,
                b4: 0.0,
                b5: 0.0,
            },
            ..ScoringConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            vec!["scoring.doc_weights must sum to a positive value".to_string()]
        );
    }
}
