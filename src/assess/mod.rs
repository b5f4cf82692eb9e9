pub mod gating;
pub mod normalize;
pub mod prompt;
pub mod retry;
pub mod schema;
pub mod types;

pub use gating::{Thresholds, classify, no_usable_homepage, scoring_failure};
pub use normalize::{NormalizedAssessment, ScoreNormalizer};
pub use prompt::PromptBuilder;
pub use retry::{LlmRetryManager, Payload, RetryMachine, RetryRun, RetryState};
pub use schema::SchemaValidator;
pub use types::{
    AttemptViolations, BIO_KEYS, DOC_KEYS, Decision, DecisionKind, RetryDiagnostics,
    RubricGroup, RubricSubscores, ScoreBreakdown, Subscore,
};
