//! Schema-repair loop around a [`Generator`].
//!
//! ```text
//! Draft -> Generated -> Validated -> Success
//!                           |
//!                           +-> Augmented -> Generated -> ...
//!                           +-> Exhausted
//! ```
//!
//! Generation is the only I/O; every other edge is the pure
//! [`RetryMachine::step`].

use super::prompt::PromptBuilder;
use super::schema::{SchemaValidator, parse_failure_violation};
use super::types::{AttemptViolations, RetryDiagnostics};
use crate::candidate::Candidate;
use crate::config::LlmConfig;
use crate::crawl::EvidenceBundle;
use crate::error::ScoringError;
use crate::llm::{Generator, parse_model_output};
use serde_json::{Map, Value};
use std::sync::Arc;

pub type Payload = Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub enum RetryState {
    /// Base prompt, nothing generated yet.
    Draft { prompt: String },
    Generated {
        attempt: u32,
        prompt: String,
        response: String,
    },
    /// `payload` is `None` when the response could not be parsed; that
    /// case always carries a violation.
    Validated {
        attempt: u32,
        prompt: String,
        response: String,
        payload: Option<Payload>,
        violations: Vec<String>,
    },
    /// Repair prompt for the next `attempt`.
    Augmented { attempt: u32, prompt: String },
    Success { attempt: u32, payload: Payload },
    Exhausted { attempts: u32 },
}

impl RetryState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success { .. } | Self::Exhausted { .. })
    }

    /// Prompt to send next, with its 1-based attempt number, when the state
    /// is waiting on the generator.
    pub fn pending_generation(&self) -> Option<(u32, &str)> {
        match self {
            Self::Draft { prompt } => Some((1, prompt)),
            Self::Augmented { attempt, prompt } => Some((*attempt, prompt)),
            _ => None,
        }
    }
}

/// The non-I/O half of the loop.
#[derive(Debug, Clone)]
pub struct RetryMachine {
    builder: PromptBuilder,
    validator: SchemaValidator,
    max_attempts: u32,
}

impl RetryMachine {
    pub fn new(builder: PromptBuilder, validator: SchemaValidator, max_attempts: u32) -> Self {
        Self {
            builder,
            validator,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn builder(&self) -> &PromptBuilder {
        &self.builder
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Advance one edge. States that wait on the generator and terminal
    /// states come back unchanged.
    pub fn step(&self, state: RetryState, diagnostics: &mut RetryDiagnostics) -> RetryState {
        match state {
            RetryState::Generated {
                attempt,
                prompt,
                response,
            } => {
                diagnostics.attempts = attempt;
                let (payload, violations) = match parse_model_output(&response) {
                    Ok(payload) => {
                        let violations = self.validator.validate(&payload);
                        (Some(payload), violations)
                    }
                    Err(detail) => (None, vec![parse_failure_violation(&detail)]),
                };
                RetryState::Validated {
                    attempt,
                    prompt,
                    response,
                    payload,
                    violations,
                }
            }
            RetryState::Validated {
                attempt,
                payload: Some(payload),
                violations,
                ..
            } if violations.is_empty() => RetryState::Success { attempt, payload },
            RetryState::Validated {
                attempt,
                prompt,
                response,
                violations,
                ..
            } => {
                let augmented = (attempt < self.max_attempts)
                    .then(|| self.builder.augment(&prompt, &violations, Some(&response)));
                diagnostics.schema_errors.push(AttemptViolations {
                    attempt,
                    violations,
                });
                match augmented {
                    Some(prompt) => {
                        diagnostics.prompt_augmented = true;
                        RetryState::Augmented {
                            attempt: attempt + 1,
                            prompt,
                        }
                    }
                    None => RetryState::Exhausted { attempts: attempt },
                }
            }
            other => other,
        }
    }
}

/// Outcome of [`LlmRetryManager::run`]. Diagnostics are kept on failure too.
#[derive(Debug)]
pub struct RetryRun {
    pub result: Result<Payload, ScoringError>,
    pub diagnostics: RetryDiagnostics,
}

pub struct LlmRetryManager {
    generator: Arc<dyn Generator>,
    model: String,
    machine: RetryMachine,
}

impl LlmRetryManager {
    pub fn new(generator: Arc<dyn Generator>, config: &LlmConfig) -> Self {
        let machine = RetryMachine::new(
            PromptBuilder::new(config.prompt_template.as_deref()),
            SchemaValidator::new(config.strict_schema),
            config.max_attempts,
        );
        Self::with_machine(generator, config.model.clone(), machine)
    }

    pub fn with_machine(
        generator: Arc<dyn Generator>,
        model: impl Into<String>,
        machine: RetryMachine,
    ) -> Self {
        Self {
            generator,
            model: model.into(),
            machine,
        }
    }

    pub async fn run(&self, candidate: &Candidate, evidence: &EvidenceBundle) -> RetryRun {
        let mut diagnostics = RetryDiagnostics::default();
        let mut state = RetryState::Draft {
            prompt: self.machine.builder().build(candidate, evidence),
        };

        loop {
            if let Some((attempt, prompt)) = state.pending_generation() {
                tracing::debug!(
                    candidate = %candidate.key(),
                    attempt,
                    max_attempts = self.machine.max_attempts(),
                    "requesting assessment"
                );
                let prompt = prompt.to_string();
                match self.generator.generate(&prompt, &self.model).await {
                    Ok(response) => {
                        state = RetryState::Generated {
                            attempt,
                            prompt,
                            response,
                        };
                    }
                    Err(source) => {
                        diagnostics.attempts = attempt;
                        tracing::warn!(
                            candidate = %candidate.key(),
                            attempt,
                            error = %source,
                            "generation failed"
                        );
                        return RetryRun {
                            result: Err(ScoringError::Generation { attempt, source }),
                            diagnostics,
                        };
                    }
                }
                continue;
            }

            let next = self.machine.step(state, &mut diagnostics);
            if let RetryState::Validated {
                attempt,
                violations,
                ..
            } = &next
                && !violations.is_empty()
            {
                tracing::debug!(
                    candidate = %candidate.key(),
                    attempt,
                    violations = ?violations,
                    "response failed validation"
                );
            }

            state = match next {
                RetryState::Success { attempt, payload } => {
                    if attempt > 1 {
                        tracing::info!(candidate = %candidate.key(), attempt, "schema repaired");
                    }
                    return RetryRun {
                        result: Ok(payload),
                        diagnostics,
                    };
                }
                RetryState::Exhausted { attempts } => {
                    tracing::warn!(
                        candidate = %candidate.key(),
                        attempts,
                        "schema violations persisted, giving up"
                    );
                    return RetryRun {
                        result: Err(ScoringError::SchemaExhausted { attempts }),
                        diagnostics,
                    };
                }
                other => other,
            };
        }
    }
}
