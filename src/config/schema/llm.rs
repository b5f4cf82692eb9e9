use serde::{Deserialize, Serialize};
use url::Url;

fn default_host() -> String {
    "http://localhost:11434".into()
}

fn default_model() -> String {
    "llama3.2".into()
}

fn default_temperature() -> f64 {
    0.01
}

fn default_max_attempts() -> u32 {
    3
}

fn default_transport_retries() -> u32 {
    2
}

fn default_backoff_ms() -> u64 {
    500
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_strict_schema() -> bool {
    true
}

/// Language-model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of the Ollama server.
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Generations per candidate, including schema-repair retries.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Transport-level retries for a single generation.
    #[serde(default = "default_transport_retries")]
    pub transport_retries: u32,

    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// When false only unparseable output counts as a violation and the
    /// normalizer's coercion handles odd shapes.
    #[serde(default = "default_strict_schema")]
    pub strict_schema: bool,

    /// Replacement for the built-in scoring prompt. Uses the same
    /// `{placeholder}` names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_template: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            model: default_model(),
            temperature: default_temperature(),
            max_attempts: default_max_attempts(),
            transport_retries: default_transport_retries(),
            backoff_ms: default_backoff_ms(),
            timeout_secs: default_timeout_secs(),
            strict_schema: default_strict_schema(),
            prompt_template: None,
        }
    }
}

impl LlmConfig {
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        match Url::parse(&self.host) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => errors.push(format!("llm.host is not a valid http(s) URL: {}", self.host)),
        }
        if self.model.trim().is_empty() {
            errors.push("llm.model cannot be empty".to_string());
        }
        if !self.temperature.is_finite() || !(0.0..=2.0).contains(&self.temperature) {
            errors.push("llm.temperature must be in [0.0, 2.0]".to_string());
        }
        if self.max_attempts == 0 {
            errors.push("llm.max_attempts must be >= 1".to_string());
        }
        if self.timeout_secs == 0 {
            errors.push("llm.timeout_secs must be > 0".to_string());
        }
        errors
    }
}
