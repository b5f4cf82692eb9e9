use serde::{Deserialize, Serialize};

pub const MAX_CONCURRENCY: usize = 64;

fn default_concurrency() -> usize {
    8
}

fn default_cancel_grace_secs() -> u64 {
    5
}

fn default_output_dir() -> String {
    "out".into()
}

fn default_log_level() -> String {
    "info".into()
}

/// Worker pool and output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Candidates processed at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// How long in-flight candidates may keep running after cancellation.
    #[serde(default = "default_cancel_grace_secs")]
    pub cancel_grace_secs: u64,

    /// Directory receiving `assessment.jsonl` and `summary.json`.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            cancel_grace_secs: default_cancel_grace_secs(),
            output_dir: default_output_dir(),
        }
    }
}

impl PipelineConfig {
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.concurrency == 0 || self.concurrency > MAX_CONCURRENCY {
            errors.push(format!(
                "pipeline.concurrency must be in 1..={MAX_CONCURRENCY}, got {}",
                self.concurrency
            ));
        }
        if self.output_dir.trim().is_empty() {
            errors.push("pipeline.output_dir cannot be empty".to_string());
        }
        errors
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// `trace`, `debug`, `info`, `warn` or `error`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ObservabilityConfig {
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        match self.log_level.to_ascii_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Vec::new(),
            other => vec![format!("observability.log_level is not a level: {other}")],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concurrency_bounds() {
        let mut cfg = PipelineConfig::default();
        assert!(cfg.validate().is_empty());
        cfg.concurrency = 0;
        assert_eq!(cfg.validate().len(), 1);
        cfg.concurrency = MAX_CONCURRENCY + 1;
        assert_eq!(cfg.validate().len(), 1);
        cfg.concurrency = MAX_CONCURRENCY;
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn log_level_is_case_insensitive() {
        let cfg = ObservabilityConfig {
            log_level: "DEBUG".into(),
        };
        assert!(cfg.validate().is_empty());
        let cfg = ObservabilityConfig {
            log_level: "verbose".into(),
        };
        assert_eq!(cfg.validate().len(), 1);
    }
}
