use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_BYTES: usize = 2_000_000;
pub const DEFAULT_MAX_FRAME_FETCHES: usize = 5;
pub const DEFAULT_MAX_FRAME_DEPTH: usize = 2;

fn default_enabled() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    8
}

fn default_max_bytes() -> usize {
    DEFAULT_MAX_BYTES
}

fn default_max_frame_fetches() -> usize {
    DEFAULT_MAX_FRAME_FETCHES
}

fn default_max_frame_depth() -> usize {
    DEFAULT_MAX_FRAME_DEPTH
}

fn default_user_agent() -> String {
    format!(
        "biotools-curator/{} (+https://bio.tools)",
        env!("CARGO_PKG_VERSION")
    )
}

/// Homepage crawl limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Skip crawling entirely when false; candidates keep their input URLs.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Per-request timeout, applied to the homepage and every frame.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Body size ceiling in bytes.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Maximum number of frame fetches per candidate (the homepage itself is
    /// not counted).
    #[serde(default = "default_max_frame_fetches")]
    pub max_frame_fetches: usize,

    /// Deepest frame nesting level that may be fetched. Frames embedded in
    /// the homepage are depth 1.
    #[serde(default = "default_max_frame_depth")]
    pub max_frame_depth: usize,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            timeout_secs: default_timeout_secs(),
            max_bytes: default_max_bytes(),
            max_frame_fetches: default_max_frame_fetches(),
            max_frame_depth: default_max_frame_depth(),
            user_agent: default_user_agent(),
        }
    }
}

impl CrawlConfig {
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.timeout_secs == 0 {
            errors.push("crawl.timeout_secs must be > 0".to_string());
        }
        if self.max_bytes == 0 {
            errors.push("crawl.max_bytes must be > 0".to_string());
        }
        if self.user_agent.trim().is_empty() {
            errors.push("crawl.user_agent cannot be empty".to_string());
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_limits() {
        let cfg = CrawlConfig::default();
        assert!(cfg.enabled);
        assert_eq!(cfg.timeout_secs, 8);
        assert_eq!(cfg.max_bytes, 2_000_000);
        assert_eq!(cfg.max_frame_fetches, 5);
        assert_eq!(cfg.max_frame_depth, 2);
        assert!(cfg.user_agent.starts_with("biotools-curator/"));
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn zero_limits_are_rejected() {
        let cfg = CrawlConfig {
            timeout_secs: 0,
            max_bytes: 0,
            ..CrawlConfig::default()
        };
        let errors = cfg.validate();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn zero_frame_budget_is_allowed() {
        let cfg = CrawlConfig {
            max_frame_fetches: 0,
            max_frame_depth: 0,
            ..CrawlConfig::default()
        };
        assert!(cfg.validate().is_empty());
    }
}
