use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `biotools-curator`.
///
/// Only configuration and report errors are fatal for a run. Evidence and
/// schema problems are recorded on the assessment record instead of being
/// raised, so these variants mostly travel through the binary and the
/// pipeline runner.
#[derive(Debug, Error)]
pub enum CuratorError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Crawl ────────────────────────────────────────────────────────────
    #[error("crawl: {0}")]
    Crawl(#[from] CrawlError),

    // ── LLM ──────────────────────────────────────────────────────────────
    #[error("llm: {0}")]
    Llm(#[from] LlmError),

    // ── Scoring ──────────────────────────────────────────────────────────
    #[error("scoring: {0}")]
    Scoring(#[from] ScoringError),

    // ── Report ───────────────────────────────────────────────────────────
    #[error("report: {0}")]
    Report(#[from] ReportError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed:\n{}", format_problems(.0))]
    Validation(Vec<String>),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

fn format_problems(problems: &[String]) -> String {
    problems
        .iter()
        .map(|p| format!("  - {p}"))
        .collect::<Vec<_>>()
        .join("\n")
}

// ─── Crawl errors ────────────────────────────────────────────────────────────

/// Contract violations of the crawler. Network and content problems are
/// never reported through this type.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("invalid crawl configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to build http client: {0}")]
    Client(String),
}

// ─── LLM errors ──────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("generator {generator} request failed: {message}")]
    Request { generator: String, message: String },

    #[error("generator {generator} returned HTTP {status}: {message}")]
    Status {
        generator: String,
        status: u16,
        message: String,
    },

    #[error("generator {generator} timed out after {timeout_secs}s")]
    Timeout { generator: String, timeout_secs: u64 },

    #[error("generation cancelled")]
    Cancelled,
}

impl LlmError {
    /// Client errors other than 408/429 will not resolve by retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Status { status, .. } => {
                !((400..500).contains(status) && *status != 408 && *status != 429)
            }
            Self::Cancelled => false,
            Self::Request { .. } | Self::Timeout { .. } => true,
        }
    }
}

// ─── Scoring errors ──────────────────────────────────────────────────────────

/// Failures of the scoring step for one candidate. These never abort a run:
/// the pipeline turns them into a `review` decision.
#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("schema violations persisted after {attempts} attempts")]
    SchemaExhausted { attempts: u32 },

    #[error("generation failed on attempt {attempt}: {source}")]
    Generation {
        attempt: u32,
        #[source]
        source: LlmError,
    },
}

// ─── Report errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to serialize record for {candidate}: {source}")]
    Serialize {
        candidate: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
