mod crawl;
mod enrichment;
mod llm;
mod pipeline;
mod scoring;

pub use crawl::{
    CrawlConfig, DEFAULT_MAX_BYTES, DEFAULT_MAX_FRAME_DEPTH, DEFAULT_MAX_FRAME_FETCHES,
};
pub use enrichment::{EnrichmentConfig, EuropePmcConfig};
pub use llm::LlmConfig;
pub use pipeline::{MAX_CONCURRENCY, ObservabilityConfig, PipelineConfig};
pub use scoring::{DocWeights, ScoringConfig};

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Path the configuration was read from - not serialized
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    #[serde(default)]
    pub crawl: CrawlConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub enrichment: EnrichmentConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Check every section and report all problems at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();
        problems.extend(self.crawl.validate());
        problems.extend(self.llm.validate());
        problems.extend(self.scoring.validate());
        problems.extend(self.enrichment.validate());
        problems.extend(self.pipeline.validate());
        problems.extend(self.observability.validate());

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(problems))
        }
    }
}
