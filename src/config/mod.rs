mod env_overrides;
mod loader;
pub mod schema;
#[cfg(test)]
mod test_env;

pub use loader::{CONFIG_ENV_VAR, expand_path};
pub use schema::{
    Config, CrawlConfig, DocWeights, EnrichmentConfig, EuropePmcConfig, LlmConfig,
    MAX_CONCURRENCY, ObservabilityConfig, PipelineConfig, ScoringConfig,
};
