use crate::config::{Config, MAX_CONCURRENCY};
use crate::pipeline::RunRequest;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// `biotools-curator` - evidence-gated scoring of bio.tools candidates.
#[derive(Parser, Debug)]
#[command(name = "biotools-curator")]
#[command(version)]
#[command(about = "Crawl, score and gate candidate bio.tools entries.", long_about = None)]
pub struct Cli {
    /// Configuration file (default: $BIOTOOLS_CURATOR_CONFIG or
    /// ~/.biotools-curator/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level regardless of configuration
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Assess a candidate file and write assessment.jsonl and summary.json
    Run(RunArgs),

    /// Print the resolved configuration as TOML
    Config,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Candidates as a JSON array or JSON Lines
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output directory (overrides [pipeline] output_dir)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Only assess the first N candidates
    #[arg(long)]
    pub limit: Option<usize>,

    /// Skip homepage crawling and publication lookups
    #[arg(long, alias = "no-crawl")]
    pub offline: bool,

    /// Candidates processed at once (overrides [pipeline] concurrency)
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..=MAX_CONCURRENCY as i64))]
    pub concurrency: Option<u16>,
}

impl RunArgs {
    /// Fold command-line overrides into `config`.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(concurrency) = self.concurrency {
            config.pipeline.concurrency = usize::from(concurrency);
        }
    }

    pub fn request(&self) -> RunRequest {
        RunRequest {
            input: self.input.clone(),
            output_dir: self.output_dir.clone(),
            limit: self.limit,
            offline: self.offline,
        }
    }
}
