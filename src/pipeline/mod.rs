//! Batch orchestration: per-candidate assessment, the bounded worker pool
//! and the JSON Lines report.

pub mod assessor;
pub mod record;
pub mod report;
pub mod runner;

pub use assessor::CandidatePipeline;
pub use record::AssessmentRecord;
pub use report::{
    JsonlReportSink, REPORT_FILE, ReportSink, RunSummary, SUMMARY_FILE, write_summary,
};
pub use runner::{RunOptions, RunOutcome, run_candidates};

use crate::candidate::load_candidates;
use crate::config::Config;
use crate::observability::{FanoutObserver, LogObserver, Observer, RunMetrics};
use anyhow::{Context, Result};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// One batch invocation.
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    pub input: PathBuf,
    /// Overrides `pipeline.output_dir`.
    pub output_dir: Option<PathBuf>,
    /// Only the first `limit` candidates.
    pub limit: Option<usize>,
    /// No homepage crawling and no publication lookups.
    pub offline: bool,
}

/// Load candidates, assess them and write `assessment.jsonl` plus
/// `summary.json` into the output directory.
pub async fn run(
    config: &Config,
    request: RunRequest,
    cancel: CancellationToken,
) -> Result<RunSummary> {
    let started_at = Utc::now();
    let started = Instant::now();
    let run_id = uuid::Uuid::new_v4().to_string();

    let mut candidates = load_candidates(&request.input)?;
    let candidates_total = candidates.len();
    if let Some(limit) = request.limit {
        candidates.truncate(limit);
    }

    let output_dir = request.output_dir.clone().unwrap_or_else(|| config.output_dir());
    tokio::fs::create_dir_all(&output_dir)
        .await
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;
    let report_path = output_dir.join(REPORT_FILE);
    let mut sink = JsonlReportSink::create(&report_path).await?;

    let metrics = Arc::new(RunMetrics::new());
    let observers: Vec<Arc<dyn Observer>> = vec![Arc::new(LogObserver::new()), metrics.clone()];
    let observer: Arc<dyn Observer> = Arc::new(FanoutObserver::new(observers));
    let pipeline =
        CandidatePipeline::from_config(run_id.clone(), config, request.offline, observer.clone())?;

    tracing::info!(
        run_id = %run_id,
        input = %request.input.display(),
        candidates = candidates.len(),
        report = %report_path.display(),
        model = %config.llm.model,
        offline = request.offline,
        "starting run"
    );

    let options = RunOptions {
        concurrency: config.pipeline.concurrency,
        cancel_grace: Duration::from_secs(config.pipeline.cancel_grace_secs),
    };
    let outcome = run_candidates(
        Arc::new(pipeline),
        candidates,
        &mut sink,
        options,
        cancel,
        observer,
    )
    .await?;

    let summary = RunSummary {
        run_id,
        started_at,
        finished_at: Utc::now(),
        duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        input: Some(request.input.display().to_string()),
        report: report_path.display().to_string(),
        model: config.llm.model.clone(),
        min_bio_score: config.scoring.min_bio_score,
        min_documentation_score: config.scoring.min_documentation_score,
        candidates_total,
        records_written: outcome.records_written,
        cancelled: outcome.cancelled,
        not_started: outcome.not_started,
        abandoned: outcome.abandoned,
        metrics: metrics.snapshot(),
    };
    write_summary(&output_dir.join(SUMMARY_FILE), &summary).await?;
    metrics.log_summary();
    Ok(summary)
}
