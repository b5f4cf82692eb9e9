use super::record::AssessmentRecord;
use crate::error::ReportError;
use crate::observability::MetricsSnapshot;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};

pub const REPORT_FILE: &str = "assessment.jsonl";
pub const SUMMARY_FILE: &str = "summary.json";

/// Destination for finished records, written in completion order.
pub trait ReportSink: Send {
    fn write_record<'a>(
        &'a mut self,
        record: &'a AssessmentRecord,
    ) -> Pin<Box<dyn Future<Output = Result<(), ReportError>> + Send + 'a>>;
}

/// JSON Lines file. Each row is written whole and flushed before the next,
/// so an interrupted run leaves only complete lines behind.
pub struct JsonlReportSink {
    path: PathBuf,
    writer: BufWriter<File>,
    rows: usize,
}

impl JsonlReportSink {
    /// Create (truncating) `path`, making parent directories as needed.
    pub async fn create(path: &Path) -> Result<Self, ReportError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .await?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            rows: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    async fn write_inner(&mut self, record: &AssessmentRecord) -> Result<(), ReportError> {
        let mut line = serde_json::to_string(record).map_err(|source| ReportError::Serialize {
            candidate: record.candidate_id.clone(),
            source,
        })?;
        line.push('\n');
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.flush().await?;
        self.rows += 1;
        Ok(())
    }
}

impl ReportSink for JsonlReportSink {
    fn write_record<'a>(
        &'a mut self,
        record: &'a AssessmentRecord,
    ) -> Pin<Box<dyn Future<Output = Result<(), ReportError>> + Send + 'a>> {
        Box::pin(self.write_inner(record))
    }
}

/// Contents of `summary.json`.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub input: Option<String>,
    pub report: String,
    pub model: String,
    pub min_bio_score: f64,
    pub min_documentation_score: f64,
    pub candidates_total: usize,
    pub records_written: usize,
    pub cancelled: bool,
    /// Queued candidates skipped because cancellation came first.
    pub not_started: usize,
    /// In-flight candidates dropped when the grace period ran out.
    pub abandoned: usize,
    pub metrics: MetricsSnapshot,
}

pub async fn write_summary(path: &Path, summary: &RunSummary) -> Result<(), ReportError> {
    let json = serde_json::to_string_pretty(summary).map_err(|source| ReportError::Serialize {
        candidate: "summary".to_string(),
        source,
    })?;
    tokio::fs::write(path, json).await?;
    Ok(())
}
