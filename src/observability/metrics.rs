use super::traits::{Observer, ObserverEvent, Stage};
use crate::assess::DecisionKind;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Durations and error counts for one stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StageStats {
    pub count: u64,
    pub errors: u64,
    pub total_ms: u64,
    pub max_ms: u64,
}

impl StageStats {
    fn record(&mut self, duration: Duration, errors: usize) {
        let ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self.count += 1;
        self.errors += errors as u64;
        self.total_ms = self.total_ms.saturating_add(ms);
        self.max_ms = self.max_ms.max(ms);
    }

    pub fn mean_ms(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total_ms as f64 / self.count as f64
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub candidates: u64,
    pub add: u64,
    pub review: u64,
    pub do_not_add: u64,
    pub scoring_failed: u64,
    pub homepage_scraped: u64,
    pub cancelled: bool,
    pub stages: BTreeMap<String, StageStats>,
}

/// Aggregating observer behind the run summary.
#[derive(Default)]
pub struct RunMetrics {
    inner: Mutex<MetricsSnapshot>,
}

impl RunMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// One-line digest logged at the end of a run.
    pub fn log_summary(&self) {
        let snapshot = self.snapshot();
        tracing::info!(
            candidates = snapshot.candidates,
            add = snapshot.add,
            review = snapshot.review,
            do_not_add = snapshot.do_not_add,
            scoring_failed = snapshot.scoring_failed,
            homepage_scraped = snapshot.homepage_scraped,
            "run summary"
        );
        for (stage, stats) in &snapshot.stages {
            tracing::info!(
                stage = %stage,
                count = stats.count,
                errors = stats.errors,
                mean_ms = stats.mean_ms(),
                max_ms = stats.max_ms,
                "stage summary"
            );
        }
    }
}

impl Observer for RunMetrics {
    fn record_event(&self, event: &ObserverEvent) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        match event {
            ObserverEvent::StageFinished {
                stage,
                duration,
                errors,
            } => {
                inner
                    .stages
                    .entry(stage.to_string())
                    .or_default()
                    .record(*duration, *errors);
            }
            ObserverEvent::HomepageScraped => inner.homepage_scraped += 1,
            ObserverEvent::CandidateFinished {
                decision,
                scoring_failed,
                ..
            } => {
                inner.candidates += 1;
                match decision {
                    DecisionKind::Add => inner.add += 1,
                    DecisionKind::Review => inner.review += 1,
                    DecisionKind::DoNotAdd => inner.do_not_add += 1,
                }
                if *scoring_failed {
                    inner.scoring_failed += 1;
                }
            }
            ObserverEvent::Cancelled { .. } => inner.cancelled = true,
            ObserverEvent::RunStart { .. } | ObserverEvent::RunEnd { .. } => {}
        }
    }

    fn name(&self) -> &str {
        "metrics"
    }
}
