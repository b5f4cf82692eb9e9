use crate::assess::DecisionKind;
use std::time::Duration;

/// Pipeline stages that are timed per candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    Crawl,
    Enrich,
    Score,
}

/// Events the observer can record
#[derive(Debug, Clone)]
pub enum ObserverEvent {
    RunStart {
        candidates: usize,
        concurrency: usize,
    },
    StageFinished {
        stage: Stage,
        duration: Duration,
        /// Evidence errors for crawls, 0/1 for the other stages.
        errors: usize,
    },
    HomepageScraped,
    CandidateFinished {
        candidate: String,
        decision: DecisionKind,
        scoring_failed: bool,
    },
    Cancelled {
        pending: usize,
    },
    RunEnd {
        duration: Duration,
    },
}

/// Observability sink. Implementations must be cheap: events arrive from
/// every worker.
pub trait Observer: Send + Sync {
    fn record_event(&self, event: &ObserverEvent);

    fn name(&self) -> &str;
}
