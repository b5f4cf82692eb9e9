use super::traits::{Observer, ObserverEvent};
use tracing::{debug, info, warn};

/// Log-based observer: every event becomes a tracing line.
pub struct LogObserver;

impl LogObserver {
    pub fn new() -> Self {
        Self
    }
}

fn millis(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl Observer for LogObserver {
    fn record_event(&self, event: &ObserverEvent) {
        match event {
            ObserverEvent::RunStart {
                candidates,
                concurrency,
            } => {
                info!(candidates, concurrency, "run.start");
            }
            ObserverEvent::StageFinished {
                stage,
                duration,
                errors,
            } => {
                debug!(stage = %stage, duration_ms = millis(*duration), errors, "stage.finished");
            }
            ObserverEvent::HomepageScraped => {
                debug!("homepage.scraped");
            }
            ObserverEvent::CandidateFinished {
                candidate,
                decision,
                scoring_failed,
            } => {
                info!(candidate = %candidate, decision = %decision, scoring_failed, "candidate.finished");
            }
            ObserverEvent::Cancelled { pending } => {
                warn!(pending, "run.cancelled");
            }
            ObserverEvent::RunEnd { duration } => {
                info!(duration_ms = millis(*duration), "run.end");
            }
        }
    }

    fn name(&self) -> &str {
        "log"
    }
}
