use super::assessor::CandidatePipeline;
use super::record::AssessmentRecord;
use super::report::ReportSink;
use crate::candidate::Candidate;
use crate::error::ReportError;
use crate::observability::{Observer, ObserverEvent};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub concurrency: usize,
    /// Time in-flight candidates get to finish once cancellation fires.
    pub cancel_grace: Duration,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            concurrency: 8,
            cancel_grace: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOutcome {
    pub records_written: usize,
    pub cancelled: bool,
    /// Never started because cancellation came first.
    pub not_started: usize,
    /// Aborted after the grace period, or panicked.
    pub abandoned: usize,
}

/// Assess `candidates` with at most `options.concurrency` in flight and
/// write each record to `sink` as it completes.
///
/// Only this loop touches the sink, so rows are never interleaved.
pub async fn run_candidates(
    pipeline: Arc<CandidatePipeline>,
    candidates: Vec<Candidate>,
    sink: &mut dyn ReportSink,
    options: RunOptions,
    cancel: CancellationToken,
    observer: Arc<dyn Observer>,
) -> Result<RunOutcome, ReportError> {
    let started = Instant::now();
    let concurrency = options.concurrency.max(1);
    observer.record_event(&ObserverEvent::RunStart {
        candidates: candidates.len(),
        concurrency,
    });

    let semaphore = Arc::new(Semaphore::new(concurrency));
    let mut join_set: JoinSet<Option<AssessmentRecord>> = JoinSet::new();
    for candidate in candidates {
        let semaphore = Arc::clone(&semaphore);
        let pipeline = Arc::clone(&pipeline);
        let cancel = cancel.clone();
        join_set.spawn(async move {
            let _permit = tokio::select! {
                biased;
                () = cancel.cancelled() => return None,
                permit = semaphore.acquire_owned() => permit.ok()?,
            };
            Some(pipeline.assess(candidate).await)
        });
    }

    let deadline = async {
        cancel.cancelled().await;
        tokio::time::sleep(options.cancel_grace).await;
    };
    tokio::pin!(deadline);

    let mut outcome = RunOutcome::default();
    let mut cancel_seen = false;
    let mut aborted = false;
    loop {
        tokio::select! {
            joined = join_set.join_next() => {
                let Some(joined) = joined else { break };
                match joined {
                    Ok(Some(record)) => {
                        sink.write_record(&record).await?;
                        outcome.records_written += 1;
                    }
                    Ok(None) => outcome.not_started += 1,
                    Err(e) if e.is_cancelled() => outcome.abandoned += 1,
                    Err(e) => {
                        tracing::error!(error = %e, "candidate task panicked");
                        outcome.abandoned += 1;
                    }
                }
            }
            () = cancel.cancelled(), if !cancel_seen => {
                cancel_seen = true;
                let pending = join_set.len();
                tracing::warn!(
                    pending,
                    grace_secs = options.cancel_grace.as_secs_f64(),
                    "cancellation requested, letting in-flight candidates finish"
                );
                observer.record_event(&ObserverEvent::Cancelled { pending });
            }
            () = &mut deadline, if !aborted => {
                aborted = true;
                tracing::warn!(pending = join_set.len(), "grace period elapsed, aborting");
                join_set.abort_all();
            }
        }
    }

    outcome.cancelled = cancel.is_cancelled();
    observer.record_event(&ObserverEvent::RunEnd {
        duration: started.elapsed(),
    });
    Ok(outcome)
}
