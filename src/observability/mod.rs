pub mod log;
pub mod metrics;
pub mod traits;

pub use self::log::LogObserver;
pub use metrics::{MetricsSnapshot, RunMetrics, StageStats};
pub use traits::{Observer, ObserverEvent, Stage};

use crate::config::ObservabilityConfig;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Level from config; `verbose` forces `debug`.
pub fn resolve_level(config: &ObservabilityConfig, verbose: bool) -> Level {
    if verbose {
        return Level::DEBUG;
    }
    config.log_level.trim().parse().unwrap_or(Level::INFO)
}

/// Install the global fmt subscriber. Calling twice is harmless: the second
/// install is refused and reported.
pub fn init_tracing(config: &ObservabilityConfig, verbose: bool) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(resolve_level(config, verbose))
        .with_target(verbose)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: tracing subscriber already installed: {e}");
    }
}

/// Forwards every event to each observer in order.
pub struct FanoutObserver {
    observers: Vec<Arc<dyn Observer>>,
}

impl FanoutObserver {
    pub fn new(observers: Vec<Arc<dyn Observer>>) -> Self {
        Self { observers }
    }
}

impl Observer for FanoutObserver {
    fn record_event(&self, event: &ObserverEvent) {
        for observer in &self.observers {
            observer.record_event(event);
        }
    }

    fn name(&self) -> &str {
        "fanout"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_overrides_configured_level() {
        let cfg = ObservabilityConfig {
            log_level: "warn".into(),
        };
        assert_eq!(resolve_level(&cfg, false), Level::WARN);
        assert_eq!(resolve_level(&cfg, true), Level::DEBUG);
    }

    #[test]
    fn unknown_level_falls_back_to_info() {
        let cfg = ObservabilityConfig {
            log_level: "chatty".into(),
        };
        assert_eq!(resolve_level(&cfg, false), Level::INFO);
    }

    #[test]
    fn fanout_reaches_every_observer() {
        let first = Arc::new(RunMetrics::new());
        let second = Arc::new(RunMetrics::new());
        let observers: Vec<Arc<dyn Observer>> =
            vec![first.clone(), second.clone(), Arc::new(LogObserver)];
        let fanout = FanoutObserver::new(observers);
        fanout.record_event(&ObserverEvent::HomepageScraped);
        assert_eq!(first.snapshot().homepage_scraped, 1);
        assert_eq!(second.snapshot().homepage_scraped, 1);
        assert_eq!(fanout.name(), "fanout");
    }
}
