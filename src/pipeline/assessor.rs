use super::record::AssessmentRecord;
use crate::assess::{
    LlmRetryManager, RetryDiagnostics, ScoreNormalizer, Thresholds, classify, no_usable_homepage,
    scoring_failure,
};
use crate::candidate::Candidate;
use crate::config::Config;
use crate::crawl::{BoundedHomepageCrawler, HomepageStatus};
use crate::enrich::{EuropePmcLookup, PublicationLookup, enrich_candidate};
use crate::error::CuratorError;
use crate::llm::{Generator, create_generator};
use crate::observability::{Observer, ObserverEvent, Stage};
use std::sync::Arc;
use std::time::Instant;

/// Crawl, enrich, score and decide for one candidate at a time. Shared
/// read-only between workers.
pub struct CandidatePipeline {
    run_id: String,
    crawler: BoundedHomepageCrawler,
    lookup: Option<Arc<dyn PublicationLookup>>,
    max_publications: usize,
    scorer: LlmRetryManager,
    normalizer: ScoreNormalizer,
    thresholds: Thresholds,
    require_homepage: bool,
    observer: Arc<dyn Observer>,
}

impl CandidatePipeline {
    pub fn new(
        run_id: impl Into<String>,
        config: &Config,
        crawler: BoundedHomepageCrawler,
        generator: Arc<dyn Generator>,
        observer: Arc<dyn Observer>,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            crawler,
            lookup: None,
            max_publications: config.enrichment.europe_pmc.max_publications,
            scorer: LlmRetryManager::new(generator, &config.llm),
            normalizer: ScoreNormalizer::new(config.scoring.doc_weights),
            thresholds: Thresholds::from_config(&config.scoring),
            require_homepage: config.scoring.require_homepage,
            observer,
        }
    }

    #[must_use]
    pub fn with_lookup(mut self, lookup: Arc<dyn PublicationLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    /// Production wiring: reqwest crawler, Europe PMC (when enabled) and
    /// the Ollama generator. `offline` disables both crawling and lookups.
    pub fn from_config(
        run_id: impl Into<String>,
        config: &Config,
        offline: bool,
        observer: Arc<dyn Observer>,
    ) -> Result<Self, CuratorError> {
        let mut crawl = config.crawl.clone();
        crawl.enabled = crawl.enabled && !offline;
        let crawler = BoundedHomepageCrawler::from_config(&crawl)?;
        let generator: Arc<dyn Generator> = Arc::from(create_generator(&config.llm));

        let pipeline = Self::new(run_id, config, crawler, generator, observer);
        if config.enrichment.europe_pmc.enabled && !offline {
            let lookup = EuropePmcLookup::new(&config.enrichment.europe_pmc);
            Ok(pipeline.with_lookup(Arc::new(lookup)))
        } else {
            Ok(pipeline)
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    fn stage_finished(&self, stage: Stage, started: Instant, errors: usize) {
        self.observer.record_event(&ObserverEvent::StageFinished {
            stage,
            duration: started.elapsed(),
            errors,
        });
    }

    /// Never fails: every problem ends up on the returned record.
    pub async fn assess(&self, mut candidate: Candidate) -> AssessmentRecord {
        let started = Instant::now();
        let evidence = self.crawler.crawl(&mut candidate).await;
        if evidence.homepage_status != HomepageStatus::Skipped {
            self.stage_finished(Stage::Crawl, started, evidence.metrics.errors.len());
        }
        if evidence.homepage_scraped {
            self.observer.record_event(&ObserverEvent::HomepageScraped);
        }

        if self.require_homepage && !evidence.has_usable_homepage() {
            tracing::info!(
                candidate = %candidate.key(),
                status = %evidence.homepage_status,
                "no usable homepage, skipping model"
            );
            return self.finish(AssessmentRecord::unscored(
                &self.run_id,
                &candidate,
                evidence,
                no_usable_homepage(),
                RetryDiagnostics::default(),
            ));
        }

        if let Some(lookup) = &self.lookup
            && !candidate.publication_identifiers().is_empty()
        {
            let started = Instant::now();
            let summary =
                enrich_candidate(lookup.as_ref(), &mut candidate, self.max_publications).await;
            self.stage_finished(Stage::Enrich, started, usize::from(summary.records == 0));
        }

        let started = Instant::now();
        let run = self.scorer.run(&candidate, &evidence).await;
        let record = match run.result {
            Ok(payload) => {
                self.stage_finished(Stage::Score, started, 0);
                let normalized = self.normalizer.normalize(&payload, &candidate);
                let decision =
                    classify(&normalized.scores, &normalized.subscores, &self.thresholds);
                AssessmentRecord::unscored(
                    &self.run_id,
                    &candidate,
                    evidence,
                    decision,
                    run.diagnostics,
                )
                .with_assessment(normalized)
            }
            Err(error) => {
                self.stage_finished(Stage::Score, started, 1);
                AssessmentRecord::unscored(
                    &self.run_id,
                    &candidate,
                    evidence,
                    scoring_failure(&error),
                    run.diagnostics,
                )
                .with_error(&error)
            }
        };
        self.finish(record)
    }

    fn finish(&self, record: AssessmentRecord) -> AssessmentRecord {
        self.observer.record_event(&ObserverEvent::CandidateFinished {
            candidate: record.candidate_id.clone(),
            decision: record.decision.kind,
            scoring_failed: record.scoring_failed(),
        });
        record
    }
}
