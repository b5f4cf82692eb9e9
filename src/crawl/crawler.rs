use super::extractor::{EvidenceExtractor, PageEvidence};
use super::fetcher::{FetchFailureKind, FetchLimits, FetchOutcome, Fetcher, HttpFetcher};
use super::limiter::{FrameCrawlLimiter, LimitReason};
use super::publication::is_probable_publication_url;
use super::types::{EvidenceBundle, HomepageStatus};
use crate::candidate::Candidate;
use crate::config::CrawlConfig;
use crate::error::CrawlError;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Instant;
use url::Url;

/// Fetches a candidate's homepage and its embedded frames under a fixed
/// budget and turns them into an [`EvidenceBundle`].
pub struct BoundedHomepageCrawler {
    fetcher: Arc<dyn Fetcher>,
    extractor: EvidenceExtractor,
    limits: FetchLimits,
    max_frame_fetches: usize,
    max_frame_depth: usize,
    enabled: bool,
}

/// Homepage document that passed the fetch and publication checks.
struct RootPage {
    url: String,
    final_url: String,
    evidence: PageEvidence,
    rejected: bool,
}

impl BoundedHomepageCrawler {
    /// Invalid limits are a contract violation and the only error this
    /// type ever returns.
    pub fn new(fetcher: Arc<dyn Fetcher>, config: &CrawlConfig) -> Result<Self, CrawlError> {
        let problems = config.validate();
        if !problems.is_empty() {
            return Err(CrawlError::InvalidConfig(problems.join("; ")));
        }
        Ok(Self {
            fetcher,
            extractor: EvidenceExtractor::new(),
            limits: FetchLimits::from_config(config),
            max_frame_fetches: config.max_frame_fetches,
            max_frame_depth: config.max_frame_depth,
            enabled: config.enabled,
        })
    }

    pub fn from_config(config: &CrawlConfig) -> Result<Self, CrawlError> {
        let fetcher = HttpFetcher::new(config)?;
        Self::new(Arc::new(fetcher), config)
    }

    /// Crawl and merge found documentation and repository links into the
    /// candidate. Never fails: problems end up in the bundle's metrics.
    pub async fn crawl(&self, candidate: &mut Candidate) -> EvidenceBundle {
        let started = Instant::now();
        let mut bundle = if self.enabled {
            self.crawl_inner(candidate).await
        } else {
            let mut skipped = EvidenceBundle::skipped();
            skipped.homepage_url = candidate
                .homepage_candidates()
                .into_iter()
                .find(|url| !is_probable_publication_url(url));
            skipped
        };
        bundle.metrics.elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        for url in &bundle.documentation_urls {
            candidate.add_documentation(url);
        }
        for url in &bundle.repository_urls {
            candidate.add_repository(url);
        }

        tracing::debug!(
            candidate = %candidate.key(),
            status = %bundle.homepage_status,
            fetches = bundle.metrics.fetch_attempts,
            docs = bundle.documentation_urls.len(),
            repos = bundle.repository_urls.len(),
            errors = bundle.metrics.errors.len(),
            "crawl finished"
        );
        bundle
    }

    async fn crawl_inner(&self, candidate: &mut Candidate) -> EvidenceBundle {
        let urls = candidate.homepage_candidates();
        let Some(first) = urls.first() else {
            let mut bundle = EvidenceBundle::new(HomepageStatus::Error);
            bundle.homepage_error = Some("missing_homepage".to_string());
            return bundle;
        };

        let mut bundle = EvidenceBundle::new(HomepageStatus::Error);
        let mut homepage = first.clone();
        let mut rejected = false;
        if is_probable_publication_url(&homepage) {
            match urls.iter().find(|url| !is_probable_publication_url(url)) {
                Some(alternative) => {
                    tracing::debug!(from = %homepage, to = %alternative, "replacing publication homepage");
                    homepage = alternative.clone();
                    bundle.homepage_substituted = true;
                }
                None => rejected = true,
            }
        }
        if !rejected {
            candidate.homepage = Some(homepage.clone());
        }

        let Some(root) = self
            .fetch_root(&urls, homepage, rejected, &mut bundle)
            .await
        else {
            return bundle;
        };
        if !root.rejected {
            candidate.homepage = Some(root.url.clone());
        }

        bundle.homepage_scraped = true;
        bundle.homepage_status = if root.rejected {
            HomepageStatus::RejectedPublication
        } else {
            HomepageStatus::Ok
        };
        bundle.homepage_error = root
            .rejected
            .then(|| "homepage is a publication page".to_string());
        merge_evidence(&mut bundle, &root.evidence);

        self.crawl_frames(&root, &mut bundle).await;
        bundle
    }

    /// Fetch the homepage. A page that turns out to be a publication by its
    /// content is swapped once for an untried non-publication URL.
    async fn fetch_root(
        &self,
        urls: &[String],
        mut homepage: String,
        mut rejected: bool,
        bundle: &mut EvidenceBundle,
    ) -> Option<RootPage> {
        let mut tried: Vec<String> = Vec::new();
        loop {
            tried.push(homepage.clone());
            bundle.homepage_url = Some(homepage.clone());
            bundle.metrics.fetch_attempts += 1;

            let outcome = self.fetcher.fetch(&homepage, self.limits).await;
            bundle.http_status = outcome.status();
            let (final_url, body) = match outcome {
                FetchOutcome::Html {
                    final_url, body, ..
                } => (final_url, body),
                failure => {
                    let message = failure.message();
                    tracing::warn!(url = %homepage, label = %failure.label(), error = %message, "homepage fetch failed");
                    bundle
                        .metrics
                        .record_error(failure.label(), message.clone(), &homepage, "homepage");
                    bundle.homepage_status = if rejected {
                        HomepageStatus::RejectedPublication
                    } else {
                        homepage_status_for(&failure)
                    };
                    bundle.homepage_error = Some(message);
                    return None;
                }
            };

            let Some(base) = Url::parse(&final_url)
                .or_else(|_| Url::parse(&homepage))
                .ok()
            else {
                let outcome = FetchOutcome::failed(FetchFailureKind::InvalidUrl, &final_url);
                bundle.metrics.record_error(outcome.label(), outcome.message(), &homepage, "homepage");
                bundle.homepage_error = Some(outcome.message());
                return None;
            };
            let evidence = self.extractor.extract(&body, &base);

            if evidence.is_publication && !rejected {
                let alternative = urls
                    .iter()
                    .find(|url| !tried.contains(url) && !is_probable_publication_url(url));
                if let Some(alternative) = alternative {
                    tracing::debug!(from = %homepage, to = %alternative, "homepage content is a publication; trying alternative");
                    homepage = alternative.clone();
                    bundle.homepage_substituted = true;
                    continue;
                }
                rejected = true;
            }

            return Some(RootPage {
                url: homepage,
                final_url,
                evidence,
                rejected,
            });
        }
    }

    /// Breadth-first frame traversal. Every attempted fetch is charged to
    /// the limiter before it is issued.
    async fn crawl_frames(&self, root: &RootPage, bundle: &mut EvidenceBundle) {
        let mut limiter = FrameCrawlLimiter::new(self.max_frame_fetches, self.max_frame_depth);
        let mut visited: HashSet<String> =
            HashSet::from([root.url.clone(), root.final_url.clone()]);
        let mut queue: VecDeque<(String, usize)> = VecDeque::new();
        for frame in &root.evidence.frame_urls {
            if visited.insert(frame.clone()) {
                queue.push_back((frame.clone(), 1));
            }
        }

        while let Some((frame_url, depth)) = queue.pop_front() {
            match limiter.try_acquire(depth) {
                Ok(()) => {}
                Err(LimitReason::Depth) => {
                    bundle.metrics.frames_skipped_depth += 1;
                    continue;
                }
                Err(LimitReason::Budget) => {
                    bundle.metrics.frames_skipped_budget += 1 + queue.len();
                    tracing::debug!(
                        fetched = limiter.fetched_count(),
                        pending = queue.len() + 1,
                        "frame budget exhausted"
                    );
                    break;
                }
            }

            bundle.metrics.fetch_attempts += 1;
            let context = format!("frame depth {depth}");
            let outcome = self.fetcher.fetch(&frame_url, self.limits).await;
            let (final_url, body) = match outcome {
                FetchOutcome::Html {
                    final_url, body, ..
                } => (final_url, body),
                failure => {
                    tracing::warn!(url = %frame_url, label = %failure.label(), "frame fetch failed");
                    bundle
                        .metrics
                        .record_error(failure.label(), failure.message(), &frame_url, context);
                    continue;
                }
            };
            let Ok(base) = Url::parse(&final_url).or_else(|_| Url::parse(&frame_url)) else {
                bundle
                    .metrics
                    .record_error("invalid_url", final_url, &frame_url, context);
                continue;
            };

            bundle.metrics.frames_fetched += 1;
            let page = self.extractor.extract(&body, &base);
            merge_evidence(bundle, &page);
            for child in page.frame_urls {
                if visited.insert(child.clone()) {
                    queue.push_back((child, depth + 1));
                }
            }
        }
    }
}

fn merge_evidence(bundle: &mut EvidenceBundle, page: &PageEvidence) {
    bundle
        .documentation_urls
        .extend(page.documentation_urls.iter().cloned());
    bundle
        .repository_urls
        .extend(page.repository_urls.iter().cloned());
    bundle.keyword_hits.extend(page.keyword_hits.iter().cloned());
}

fn homepage_status_for(outcome: &FetchOutcome) -> HomepageStatus {
    match outcome {
        FetchOutcome::Html { .. } => HomepageStatus::Ok,
        FetchOutcome::NonHtml { .. } => HomepageStatus::NonHtml,
        FetchOutcome::TooLarge { .. } => HomepageStatus::TooLarge,
        FetchOutcome::Failed {
            kind: FetchFailureKind::Timeout,
            ..
        } => HomepageStatus::Timeout,
        FetchOutcome::HttpStatus { .. } | FetchOutcome::Failed { .. } => HomepageStatus::Error,
    }
}
