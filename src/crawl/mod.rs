pub mod crawler;
pub mod extractor;
pub mod fetcher;
pub mod limiter;
pub mod publication;
pub mod types;

pub use crawler::BoundedHomepageCrawler;
pub use extractor::{EvidenceExtractor, PageEvidence};
pub use fetcher::{FetchFailureKind, FetchLimits, FetchOutcome, Fetcher, HttpFetcher};
pub use limiter::{FrameCrawlLimiter, LimitReason};
pub use publication::{classify_publication, is_probable_publication_url};
pub use types::{CrawlErrorEntry, CrawlMetrics, EvidenceBundle, HomepageStatus};
