use crate::config::CrawlConfig;
use crate::error::CrawlError;
use futures_util::StreamExt;
use reqwest::Client;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use url::Url;

/// Longest error message kept on a record.
pub const MAX_ERROR_CHARS: usize = 140;

/// Per-request ceilings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchLimits {
    pub timeout: Duration,
    pub max_bytes: usize,
}

impl FetchLimits {
    pub fn from_config(config: &CrawlConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_secs),
            max_bytes: config.max_bytes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum FetchFailureKind {
    Timeout,
    ConnectionError,
    RedirectError,
    InvalidUrl,
    RequestError,
}

/// Result of one fetch. Ordinary network and content problems are values
/// here, never errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Html {
        final_url: String,
        status: u16,
        content_type: Option<String>,
        body: String,
    },
    HttpStatus {
        status: u16,
    },
    NonHtml {
        status: u16,
        content_type: String,
    },
    TooLarge {
        status: u16,
        message: String,
    },
    Failed {
        kind: FetchFailureKind,
        message: String,
    },
}

impl FetchOutcome {
    pub fn failed(kind: FetchFailureKind, message: impl AsRef<str>) -> Self {
        Self::Failed {
            kind,
            message: truncate_error(message.as_ref(), MAX_ERROR_CHARS),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Html { status, .. }
            | Self::HttpStatus { status }
            | Self::NonHtml { status, .. }
            | Self::TooLarge { status, .. } => Some(*status),
            Self::Failed { .. } => None,
        }
    }

    /// Short label for error entries and logs.
    pub fn label(&self) -> String {
        match self {
            Self::Html { .. } => "ok".to_string(),
            Self::HttpStatus { .. } => "http_error".to_string(),
            Self::NonHtml { .. } => "non_html".to_string(),
            Self::TooLarge { .. } => "too_large".to_string(),
            Self::Failed { kind, .. } => kind.to_string(),
        }
    }

    /// Human readable failure message; empty for successful fetches.
    pub fn message(&self) -> String {
        match self {
            Self::Html { .. } => String::new(),
            Self::HttpStatus { status } => format!("HTTP {status}"),
            Self::NonHtml { content_type, .. } => {
                truncate_error(&format!("unsupported content-type: {content_type}"), MAX_ERROR_CHARS)
            }
            Self::TooLarge { message, .. } | Self::Failed { message, .. } => message.clone(),
        }
    }
}

/// HTTP collaborator used by the crawler.
pub trait Fetcher: Send + Sync {
    fn fetch<'a>(
        &'a self,
        url: &'a str,
        limits: FetchLimits,
    ) -> Pin<Box<dyn Future<Output = FetchOutcome> + Send + 'a>>;
}

/// reqwest-backed fetcher with a streamed byte ceiling.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &CrawlConfig) -> Result<Self, CrawlError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| CrawlError::Client(e.to_string()))?;
        Ok(Self { client })
    }

    async fn fetch_inner(&self, raw_url: &str, limits: FetchLimits) -> FetchOutcome {
        let url = match Url::parse(raw_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => url,
            Ok(url) => {
                return FetchOutcome::failed(
                    FetchFailureKind::InvalidUrl,
                    format!("unsupported scheme: {}", url.scheme()),
                );
            }
            Err(e) => return FetchOutcome::failed(FetchFailureKind::InvalidUrl, e.to_string()),
        };

        let response = match self
            .client
            .get(url)
            .timeout(limits.timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return classify_request_error(&e),
        };

        let status = response.status().as_u16();
        if status >= 400 {
            return FetchOutcome::HttpStatus { status };
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        if let Some(ct) = content_type.as_deref()
            && !is_textual(ct)
        {
            return FetchOutcome::NonHtml {
                status,
                content_type: ct.to_string(),
            };
        }

        if let Some(declared) = response.content_length()
            && declared > limits.max_bytes as u64
        {
            return FetchOutcome::TooLarge {
                status,
                message: format!(
                    "declared content length {declared} bytes exceeds limit {}",
                    limits.max_bytes
                ),
            };
        }

        let final_url = response.url().to_string();
        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => return classify_request_error(&e),
            };
            if body.len() + chunk.len() > limits.max_bytes {
                return FetchOutcome::TooLarge {
                    status,
                    message: format!(
                        "downloaded content exceeds limit {} bytes",
                        limits.max_bytes
                    ),
                };
            }
            body.extend_from_slice(&chunk);
        }

        FetchOutcome::Html {
            final_url,
            status,
            content_type,
            body: String::from_utf8_lossy(&body).into_owned(),
        }
    }
}

impl Fetcher for HttpFetcher {
    fn fetch<'a>(
        &'a self,
        url: &'a str,
        limits: FetchLimits,
    ) -> Pin<Box<dyn Future<Output = FetchOutcome> + Send + 'a>> {
        Box::pin(self.fetch_inner(url, limits))
    }
}

/// Missing content types pass; anything naming html or text is accepted.
fn is_textual(content_type: &str) -> bool {
    let lower = content_type.to_ascii_lowercase();
    lower.trim().is_empty() || lower.contains("html") || lower.contains("text")
}

fn classify_request_error(err: &reqwest::Error) -> FetchOutcome {
    if err.is_timeout() {
        FetchOutcome::failed(FetchFailureKind::Timeout, "request timed out")
    } else if err.is_redirect() {
        FetchOutcome::failed(FetchFailureKind::RedirectError, "too many redirects")
    } else if err.is_connect() {
        FetchOutcome::failed(FetchFailureKind::ConnectionError, err.to_string())
    } else if err.is_builder() {
        FetchOutcome::failed(FetchFailureKind::InvalidUrl, err.to_string())
    } else {
        FetchOutcome::failed(FetchFailureKind::RequestError, err.to_string())
    }
}

/// Trim and cap at `limit` characters, marking the cut with an ellipsis.
pub fn truncate_error(message: &str, limit: usize) -> String {
    let clean = message.trim();
    if clean.chars().count() <= limit {
        return clean.to_string();
    }
    let kept: String = clean.chars().take(limit.saturating_sub(1)).collect();
    format!("{}…", kept.trim_end())
}
