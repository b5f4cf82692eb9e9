use super::{PublicationLookup, PublicationRecord};
use crate::candidate::PublicationId;
use crate::config::EuropePmcConfig;
use crate::llm::build_client;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{LazyLock, Mutex, PoisonError};

static MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("markup pattern is valid"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default, rename = "resultList")]
    result_list: Option<ResultList>,
}

#[derive(Debug, Deserialize)]
struct ResultList {
    #[serde(default)]
    result: Vec<SearchHit>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchHit {
    title: Option<String>,
    abstract_text: Option<String>,
    pmcid: Option<String>,
    pmid: Option<String>,
    doi: Option<String>,
}

impl SearchHit {
    fn identifiers(&self) -> Vec<PublicationId> {
        [
            self.pmcid.as_deref().map(|v| format!("pmcid:{v}")),
            self.pmid.as_deref().map(|v| format!("pmid:{v}")),
            self.doi.as_deref().map(|v| format!("doi:{v}")),
        ]
        .into_iter()
        .flatten()
        .filter_map(|raw| PublicationId::parse_lenient(&raw))
        .collect()
    }
}

/// Europe PMC REST search plus optional full-text XML.
///
/// Successful responses are cached for the life of the lookup, keyed by
/// `type:identifier`, so candidates sharing a publication cost one call.
pub struct EuropePmcLookup {
    client: Client,
    base_url: String,
    include_full_text: bool,
    max_full_text_chars: usize,
    search_cache: Mutex<HashMap<String, Option<SearchHit>>>,
    full_text_cache: Mutex<HashMap<String, Option<String>>>,
}

impl EuropePmcLookup {
    pub fn new(config: &EuropePmcConfig) -> Self {
        Self {
            client: build_client(config.timeout_secs),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            include_full_text: config.include_full_text,
            max_full_text_chars: config.max_full_text_chars,
            search_cache: Mutex::new(HashMap::new()),
            full_text_cache: Mutex::new(HashMap::new()),
        }
    }

    /// Typed query first, then the generic `EXT_ID` field.
    fn queries(id: &PublicationId) -> Vec<String> {
        let typed = match id {
            PublicationId::Pmcid(v) => format!("PMCID:{}", v.to_ascii_uppercase()),
            PublicationId::Pmid(v) => format!("EXT_ID:{v}"),
            PublicationId::Doi(v) => format!("DOI:{v}"),
        };
        let fallback = format!("EXT_ID:{}", id.value());
        if typed == fallback {
            vec![typed]
        } else {
            vec![typed, fallback]
        }
    }

    async fn search(&self, id: &PublicationId) -> Option<SearchHit> {
        let cache_key = id.dedup_key();
        let cached = self
            .search_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&cache_key)
            .cloned();
        if let Some(cached) = cached {
            tracing::debug!(key = %cache_key, "europe pmc search cache hit");
            return cached;
        }

        let url = format!("{}/search", self.base_url);
        let mut answered = false;
        let mut hit = None;
        for query in Self::queries(id) {
            match self.search_once(&url, &query).await {
                Ok(Some(found)) => {
                    answered = true;
                    hit = Some(found);
                    break;
                }
                Ok(None) => answered = true,
                Err(e) => {
                    tracing::debug!(query = %query, error = %e, "europe pmc query failed");
                }
            }
        }

        // Outages are retried by later candidates; definite answers are not.
        if answered {
            self.search_cache
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(cache_key, hit.clone());
        }
        hit
    }

    async fn search_once(&self, url: &str, query: &str) -> Result<Option<SearchHit>, reqwest::Error> {
        tracing::debug!(query = %query, "europe pmc search");
        let response: SearchResponse = self
            .client
            .get(url)
            .query(&[
                ("query", query),
                ("format", "json"),
                ("resulttype", "core"),
                ("pageSize", "1"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response
            .result_list
            .and_then(|list| list.result.into_iter().next()))
    }

    async fn full_text(&self, pmcid: &str) -> Option<String> {
        let key = pmcid.to_ascii_uppercase();
        let cached = self
            .full_text_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned();
        if let Some(cached) = cached {
            return cached;
        }

        let url = format!("{}/{key}/fullTextXML", self.base_url);
        let xml = match self.fetch_text(&url).await {
            Ok(xml) => xml,
            Err(e) => {
                tracing::debug!(pmcid = %key, error = %e, "europe pmc full text request failed");
                return None;
            }
        };
        let text = xml_to_text(&xml, self.max_full_text_chars);
        self.full_text_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, text.clone());
        text
    }

    async fn fetch_text(&self, url: &str) -> Result<String, reqwest::Error> {
        self.client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }

    async fn lookup_inner(&self, id: &PublicationId) -> Option<PublicationRecord> {
        let hit = self.search(id).await?;

        let pmcid = hit.pmcid.clone().or_else(|| match id {
            PublicationId::Pmcid(v) => Some(v.clone()),
            _ => None,
        });
        let full_text = match pmcid {
            Some(pmcid) if self.include_full_text => self.full_text(&pmcid).await,
            _ => None,
        };

        Some(PublicationRecord {
            title: hit.title.clone(),
            abstract_text: hit.abstract_text.as_deref().map(clean_abstract),
            full_text,
            identifiers: hit.identifiers(),
        })
    }
}

impl PublicationLookup for EuropePmcLookup {
    fn name(&self) -> &str {
        "europe_pmc"
    }

    fn lookup<'a>(
        &'a self,
        id: &'a PublicationId,
    ) -> Pin<Box<dyn Future<Output = Option<PublicationRecord>> + Send + 'a>> {
        Box::pin(self.lookup_inner(id))
    }
}

/// Abstracts arrive with inline HTML (`<h4>`, `<i>`).
fn clean_abstract(raw: &str) -> String {
    let stripped = MARKUP.replace_all(raw, " ");
    WHITESPACE.replace_all(&stripped, " ").trim().to_string()
}

/// Text content of an XML document, whitespace collapsed and cut to
/// `max_chars`. `None` when nothing readable remains.
fn xml_to_text(xml: &str, max_chars: usize) -> Option<String> {
    let text = clean_abstract(xml);
    let text = text
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&");
    let truncated: String = text.chars().take(max_chars).collect();
    let truncated = truncated.trim();
    (!truncated.is_empty()).then(|| truncated.to_string())
}
