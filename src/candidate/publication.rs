use serde::{Deserialize, Serialize};
use std::fmt;

/// A publication identifier in its normalized `DOI:` / `PMID:` / `PMCID:`
/// form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PublicationId {
    Doi(String),
    Pmid(String),
    Pmcid(String),
}

impl PublicationId {
    /// Parse an identifier that must already be normalized.
    ///
    /// Prefixes are case-sensitive; DOIs must start with `10.` and contain a
    /// `/`, PMIDs are digits, PMCIDs are `PMC` followed by digits.
    pub fn parse_normalized(raw: &str) -> Option<Self> {
        if let Some(body) = raw.strip_prefix("DOI:") {
            return valid_doi(body).then(|| Self::Doi(body.to_string()));
        }
        if let Some(body) = raw.strip_prefix("PMCID:") {
            return valid_pmcid(body).then(|| Self::Pmcid(body.to_string()));
        }
        if let Some(body) = raw.strip_prefix("PMID:") {
            return valid_pmid(body).then(|| Self::Pmid(body.to_string()));
        }
        None
    }

    /// Parse loosely formatted identifiers (`doi:10.1/x`, `pmcid: pmc123`,
    /// `https://doi.org/10.1/x`, bare DOIs) into normalized form.
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        if let Some((prefix, body)) = trimmed.split_once(':') {
            let body = body.trim();
            match prefix.trim().to_ascii_lowercase().as_str() {
                "doi" => return Self::doi_from(body),
                "pmid" | "pubmed" => {
                    return valid_pmid(body).then(|| Self::Pmid(body.to_string()));
                }
                "pmcid" | "pmc" => {
                    let upper = body.to_ascii_uppercase();
                    let upper = if upper.starts_with("PMC") {
                        upper
                    } else {
                        format!("PMC{upper}")
                    };
                    return valid_pmcid(&upper).then_some(Self::Pmcid(upper));
                }
                _ => {}
            }
        }

        let lower = trimmed.to_ascii_lowercase();
        for marker in ["doi.org/", "dx.doi.org/"] {
            if let Some(pos) = lower.find(marker) {
                return Self::doi_from(&trimmed[pos + marker.len()..]);
            }
        }
        if trimmed.starts_with("10.") {
            return Self::doi_from(trimmed);
        }
        if trimmed.len() > 3 && lower.starts_with("pmc") && valid_pmid(&trimmed[3..]) {
            return Some(Self::Pmcid(trimmed.to_ascii_uppercase()));
        }
        None
    }

    fn doi_from(body: &str) -> Option<Self> {
        let body = body.trim().trim_end_matches(['.', ',', ';']);
        valid_doi(body).then(|| Self::Doi(body.to_string()))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Doi(_) => "doi",
            Self::Pmid(_) => "pmid",
            Self::Pmcid(_) => "pmcid",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Self::Doi(v) | Self::Pmid(v) | Self::Pmcid(v) => v,
        }
    }

    /// Case-insensitive identity used for deduplication.
    pub fn dedup_key(&self) -> String {
        self.to_string().to_ascii_lowercase()
    }
}

impl fmt::Display for PublicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Doi(v) => write!(f, "DOI:{v}"),
            Self::Pmid(v) => write!(f, "PMID:{v}"),
            Self::Pmcid(v) => write!(f, "PMCID:{v}"),
        }
    }
}

fn valid_doi(body: &str) -> bool {
    body.starts_with("10.") && body.contains('/') && !body.chars().any(char::is_whitespace)
}

fn valid_pmid(body: &str) -> bool {
    !body.is_empty() && body.chars().all(|c| c.is_ascii_digit())
}

fn valid_pmcid(body: &str) -> bool {
    body.strip_prefix("PMC").is_some_and(valid_pmid)
}

/// Publication record as found in upstream exports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pmid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pmcid: Option<String>,
}

impl PublicationRef {
    /// Identifiers in lookup preference order: PMCID, PMID, DOI.
    pub fn identifiers(&self) -> Vec<PublicationId> {
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

/// Deduplicate case-insensitively, keeping first occurrences in order.
pub fn dedup_publication_ids(ids: impl IntoIterator<Item = PublicationId>) -> Vec<PublicationId> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter()
        .filter(|id| seen.insert(id.dedup_key()))
        .collect()
}
