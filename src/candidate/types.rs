use super::publication::{PublicationId, PublicationRef, dedup_publication_ids};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A software tool proposed for registry inclusion.
///
/// Owned by one pipeline task; evidence gathering appends to `homepage`,
/// `documentation` and `repository`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(default, alias = "tool_id", alias = "biotools_id")]
    pub id: String,
    #[serde(default, alias = "name")]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(default)]
    pub documentation: Vec<String>,
    #[serde(default)]
    pub repository: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub publication_ids: Vec<String>,
    #[serde(default, alias = "publication")]
    pub publications: Vec<PublicationRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_abstract: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_full_text: Option<String>,
}

/// `//host/path` becomes `https://host/path`; surrounding whitespace goes.
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Some(rest) = trimmed.strip_prefix("//") {
        format!("https://{rest}")
    } else {
        trimmed.to_string()
    }
}

fn is_http(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

impl Candidate {
    /// Homepage first, then every http(s) URL, deduplicated in order.
    pub fn homepage_candidates(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.homepage
            .iter()
            .chain(self.urls.iter())
            .map(|raw| normalize_url(raw))
            .filter(|url| is_http(url))
            .filter(|url| seen.insert(url.clone()))
            .collect()
    }

    /// Append a documentation URL unless already known. Returns whether it
    /// was new.
    pub fn add_documentation(&mut self, url: &str) -> bool {
        push_unique(&mut self.documentation, url)
    }

    pub fn add_repository(&mut self, url: &str) -> bool {
        push_unique(&mut self.repository, url)
    }

    /// Every identifier known for the candidate, normalized and
    /// deduplicated. Unparseable strings are dropped.
    pub fn publication_identifiers(&self) -> Vec<PublicationId> {
        let from_ids = self
            .publication_ids
            .iter()
            .filter_map(|raw| PublicationId::parse_lenient(raw));
        let from_refs = self.publications.iter().flat_map(PublicationRef::identifiers);
        dedup_publication_ids(from_ids.chain(from_refs))
    }

    /// Merge identifiers learned elsewhere into `publication_ids`.
    pub fn merge_publication_ids(&mut self, ids: &[PublicationId]) {
        let mut merged = self.publication_identifiers();
        merged.extend(ids.iter().cloned());
        self.publication_ids = dedup_publication_ids(merged)
            .iter()
            .map(ToString::to_string)
            .collect();
    }

    /// Which fields carry content for the prompt.
    pub fn origin_types(&self) -> Vec<&'static str> {
        let has = |value: Option<&str>| value.is_some_and(|v| !v.trim().is_empty());
        let any = |values: &[String]| values.iter().any(|v| !v.trim().is_empty());

        let mut origins = Vec::new();
        if has(Some(self.title.as_str())) {
            origins.push("title");
        }
        if has(Some(self.description.as_str())) {
            origins.push("description");
        }
        if has(self.homepage.as_deref()) {
            origins.push("homepage");
        }
        if any(&self.documentation) {
            origins.push("documentation");
        }
        if any(&self.repository) {
            origins.push("repository");
        }
        if any(&self.tags) {
            origins.push("tags");
        }
        if has(self.published_at.as_deref()) {
            origins.push("publication");
        }
        if has(self.publication_abstract.as_deref()) {
            origins.push("publication_abstract");
        }
        if has(self.publication_full_text.as_deref()) {
            origins.push("publication_full_text");
        }
        if any(&self.publication_ids) || !self.publications.is_empty() {
            origins.push("publication_ids");
        }
        origins
    }

    /// Stable key for report rows: the id, falling back to the title.
    pub fn key(&self) -> &str {
        if self.id.trim().is_empty() {
            &self.title
        } else {
            &self.id
        }
    }
}

fn push_unique(list: &mut Vec<String>, url: &str) -> bool {
    let url = url.trim();
    if url.is_empty() || list.iter().any(|known| known == url) {
        return false;
    }
    list.push(url.to_string());
    true
}
