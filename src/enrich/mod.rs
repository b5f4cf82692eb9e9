pub mod europe_pmc;

pub use europe_pmc::EuropePmcLookup;

use crate::candidate::{Candidate, PublicationId};
use std::future::Future;
use std::pin::Pin;

/// What a lookup learned about one publication.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublicationRecord {
    pub title: Option<String>,
    pub abstract_text: Option<String>,
    pub full_text: Option<String>,
    /// Identifiers the service reports for the record, normalized.
    pub identifiers: Vec<PublicationId>,
}

/// External publication metadata source. Lookups never fail loudly: a
/// miss and an outage both come back as `None`.
pub trait PublicationLookup: Send + Sync {
    fn name(&self) -> &str;

    fn lookup<'a>(
        &'a self,
        id: &'a PublicationId,
    ) -> Pin<Box<dyn Future<Output = Option<PublicationRecord>> + Send + 'a>>;
}

/// Counts reported for one candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichmentSummary {
    pub records: usize,
    pub abstracts: usize,
    pub full_texts: usize,
}

/// Identifier groups, one per publication. Candidates without structured
/// publication entries get one group per known identifier.
fn publication_groups(candidate: &Candidate) -> Vec<Vec<PublicationId>> {
    let groups: Vec<Vec<PublicationId>> = candidate
        .publications
        .iter()
        .map(crate::candidate::PublicationRef::identifiers)
        .filter(|ids| !ids.is_empty())
        .collect();
    if !groups.is_empty() {
        return groups;
    }
    candidate
        .publication_identifiers()
        .into_iter()
        .map(|id| vec![id])
        .collect()
}

/// Fill abstract and full text from up to `max_publications`
/// publications, merging any identifiers learned on the way.
pub async fn enrich_candidate(
    lookup: &dyn PublicationLookup,
    candidate: &mut Candidate,
    max_publications: usize,
) -> EnrichmentSummary {
    let mut summary = EnrichmentSummary::default();
    let mut abstracts: Vec<String> = Vec::new();
    let mut full_texts: Vec<String> = Vec::new();
    let mut learned: Vec<PublicationId> = Vec::new();

    for group in publication_groups(candidate).into_iter().take(max_publications.max(1)) {
        let mut record = None;
        for id in &group {
            record = lookup.lookup(id).await;
            if record.is_some() {
                break;
            }
        }
        let Some(record) = record else {
            tracing::debug!(
                candidate = %candidate.key(),
                source = lookup.name(),
                ids = ?group.iter().map(ToString::to_string).collect::<Vec<_>>(),
                "no publication record"
            );
            continue;
        };

        summary.records += 1;
        learned.extend(group);
        learned.extend(record.identifiers);
        if let Some(text) = record.abstract_text.filter(|t| !t.trim().is_empty())
            && !abstracts.contains(&text)
        {
            abstracts.push(text);
        }
        if let Some(text) = record.full_text.filter(|t| !t.trim().is_empty())
            && !full_texts.contains(&text)
        {
            full_texts.push(text);
        }
    }

    if !abstracts.is_empty() {
        summary.abstracts = abstracts.len();
        candidate.publication_abstract = Some(abstracts.join("\n\n"));
    }
    if !full_texts.is_empty() {
        summary.full_texts = full_texts.len();
        candidate.publication_full_text = Some(full_texts.join("\n\n"));
    }
    if !learned.is_empty() {
        candidate.merge_publication_ids(&learned);
    }

    if summary.records > 0 {
        tracing::info!(
            candidate = %candidate.key(),
            source = lookup.name(),
            abstracts = summary.abstracts,
            full_texts = summary.full_texts,
            ids = candidate.publication_ids.len(),
            "publication metadata added"
        );
    }
    summary
}
