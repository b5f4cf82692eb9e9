//! Coercion of model output into typed rubric scores.
//!
//! Parsing is permissive and every liberty taken is written to `notes`;
//! nothing is guessed silently.

use super::types::{RubricGroup, RubricSubscores, ScoreBreakdown, Subscore};
use crate::candidate::{Candidate, PublicationId, dedup_publication_ids};
use crate::config::DocWeights;
use crate::crawl::is_probable_publication_url;
use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

/// Typed view of one model response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedAssessment {
    pub tool_name: String,
    pub homepage: Option<String>,
    pub publication_ids: Vec<String>,
    #[serde(flatten)]
    pub subscores: RubricSubscores,
    #[serde(flatten)]
    pub scores: ScoreBreakdown,
    pub concise_description: String,
    pub rationale: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreNormalizer {
    weights: DocWeights,
}

impl Default for ScoreNormalizer {
    fn default() -> Self {
        Self::new(DocWeights::default())
    }
}

type RawGroup = [Option<Value>; 5];

impl ScoreNormalizer {
    pub fn new(weights: DocWeights) -> Self {
        Self { weights }
    }

    pub fn normalize(
        &self,
        payload: &Map<String, Value>,
        candidate: &Candidate,
    ) -> NormalizedAssessment {
        let mut notes = Vec::new();

        let (bio, bio_supplied) = coerce_group(payload, RubricGroup::Bio, &mut notes);
        let (documentation, doc_supplied) =
            coerce_group(payload, RubricGroup::Documentation, &mut notes);
        let subscores = RubricSubscores { bio, documentation };

        let confidence = match payload.get("confidence_score").and_then(as_number) {
            Some(value) if value.is_finite() => value.clamp(0.0, 1.0),
            _ => (bio_supplied + doc_supplied) as f64 / 10.0,
        };

        let scores = ScoreBreakdown {
            bio_score: subscores.mean(RubricGroup::Bio),
            documentation_score: subscores.mean(RubricGroup::Documentation),
            doc_score_v2: self.doc_score_v2(&subscores),
            confidence,
        };

        NormalizedAssessment {
            tool_name: text_field(payload, "tool_name")
                .unwrap_or_else(|| candidate.title.trim().to_string()),
            homepage: sanitize_homepage(payload, candidate, &mut notes),
            publication_ids: merge_publication_ids(payload, candidate, &mut notes),
            subscores,
            scores,
            concise_description: text_field(payload, "concise_description")
                .unwrap_or_else(|| candidate.description.trim().to_string()),
            rationale: text_field(payload, "rationale").unwrap_or_default(),
            notes,
        }
    }

    /// Weighted mean of `B1..B5`, clamped to `[0, 1]`.
    pub fn doc_score_v2(&self, subscores: &RubricSubscores) -> f64 {
        let total = self.weights.total();
        if !total.is_finite() || total <= 0.0 {
            return subscores.mean(RubricGroup::Documentation);
        }
        let weighted: f64 = self
            .weights
            .as_array()
            .iter()
            .zip(subscores.documentation.iter())
            .map(|(w, s)| w * s.value())
            .sum();
        (weighted / total).clamp(0.0, 1.0)
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn text_field(payload: &Map<String, Value>, key: &str) -> Option<String> {
    payload
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Canonical five values for `group` and how many the model supplied
/// validly.
fn coerce_group(
    payload: &Map<String, Value>,
    group: RubricGroup,
    notes: &mut Vec<String>,
) -> ([Subscore; 5], usize) {
    let field = group.field();
    let Some((name, value)) = group
        .field_aliases()
        .into_iter()
        .find_map(|name| payload.get(name).map(|value| (name, value)))
    else {
        notes.push(format!("{field}: missing, all keys set to 0"));
        return ([Subscore::Zero; 5], 0);
    };
    if name != field {
        notes.push(format!("{field}: read from '{name}'"));
    }

    let raw = collect_raw(value, group, notes);
    let mut values = [Subscore::Zero; 5];
    let mut supplied = 0;
    for (idx, key) in group.keys().iter().enumerate() {
        let Some(value) = &raw[idx] else {
            notes.push(format!("{field}.{key}: missing, set to 0"));
            continue;
        };
        match as_number(value).and_then(Subscore::from_f64) {
            Some(score) => {
                values[idx] = score;
                supplied += 1;
            }
            None => notes.push(format!(
                "{field}.{key}: value {value} not in {{0, 0.5, 1}}, set to 0"
            )),
        }
    }
    (values, supplied)
}

fn collect_raw(value: &Value, group: RubricGroup, notes: &mut Vec<String>) -> RawGroup {
    let field = group.field();
    let keys = group.keys();
    let mut raw: RawGroup = Default::default();

    match value {
        Value::Object(map) => {
            for (key, entry) in map {
                let canonical = key.trim().to_ascii_uppercase();
                match keys.iter().position(|k| *k == canonical) {
                    Some(idx) if raw[idx].is_none() => raw[idx] = Some(entry.clone()),
                    Some(_) => notes.push(format!("{field}: duplicate key '{key}' ignored")),
                    None => notes.push(format!("{field}: unknown key '{key}' dropped")),
                }
            }
        }
        Value::Array(items) => {
            if items.len() == keys.len() {
                notes.push(format!("{field}: list mapped to keys by position"));
            } else {
                notes.push(format!(
                    "{field}: list of {} values, expected {}",
                    items.len(),
                    keys.len()
                ));
            }
            for (slot, item) in raw.iter_mut().zip(items) {
                *slot = Some(item.clone());
            }
        }
        Value::Number(_) => {
            notes.push(format!("{field}: single value applied to all keys"));
            raw = std::array::from_fn(|_| Some(value.clone()));
        }
        Value::String(text) => {
            notes.push(format!("{field}: parsed from text"));
            // reparse_text never yields a string, so this recurses once.
            return collect_raw(&reparse_text(text), group, notes);
        }
        Value::Null | Value::Bool(_) => {
            notes.push(format!("{field}: unsupported value {value} ignored"));
        }
    }
    raw
}

/// JSON inside a string, `"A1: 1, A2=0.5"` pairs, or `"1, 0.5, 0"` lists.
fn reparse_text(text: &str) -> Value {
    let trimmed = text.trim();
    if let Ok(parsed) = serde_json::from_str::<Value>(trimmed)
        && !parsed.is_string()
    {
        return parsed;
    }

    let parts: Vec<&str> = trimmed
        .split([',', ';'])
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if parts.iter().any(|p| p.contains([':', '='])) {
        Value::Object(
            parts
                .iter()
                .filter_map(|p| p.split_once([':', '=']))
                .map(|(k, v)| (k.trim().to_string(), Value::String(v.trim().to_string())))
                .collect(),
        )
    } else {
        Value::Array(
            parts
                .iter()
                .map(|p| Value::String((*p).to_string()))
                .collect(),
        )
    }
}

/// The model's homepage when it is a usable http(s) URL that is not a
/// publication page; otherwise the candidate's own.
fn sanitize_homepage(
    payload: &Map<String, Value>,
    candidate: &Candidate,
    notes: &mut Vec<String>,
) -> Option<String> {
    let fallback = candidate
        .homepage
        .as_deref()
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(ToString::to_string);

    let Some(proposed) = text_field(payload, "homepage") else {
        return fallback;
    };
    let valid = Url::parse(&proposed)
        .is_ok_and(|url| matches!(url.scheme(), "http" | "https") && url.host().is_some());
    if !valid {
        notes.push(format!("homepage: '{proposed}' is not a URL, kept candidate homepage"));
        return fallback;
    }
    if is_probable_publication_url(&proposed) {
        notes.push(format!(
            "homepage: '{proposed}' is a publication page, kept candidate homepage"
        ));
        return fallback;
    }
    Some(proposed)
}

/// Model identifiers first, then the candidate's, normalized and
/// deduplicated case-insensitively.
fn merge_publication_ids(
    payload: &Map<String, Value>,
    candidate: &Candidate,
    notes: &mut Vec<String>,
) -> Vec<String> {
    let proposed: Vec<String> = match payload.get("publication_ids") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(ToString::to_string)
            .collect(),
        Some(Value::String(text)) => text
            .split([',', ';'])
            .map(|s| s.trim().to_string())
            .collect(),
        _ => Vec::new(),
    };

    let mut ids: Vec<PublicationId> = Vec::new();
    for raw in proposed.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        match PublicationId::parse_lenient(raw) {
            Some(id) => ids.push(id),
            None => notes.push(format!("publication_ids: '{raw}' dropped")),
        }
    }
    ids.extend(candidate.publication_identifiers());
    dedup_publication_ids(ids)
        .iter()
        .map(ToString::to_string)
        .collect()
}
