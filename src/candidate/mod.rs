pub mod publication;
pub mod types;

pub use publication::{PublicationId, PublicationRef, dedup_publication_ids};
pub use types::{Candidate, normalize_url};

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

/// Load candidates from a JSON array, an object with a `list` array (the
/// upstream export shape), a single object, or JSON Lines.
///
/// Records without an id get their title as id.
pub fn load_candidates(path: &Path) -> Result<Vec<Candidate>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read candidates from {}", path.display()))?;
    parse_candidates(&contents)
        .with_context(|| format!("Failed to parse candidates from {}", path.display()))
}

pub fn parse_candidates(contents: &str) -> Result<Vec<Candidate>> {
    let trimmed = contents.trim_start();
    let mut candidates: Vec<Candidate> = if trimmed.starts_with('[') {
        serde_json::from_str(trimmed)?
    } else if trimmed.starts_with('{') && !looks_like_jsonl(trimmed) {
        let value: Value = serde_json::from_str(trimmed)?;
        match value.get("list") {
            Some(list @ Value::Array(_)) => serde_json::from_value(list.clone())?,
            _ => vec![serde_json::from_value(value)?],
        }
    } else {
        trimmed
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| {
                serde_json::from_str(line).with_context(|| format!("line {}", idx + 1))
            })
            .collect::<Result<_>>()?
    };

    for candidate in &mut candidates {
        if candidate.id.trim().is_empty() {
            candidate.id.clone_from(&candidate.title);
        }
    }
    Ok(candidates)
}

fn looks_like_jsonl(contents: &str) -> bool {
    contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .nth(1)
        .is_some_and(|second| second.trim_start().starts_with('{'))
        && serde_json::from_str::<Value>(contents).is_err()
}
