use super::types::{RubricGroup, Subscore};
use crate::candidate::PublicationId;
use serde_json::{Map, Value};
use url::Url;

/// Checks a parsed model response against the assessment shape.
///
/// With `strict` off every payload passes and the normalizer's coercion
/// decides what survives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaValidator {
    strict: bool,
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self::new(true)
    }
}

impl SchemaValidator {
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Empty when the payload is valid.
    pub fn validate(&self, payload: &Map<String, Value>) -> Vec<String> {
        if !self.strict {
            return Vec::new();
        }

        let mut violations = Vec::new();
        for group in RubricGroup::ALL {
            check_rubric(payload, group, &mut violations);
        }
        check_description(payload, &mut violations);
        check_homepage(payload, &mut violations);
        check_publication_ids(payload, &mut violations);
        violations
    }
}

/// The single violation reported when no JSON object could be read from
/// the response; every field counts as wrong.
pub fn parse_failure_violation(detail: &str) -> String {
    format!(
        "response: could not parse a JSON object ({detail}); return the complete object \
         with tool_name, homepage, publication_ids, bio_subscores, \
         documentation_subscores, concise_description, rationale and confidence_score"
    )
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn check_rubric(payload: &Map<String, Value>, group: RubricGroup, out: &mut Vec<String>) {
    let field = group.field();
    let rubric = match payload.get(field) {
        None => {
            out.push(format!("{field}: missing"));
            return;
        }
        Some(Value::Object(map)) => map,
        Some(other) => {
            out.push(format!("{field}: expected object, got {}", type_name(other)));
            return;
        }
    };

    for key in group.keys() {
        match rubric.get(key) {
            None => out.push(format!("{field}.{key}: missing")),
            Some(Value::Number(n)) => {
                let value = n.as_f64().unwrap_or(f64::NAN);
                if Subscore::from_f64(value).is_none() {
                    out.push(format!("{field}.{key}: value {n} not in {{0, 0.5, 1}}"));
                }
            }
            Some(other) => out.push(format!(
                "{field}.{key}: expected number in {{0, 0.5, 1}}, got {}",
                type_name(other)
            )),
        }
    }
}

fn check_description(payload: &Map<String, Value>, out: &mut Vec<String>) {
    match payload.get("concise_description") {
        Some(Value::String(text)) if !text.trim().is_empty() => {}
        Some(Value::String(_)) | None | Some(Value::Null) => {
            out.push("concise_description: missing or empty".to_string());
        }
        Some(other) => out.push(format!(
            "concise_description: expected string, got {}",
            type_name(other)
        )),
    }
}

fn check_homepage(payload: &Map<String, Value>, out: &mut Vec<String>) {
    match payload.get("homepage") {
        None | Some(Value::Null) => {}
        Some(Value::String(raw)) => {
            let raw = raw.trim();
            if raw.is_empty() {
                return;
            }
            let valid = Url::parse(raw)
                .is_ok_and(|url| matches!(url.scheme(), "http" | "https") && url.host().is_some());
            if !valid {
                out.push(format!("homepage: '{raw}' is not a valid http(s) URL"));
            }
        }
        Some(other) => out.push(format!("homepage: expected string, got {}", type_name(other))),
    }
}

fn check_publication_ids(payload: &Map<String, Value>, out: &mut Vec<String>) {
    let ids = match payload.get("publication_ids") {
        None | Some(Value::Null) => return,
        Some(Value::Array(ids)) => ids,
        Some(other) => {
            out.push(format!(
                "publication_ids: expected array, got {}",
                type_name(other)
            ));
            return;
        }
    };

    for (idx, id) in ids.iter().enumerate() {
        match id {
            Value::String(raw) if PublicationId::parse_normalized(raw.trim()).is_some() => {}
            Value::String(raw) => out.push(format!(
                "publication_ids[{idx}]: '{raw}' is not one of DOI:..., PMID:... or PMCID:..."
            )),
            other => out.push(format!(
                "publication_ids[{idx}]: expected string, got {}",
                type_name(other)
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test payloads are objects"),
        }
    }

    fn valid() -> Value {
        json!({
            "tool_name": "SeqTool",
            "homepage": "https://seqtool.org",
            "publication_ids": ["DOI:10.1093/nar/gkz123", "PMID:31234567", "PMCID:PMC6612345"],
            "bio_subscores": {"A1": 1, "A2": 1, "A3": 0.5, "A4": 1, "A5": 0},
            "documentation_subscores": {"B1": 1, "B2": 1, "B3": 0.5, "B4": 0, "B5": 1.0},
            "concise_description": "Aligns sequencing reads.",
            "rationale": "Homepage documents installation.",
            "confidence_score": 0.8
        })
    }

    #[test]
    fn valid_payload_has_no_violations() {
        assert!(SchemaValidator::default().validate(&payload(valid())).is_empty());
    }

    #[test]
    fn missing_rubric_key_is_reported_by_path() {
        let mut value = valid();
        value["documentation_subscores"]
            .as_object_mut()
            .unwrap()
            .remove("B4");
        let violations = SchemaValidator::default().validate(&payload(value));
        assert_eq!(violations, vec!["documentation_subscores.B4: missing"]);
    }

    #[test]
    fn off_grid_values_are_rejected() {
        let mut value = valid();
        value["bio_subscores"]["A2"] = json!(0.25);
        value["bio_subscores"]["A3"] = json!("1");
        let violations = SchemaValidator::default().validate(&payload(value));
        assert_eq!(
            violations,
            vec![
                "bio_subscores.A2: value 0.25 not in {0, 0.5, 1}",
                "bio_subscores.A3: expected number in {0, 0.5, 1}, got string",
            ]
        );
    }

    #[test]
    fn rubric_must_be_an_object() {
        let mut value = valid();
        value["bio_subscores"] = json!([1, 1, 1, 1, 1]);
        value.as_object_mut().unwrap().remove("documentation_subscores");
        let violations = SchemaValidator::default().validate(&payload(value));
        assert_eq!(
            violations,
            vec![
                "bio_subscores: expected object, got array",
                "documentation_subscores: missing",
            ]
        );
    }

    #[test]
    fn description_homepage_and_ids_are_checked() {
        let mut value = valid();
        value["concise_description"] = json!("  ");
        value["homepage"] = json!("seqtool dot org");
        value["publication_ids"] = json!(["PMID:1", "pmid 123", 7]);
        let violations = SchemaValidator::default().validate(&payload(value));
        assert_eq!(
            violations,
            vec![
                "concise_description: missing or empty",
                "homepage: 'seqtool dot org' is not a valid http(s) URL",
                "publication_ids[1]: 'pmid 123' is not one of DOI:..., PMID:... or PMCID:...",
                "publication_ids[2]: expected string, got number",
            ]
        );
    }

    #[test]
    fn empty_homepage_and_absent_ids_are_allowed() {
        let mut value = valid();
        value["homepage"] = json!("");
        value.as_object_mut().unwrap().remove("publication_ids");
        assert!(SchemaValidator::default().validate(&payload(value)).is_empty());
    }

    #[test]
    fn tolerant_validator_accepts_anything() {
        let validator = SchemaValidator::new(false);
        assert!(!validator.is_strict());
        assert!(validator.validate(&Map::new()).is_empty());
    }
}
