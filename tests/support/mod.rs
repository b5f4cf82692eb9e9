#![allow(dead_code)]

use serde_json::{Value, json};

/// Model answer with every rubric key, optionally without some of them.
pub fn model_response(bio: [f64; 5], doc: [f64; 5], drop: &[&str]) -> Value {
    let mut bio_map = serde_json::Map::new();
    for (idx, value) in bio.iter().enumerate() {
        let key = format!("A{}", idx + 1);
        if !drop.contains(&key.as_str()) {
            bio_map.insert(key, json!(value));
        }
    }
    let mut doc_map = serde_json::Map::new();
    for (idx, value) in doc.iter().enumerate() {
        let key = format!("B{}", idx + 1);
        if !drop.contains(&key.as_str()) {
            doc_map.insert(key, json!(value));
        }
    }
    json!({
        "tool_name": "SeqTool",
        "homepage": "https://seqtool.example",
        "publication_ids": ["DOI:10.1000/seq.1"],
        "bio_subscores": bio_map,
        "documentation_subscores": doc_map,
        "concise_description": "Aligns sequencing reads to a reference genome.",
        "rationale": "Installable package with a tutorial."
    })
}

/// Ollama `/api/generate` body wrapping `payload` as model text.
pub fn ollama_body(payload: &Value) -> Value {
    json!({
        "model": "llama3.2",
        "response": payload.to_string(),
        "done": true
    })
}
