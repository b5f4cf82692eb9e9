use serde_json::{Map, Value};

/// Concatenate the `response` fields of an Ollama `/api/generate` body.
///
/// Streamed bodies are newline-delimited JSON chunks; a non-streamed body is
/// a single chunk. Lines that are not JSON objects are skipped.
pub fn collect_generate_response(body: &str) -> String {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| serde_json::from_str::<Value>(line).ok())
        .filter_map(|chunk| {
            chunk
                .get("response")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .collect()
}

/// First balanced `{...}` span in `text` that parses as JSON. Braces
/// inside string literals are ignored, so prose and markdown fences around
/// the object do not matter.
///
/// One scan collects every balanced span with a stack of open positions;
/// spans are then tried in order of their opening brace.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let mut spans: Vec<(usize, usize)> = Vec::new();
    let mut open: Vec<usize> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    for (idx, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            // Quotes in prose outside any object are not string literals.
            '"' if !open.is_empty() => in_string = true,
            '{' => open.push(idx),
            '}' => {
                if let Some(start) = open.pop() {
                    spans.push((start, idx + 1));
                }
            }
            _ => {}
        }
    }
    spans.sort_unstable_by_key(|&(start, _)| start);
    spans
        .into_iter()
        .map(|(start, end)| &text[start..end])
        .find(|candidate| serde_json::from_str::<Value>(candidate).is_ok())
}

/// Parse model text into a JSON object. The error string becomes a schema
/// violation.
pub fn parse_model_output(text: &str) -> Result<Map<String, Value>, String> {
    let Some(raw) = extract_json_object(text) else {
        return Err("response is not a JSON object: no '{...}' found".to_string());
    };
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err("response is not a JSON object".to_string()),
        Err(e) => Err(format!("response is not valid JSON: {e}")),
    }
}
