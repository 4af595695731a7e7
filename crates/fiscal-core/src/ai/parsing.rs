//! JSON recovery from model responses.
//!
//! Models often wrap the payload in prose or markdown fences, so the
//! outermost `{ ... }` span is parsed instead of the raw response.

use serde_json::Value;

use crate::error::GenerativeError;

const RAW_PREVIEW_CHARS: usize = 200;

/// Parse the JSON object embedded in a model response.
pub fn extract_json_object(response: &str) -> Result<Value, GenerativeError> {
    let response = response.trim();
    if response.is_empty() {
        return Err(GenerativeError::EmptyResponse);
    }

    let start = response.find('{');
    let end = response.rfind('}');

    match (start, end) {
        (Some(s), Some(e)) if s < e => {
            let json_str = &response[s..=e];
            let value: Value = serde_json::from_str(json_str).map_err(|e| {
                GenerativeError::MalformedResponse(format!(
                    "invalid JSON: {} | raw: {}",
                    e,
                    preview(json_str)
                ))
            })?;
            if value.is_object() {
                Ok(value)
            } else {
                Err(GenerativeError::MalformedResponse(format!(
                    "expected a JSON object | raw: {}",
                    preview(json_str)
                )))
            }
        }
        _ => Err(GenerativeError::MalformedResponse(format!(
            "no JSON object found | raw: {}",
            preview(response)
        ))),
    }
}

fn preview(raw: &str) -> String {
    match raw.char_indices().nth(RAW_PREVIEW_CHARS) {
        Some((idx, _)) => format!("{}...", &raw[..idx]),
        None => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_plain_object() {
        let value = extract_json_object(r#"{"number": "123"}"#).unwrap();
        assert_eq!(value, json!({"number": "123"}));
    }

    #[test]
    fn test_extract_fenced_object() {
        let response = "Segue o resultado:\n```json\n{\"totalValue\": \"1.234,56\"}\n```\n";
        let value = extract_json_object(response).unwrap();
        assert_eq!(value["totalValue"], "1.234,56");
    }

    #[test]
    fn test_empty_response() {
        assert!(matches!(
            extract_json_object("   \n"),
            Err(GenerativeError::EmptyResponse)
        ));
    }

    #[test]
    fn test_no_object() {
        assert!(matches!(
            extract_json_object("não encontrei dados"),
            Err(GenerativeError::MalformedResponse(_))
        ));
        assert!(matches!(
            extract_json_object("} antes de {"),
            Err(GenerativeError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_preview_respects_char_boundaries() {
        let raw = "ç".repeat(300);
        let shown = preview(&raw);
        assert_eq!(shown.chars().count(), RAW_PREVIEW_CHARS + 3);
    }
}
