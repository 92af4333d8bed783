//! Recovery of structured JSON from noisy LLM output.
//!
//! Local models wrap JSON in markdown fences, leak `<think>` tags, emit
//! trailing commas, and append commentary after the closing brace. The
//! extractor isolates the first balanced object and applies last-mile
//! fixes before parsing.

use once_cell::sync::Lazy;
use regex::Regex;

use super::LlmError;

static JSON_MARKDOWN_START_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^\s*```json\s*").unwrap());
static JSON_MARKDOWN_END_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)\s*```\s*$").unwrap());
static THINK_TAGS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</?\s*think\s*>").unwrap());
static TRAILING_COMMA_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r",\s*([}\]])").unwrap());

/// Normalize the model's "unknown" conventions before JSON extraction.
pub fn clean_llm_response(text: &str) -> String {
    text.replace("[\"unknown\"]", "[]")
        .replace("[\"Unknown\"]", "[]")
        .replace("\"unknown\"", "\"\"")
        .replace("\"Unknown\"", "\"\"")
}

/// Extract and parse the first balanced JSON object from LLM output.
pub fn robust_json_extract(text: &str) -> Result<serde_json::Value, LlmError> {
    let cleaned = text.replace('\u{a0}', " ");
    let cleaned = cleaned.trim();
    let cleaned = JSON_MARKDOWN_START_RE.replace_all(cleaned, "");
    let cleaned = JSON_MARKDOWN_END_RE.replace_all(&cleaned, "");
    let cleaned = THINK_TAGS_RE.replace_all(&cleaned, "");

    let start = cleaned
        .find('{')
        .ok_or_else(|| LlmError::MalformedJson(format!("no JSON object found in: {}", preview(&cleaned))))?;

    let mut depth: i32 = 0;
    let mut end = None;
    for (index, c) in cleaned[start..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    end = Some(start + index + 1);
                    break;
                }
            }
            _ => {}
        }
    }
    let end = end.ok_or_else(|| {
        LlmError::MalformedJson(format!("unbalanced braces in: {}", preview(&cleaned[start..])))
    })?;

    let json_str = &cleaned[start..end];
    let fixed = TRAILING_COMMA_RE.replace_all(json_str, "$1");
    let fixed = fixed.replace("\\n", "\n");

    serde_json::from_str(&fixed).map_err(|e| LlmError::MalformedJson(e.to_string()))
}

fn preview(text: &str) -> String {
    let mut p: String = text.chars().take(100).collect();
    if p.len() < text.len() {
        p.push_str("...");
    }
    p
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_json() {
        let value = robust_json_extract(r#"{"references": []}"#).unwrap();
        assert_eq!(value, json!({"references": []}));
    }

    #[test]
    fn test_markdown_fences_stripped() {
        let text = "```json\n{\"references\": [{\"title\": \"A\"}]}\n```";
        let value = robust_json_extract(text).unwrap();
        assert_eq!(value["references"][0]["title"], "A");
    }

    #[test]
    fn test_think_tags_stripped() {
        let text = "<think>considering the text</think>{\"accessions\": []}";
        let value = robust_json_extract(text).unwrap();
        assert_eq!(value, json!({"accessions": []}));
    }

    #[test]
    fn test_trailing_commentary_discarded() {
        let text = "{\"references\": []} Hope this helps!";
        let value = robust_json_extract(text).unwrap();
        assert_eq!(value, json!({"references": []}));
    }

    #[test]
    fn test_trailing_comma_fixed() {
        let text = r#"{"references": [{"title": "A",}],}"#;
        let value = robust_json_extract(text).unwrap();
        assert_eq!(value["references"][0]["title"], "A");
    }

    #[test]
    fn test_nested_objects_balanced() {
        let text = r#"prefix {"a": {"b": {"c": 1}}} suffix"#;
        let value = robust_json_extract(text).unwrap();
        assert_eq!(value["a"]["b"]["c"], 1);
    }

    #[test]
    fn test_no_json_is_error() {
        assert!(matches!(
            robust_json_extract("no structure here at all"),
            Err(LlmError::MalformedJson(_))
        ));
    }

    #[test]
    fn test_unbalanced_braces_is_error() {
        assert!(matches!(
            robust_json_extract(r#"{"references": ["#),
            Err(LlmError::MalformedJson(_))
        ));
    }

    #[test]
    fn test_clean_llm_response_unknowns() {
        assert_eq!(
            clean_llm_response(r#"{"author": ["unknown"], "title": "unknown"}"#),
            r#"{"author": [], "title": ""}"#
        );
    }

    #[test]
    fn test_nbsp_normalized() {
        let text = "{\u{a0}\"references\":\u{a0}[]}";
        assert!(robust_json_extract(text).is_ok());
    }
}
