//! Interpretation of raw model text.

use serde_json::Value;
use tracing::{debug, warn};

use pagesmith_protocols::{DomModification, ModelReply};

/// Classify model text as structured modifications or plain prose.
///
/// Text counts as structured when it is (optionally fenced) JSON whose top
/// level object has a `modifications` array. Array items that do not decode
/// as a [`DomModification`] are dropped; the rest keep their order.
pub fn interpret(raw: &str) -> ModelReply {
    let candidate = strip_code_fence(raw.trim());

    let Ok(Value::Object(mut object)) = serde_json::from_str::<Value>(candidate) else {
        return ModelReply::PlainText(raw.to_string());
    };
    let Some(Value::Array(items)) = object.remove("modifications") else {
        debug!("JSON reply without a modifications array, treating as text");
        return ModelReply::PlainText(raw.to_string());
    };

    let total = items.len();
    let modifications: Vec<DomModification> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(modification) => Some(modification),
            Err(e) => {
                warn!("Dropping malformed modification #{}: {}", index, e);
                None
            }
        })
        .collect();

    debug!("Parsed {}/{} modifications", modifications.len(), total);
    ModelReply::Modifications(modifications)
}

/// Remove a surrounding Markdown code fence, with or without a language tag.
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagesmith_protocols::ModificationAction;

    #[test]
    fn test_plain_text() {
        assert_eq!(
            interpret("This page is a blog."),
            ModelReply::PlainText("This page is a blog.".to_string())
        );
    }

    #[test]
    fn test_modifications_preserve_order() {
        let raw = r##"{"modifications": [
            {"selector": "h1", "action": "replace", "content": "Title"},
            {"selector": "body", "action": "style", "styles": {"color": "red"}},
            {"selector": "#ad", "action": "remove"}
        ]}"##;
        let ModelReply::Modifications(items) = interpret(raw) else {
            panic!("expected modifications");
        };
        let selectors: Vec<_> = items.iter().map(|m| m.selector.as_str()).collect();
        assert_eq!(selectors, vec!["h1", "body", "#ad"]);
        assert_eq!(items[1].action, ModificationAction::Style);
    }

    #[test]
    fn test_fenced_json() {
        let raw = "```json\n{\"modifications\": [{\"selector\": \"p\", \"action\": \"remove\"}]}\n```";
        let ModelReply::Modifications(items) = interpret(raw) else {
            panic!("expected modifications");
        };
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_bare_fence() {
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("{}"), "{}");
    }

    #[test]
    fn test_json_without_modifications_is_text() {
        let raw = r#"{"answer": 42}"#;
        assert_eq!(interpret(raw), ModelReply::PlainText(raw.to_string()));
    }

    #[test]
    fn test_modifications_not_array_is_text() {
        let raw = r#"{"modifications": "none"}"#;
        assert_eq!(interpret(raw), ModelReply::PlainText(raw.to_string()));
    }

    #[test]
    fn test_json_array_top_level_is_text() {
        let raw = r#"[{"selector": "p", "action": "remove"}]"#;
        assert!(matches!(interpret(raw), ModelReply::PlainText(_)));
    }

    #[test]
    fn test_malformed_items_dropped() {
        let raw = r#"{"modifications": [
            {"selector": "p", "action": "explode"},
            {"selector": "p", "action": "append", "content": "!"},
            {"action": "remove"}
        ]}"#;
        let ModelReply::Modifications(items) = interpret(raw) else {
            panic!("expected modifications");
        };
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].action, ModificationAction::Append);
    }

    #[test]
    fn test_empty_text_is_plain() {
        assert_eq!(interpret(""), ModelReply::PlainText(String::new()));
    }
}
