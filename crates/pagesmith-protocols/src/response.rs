//! LLM response types.

use serde::{Deserialize, Serialize};

use crate::modification::DomModification;

/// Interpretation of the raw text a model returned.
///
/// Models are asked for JSON with a `modifications` array but frequently
/// answer in prose. Either outcome is a successful reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelReply {
    /// Free-form explanatory text.
    PlainText(String),
    /// Structured edits, in the order the model listed them.
    Modifications(Vec<DomModification>),
}

/// Result of one request/response exchange with the provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifications: Option<Vec<DomModification>>,
}

impl LlmResponse {
    /// Build a successful response from the raw model text and its interpretation.
    ///
    /// `content` always carries the raw text, also when it was structured.
    pub fn from_reply(raw: impl Into<String>, reply: ModelReply) -> Self {
        let modifications = match reply {
            ModelReply::PlainText(_) => None,
            ModelReply::Modifications(items) => Some(items),
        };
        Self {
            success: true,
            content: Some(raw.into()),
            error: None,
            modifications,
        }
    }

    /// Build a failed response.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            content: None,
            error: Some(error.into()),
            modifications: None,
        }
    }

    /// Modifications waiting to be applied, if any.
    pub fn pending_modifications(&self) -> Option<&[DomModification]> {
        self.modifications
            .as_deref()
            .filter(|items| !items.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modification::ModificationAction;

    #[test]
    fn test_from_plain_text_reply() {
        let response = LlmResponse::from_reply("hi", ModelReply::PlainText("hi".to_string()));
        assert!(response.success);
        assert_eq!(response.content.as_deref(), Some("hi"));
        assert!(response.modifications.is_none());
        assert!(response.error.is_none());
    }

    #[test]
    fn test_from_modifications_reply_keeps_raw_content() {
        let raw = r#"{"modifications":[{"selector":"body","action":"remove"}]}"#;
        let items = vec![DomModification::new("body", ModificationAction::Remove)];
        let response = LlmResponse::from_reply(raw, ModelReply::Modifications(items.clone()));
        assert!(response.success);
        assert_eq!(response.content.as_deref(), Some(raw));
        assert_eq!(response.modifications, Some(items));
    }

    #[test]
    fn test_failure() {
        let response = LlmResponse::failure("API Error");
        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("API Error"));
        assert!(response.content.is_none());
    }

    #[test]
    fn test_pending_modifications_empty_list_is_none() {
        let response = LlmResponse::from_reply("{}", ModelReply::Modifications(vec![]));
        assert!(response.pending_modifications().is_none());
    }

    #[test]
    fn test_failure_wire_shape() {
        let json = serde_json::to_value(LlmResponse::failure("boom")).unwrap();
        assert_eq!(json, serde_json::json!({"success": false, "error": "boom"}));
    }
}
