//! DOM modification instructions returned by the model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Edit applied to every element matched by a selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModificationAction {
    /// Set inner HTML to `content`.
    Replace,
    /// Append `content` to inner HTML.
    Append,
    /// Prepend `content` to inner HTML.
    Prepend,
    /// Detach the element.
    Remove,
    /// Merge inline styles and set attributes.
    Style,
}

impl ModificationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Replace => "replace",
            Self::Append => "append",
            Self::Prepend => "prepend",
            Self::Remove => "remove",
            Self::Style => "style",
        }
    }
}

impl std::fmt::Display for ModificationAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declarative DOM edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomModification {
    /// CSS selector resolved against the live document.
    pub selector: String,
    pub action: ModificationAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BTreeMap<String, String>>,
}

impl DomModification {
    pub fn new(selector: impl Into<String>, action: ModificationAction) -> Self {
        Self {
            selector: selector.into(),
            action,
            content: None,
            styles: None,
            attributes: None,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.styles
            .get_or_insert_with(BTreeMap::new)
            .insert(property.into(), value.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }
}
