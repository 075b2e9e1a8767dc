//! LLM request types.

use serde::{Deserialize, Serialize};

use crate::context::PageContext;

/// What the user wants done with the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestAction {
    /// Change the page content or styling.
    #[default]
    Modify,
    /// Explain the selected text or element.
    Explain,
    /// Analyze the page structure.
    Analyze,
}

impl RequestAction {
    /// Instruction appended to the system prompt for this action.
    pub fn instruction(&self) -> &'static str {
        match self {
            Self::Modify => "Please modify the webpage according to the user's request.",
            Self::Explain => "Please explain the selected text or element in detail.",
            Self::Analyze => "Please analyze the webpage structure and provide insights.",
        }
    }
}

/// A prompt plus the page it refers to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmRequest {
    pub prompt: String,
    pub context: PageContext,
    #[serde(default)]
    pub action: RequestAction,
}

impl LlmRequest {
    pub fn new(prompt: impl Into<String>, context: PageContext, action: RequestAction) -> Self {
        Self {
            prompt: prompt.into(),
            context,
            action,
        }
    }
}
