//! Inter-process message envelope.
//!
//! Messages travel as JSON `{"type": "...", "data": ..., "tabId": n}`. Inside
//! the process they are decoded once into the closed [`Message`] enum so every
//! handler matches exhaustively; a type name nobody knows becomes
//! [`Message::Unknown`] and is answered with an error reply.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::{PageContext, SelectionInfo};
use crate::error::RouterError;
use crate::modification::DomModification;
use crate::request::LlmRequest;
use crate::response::LlmResponse;

/// Known message type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageKind {
    Ping,
    Pong,
    LlmRequest,
    LlmResponse,
    PageContext,
    DomModify,
    Error,
    SelectionMade,
    GetSelection,
}

impl MessageKind {
    pub const ALL: [MessageKind; 9] = [
        Self::Ping,
        Self::Pong,
        Self::LlmRequest,
        Self::LlmResponse,
        Self::PageContext,
        Self::DomModify,
        Self::Error,
        Self::SelectionMade,
        Self::GetSelection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ping => "PING",
            Self::Pong => "PONG",
            Self::LlmRequest => "LLM_REQUEST",
            Self::LlmResponse => "LLM_RESPONSE",
            Self::PageContext => "PAGE_CONTEXT",
            Self::DomModify => "DOM_MODIFY",
            Self::Error => "ERROR",
            Self::SelectionMade => "SELECTION_MADE",
            Self::GetSelection => "GET_SELECTION",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded message.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Ping,
    Pong,
    LlmRequest(Box<LlmRequest>),
    LlmResponse(LlmResponse),
    PageContext,
    DomModify(Vec<DomModification>),
    Error(String),
    SelectionMade(SelectionInfo),
    GetSelection,
    /// A type tag outside the known set, kept verbatim.
    Unknown(String),
}

impl Message {
    pub fn kind(&self) -> Option<MessageKind> {
        Some(match self {
            Self::Ping => MessageKind::Ping,
            Self::Pong => MessageKind::Pong,
            Self::LlmRequest(_) => MessageKind::LlmRequest,
            Self::LlmResponse(_) => MessageKind::LlmResponse,
            Self::PageContext => MessageKind::PageContext,
            Self::DomModify(_) => MessageKind::DomModify,
            Self::Error(_) => MessageKind::Error,
            Self::SelectionMade(_) => MessageKind::SelectionMade,
            Self::GetSelection => MessageKind::GetSelection,
            Self::Unknown(_) => return None,
        })
    }

    /// Type tag as it appears on the wire.
    pub fn type_name(&self) -> &str {
        match self {
            Self::Unknown(name) => name,
            other => other.kind().map(|k| k.as_str()).unwrap_or_default(),
        }
    }

    fn payload(&self) -> Result<Value, serde_json::Error> {
        match self {
            Self::Ping | Self::PageContext | Self::GetSelection | Self::Unknown(_) => {
                Ok(Value::Null)
            }
            Self::Pong => Ok(Value::String("pong".to_string())),
            Self::LlmRequest(request) => serde_json::to_value(request),
            Self::LlmResponse(response) => serde_json::to_value(response),
            Self::DomModify(items) => serde_json::to_value(items),
            Self::Error(message) => Ok(Value::String(message.clone())),
            Self::SelectionMade(selection) => serde_json::to_value(selection),
        }
    }

    fn decode(kind: MessageKind, data: Value) -> Result<Self, RouterError> {
        let invalid = |e: serde_json::Error| RouterError::invalid_payload(kind.as_str(), e);
        Ok(match kind {
            MessageKind::Ping => Self::Ping,
            MessageKind::Pong => Self::Pong,
            MessageKind::PageContext => Self::PageContext,
            MessageKind::GetSelection => Self::GetSelection,
            MessageKind::LlmRequest => Self::LlmRequest(serde_json::from_value(data).map_err(invalid)?),
            MessageKind::LlmResponse => Self::LlmResponse(serde_json::from_value(data).map_err(invalid)?),
            MessageKind::DomModify => Self::DomModify(serde_json::from_value(data).map_err(invalid)?),
            MessageKind::SelectionMade => {
                Self::SelectionMade(serde_json::from_value(data).map_err(invalid)?)
            }
            MessageKind::Error => match data {
                Value::String(message) => Self::Error(message),
                other => Self::Error(other.to_string()),
            },
        })
    }
}

/// JSON wire form of a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_id: Option<i64>,
}

/// A message plus the tab it concerns.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub message: Message,
    pub tab_id: Option<i64>,
}

impl Envelope {
    pub fn new(message: Message) -> Self {
        Self {
            message,
            tab_id: None,
        }
    }

    pub fn for_tab(message: Message, tab_id: i64) -> Self {
        Self {
            message,
            tab_id: Some(tab_id),
        }
    }

    pub fn to_wire(&self) -> Result<WireMessage, RouterError> {
        let data = self
            .message
            .payload()
            .map_err(|e| RouterError::invalid_payload(self.message.type_name(), e))?;
        Ok(WireMessage {
            kind: self.message.type_name().to_string(),
            data,
            tab_id: self.tab_id,
        })
    }

    pub fn from_wire(wire: WireMessage) -> Result<Self, RouterError> {
        let message = match MessageKind::parse(&wire.kind) {
            Some(kind) => Message::decode(kind, wire.data)?,
            None => Message::Unknown(wire.kind),
        };
        Ok(Self {
            message,
            tab_id: wire.tab_id,
        })
    }

    pub fn to_json(&self) -> Result<String, RouterError> {
        let wire = self.to_wire()?;
        serde_json::to_string(&wire).map_err(|e| RouterError::invalid_payload(&wire.kind, e))
    }

    pub fn from_json(text: &str) -> Result<Self, RouterError> {
        let wire: WireMessage =
            serde_json::from_str(text).map_err(|e| RouterError::invalid_payload("message", e))?;
        Self::from_wire(wire)
    }
}

impl From<Message> for Envelope {
    fn from(message: Message) -> Self {
        Self::new(message)
    }
}

/// Answer delivered through a response callback.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Pong,
    Context(Box<PageContext>),
    Llm(LlmResponse),
    Ack { success: bool },
    Selection { text: String },
    Error(String),
}

impl Reply {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    /// JSON form sent back to a remote caller.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Pong => serde_json::json!({"type": MessageKind::Pong.as_str(), "data": "pong"}),
            Self::Context(context) => serde_json::to_value(context).unwrap_or(Value::Null),
            Self::Llm(response) => serde_json::to_value(response).unwrap_or(Value::Null),
            Self::Ack { success } => serde_json::json!({"success": success}),
            Self::Selection { text } => serde_json::json!({"text": text}),
            Self::Error(message) => serde_json::json!({"error": message}),
        }
    }

    pub fn into_context(self) -> Result<PageContext, RouterError> {
        match self {
            Self::Context(context) => Ok(*context),
            Self::Error(message) => Err(RouterError::Remote(message)),
            _ => Err(RouterError::UnexpectedReply { expected: "page context" }),
        }
    }

    pub fn into_llm(self) -> Result<LlmResponse, RouterError> {
        match self {
            Self::Llm(response) => Ok(response),
            Self::Error(message) => Err(RouterError::Remote(message)),
            _ => Err(RouterError::UnexpectedReply { expected: "LLM response" }),
        }
    }

    pub fn into_ack(self) -> Result<bool, RouterError> {
        match self {
            Self::Ack { success } => Ok(success),
            Self::Error(message) => Err(RouterError::Remote(message)),
            _ => Err(RouterError::UnexpectedReply { expected: "acknowledgement" }),
        }
    }

    pub fn into_selection(self) -> Result<String, RouterError> {
        match self {
            Self::Selection { text } => Ok(text),
            Self::Error(message) => Err(RouterError::Remote(message)),
            _ => Err(RouterError::UnexpectedReply { expected: "selection" }),
        }
    }

    pub fn is_pong(&self) -> bool {
        matches!(self, Self::Pong)
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
