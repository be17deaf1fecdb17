//! Dialog types.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialog {
    pub dialog_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Content of one dialog node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogContent {
    pub node: String,
    #[serde(default)]
    pub content: String,
}

/// A profile variable attached to a client id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameValue {
    pub name: String,
    pub value: String,
}

impl NameValue {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One turn of a conversation, as returned by `converse`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    #[serde(rename = "conversation_id")]
    pub id: i64,
    pub client_id: i64,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub response: Vec<String>,
}

/// Inputs for `converse`. Unset ids start a new conversation or client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConverseRequest {
    pub client_id: Option<i64>,
    pub conversation_id: Option<i64>,
    pub input: Option<String>,
}

impl ConverseRequest {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: Some(input.into()),
            ..Self::default()
        }
    }

    /// Continue `conversation` with a new user message.
    pub fn reply(conversation: &Conversation, input: impl Into<String>) -> Self {
        Self {
            client_id: Some(conversation.client_id),
            conversation_id: Some(conversation.id),
            input: Some(input.into()),
        }
    }
}

/// Exported conversation with its message log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationData {
    pub conversation_id: i64,
    pub client_id: i64,
    #[serde(default)]
    pub messages: Vec<ConversationMessage>,
    #[serde(default)]
    pub profile: std::collections::BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub text: String,
    pub date_time: String,
    pub from_client: String,
}
