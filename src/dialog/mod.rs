//! Dialog binding: virtual-agent conversations, dialog definitions and
//! per-client profile variables.

mod client;
mod types;

pub use client::{DialogService, DEFAULT_URL, SERVICE_ID};
pub use types::{
    Conversation, ConversationData, ConversationMessage, ConverseRequest, Dialog, DialogContent,
    NameValue,
};
