//! Wire protocol
//!
//! Every WebSocket text frame carries one event envelope of the form
//! `{"event": <name>, "data": <payload>}`. Event names contain spaces and are
//! shared with the browser front-end, so they must not change.

use serde::{Deserialize, Serialize};
use tungstenite::protocol::Message as WsMessage;

use crate::relay::message::{Message, MessageId, NewMessage, Reactions};
use crate::utils::RelayError;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    #[serde(rename = "get messages")]
    GetMessages,
    #[serde(rename = "new message")]
    NewMessage(NewMessage),
    #[serde(rename = "update reactions")]
    UpdateReactions(ReactionUpdate),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionUpdate {
    pub message_id: MessageId,
    pub reactions: Reactions,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// Full snapshot in answer to `get messages`.
    #[serde(rename = "get messages")]
    GetMessages(Vec<Message>),
    /// Full snapshot after an append.
    #[serde(rename = "new message")]
    NewMessage(Vec<Message>),
    /// The single message whose reactions changed.
    #[serde(rename = "message update")]
    MessageUpdate(Message),
    #[serde(rename = "error")]
    Error { message: String },
}

impl ClientEvent {
    pub fn from_text(text: &str) -> Result<Self, RelayError> {
        serde_json::from_str(text).map_err(RelayError::MalformedEvent)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::GetMessages => "get messages",
            ClientEvent::NewMessage(_) => "new message",
            ClientEvent::UpdateReactions(_) => "update reactions",
        }
    }

    pub fn to_frame(&self) -> Result<WsMessage, RelayError> {
        let json = serde_json::to_string(self).map_err(RelayError::Serialize)?;
        Ok(WsMessage::text(json))
    }
}

impl ServerEvent {
    pub fn from_text(text: &str) -> Result<Self, RelayError> {
        serde_json::from_str(text).map_err(RelayError::MalformedEvent)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::GetMessages(_) => "get messages",
            ServerEvent::NewMessage(_) => "new message",
            ServerEvent::MessageUpdate(_) => "message update",
            ServerEvent::Error { .. } => "error",
        }
    }

    /// Serialize once into a frame that can be cloned to every session.
    pub fn to_frame(&self) -> Result<WsMessage, RelayError> {
        let json = serde_json::to_string(self).map_err(RelayError::Serialize)?;
        Ok(WsMessage::text(json))
    }
}
