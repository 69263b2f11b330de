//! Error types used across the relay.
//!
//! Nothing here is ever surfaced to clients as a protocol failure: per-event
//! errors are logged by the session loop and the event is dropped. The only
//! client-visible form is the optional `error` diagnostic (see
//! `relay.report_errors`).

use thiserror::Error;

use crate::relay::message::MessageId;
use crate::session::SessionId;

#[derive(Debug, Error)]
pub enum RelayError {
    /// Inbound frame was not a recognised event envelope.
    #[error("malformed event: {0}")]
    MalformedEvent(#[source] serde_json::Error),

    #[error("failed to serialize outbound event: {0}")]
    Serialize(#[source] serde_json::Error),

    /// `update reactions` named a message the store does not hold.
    #[error("no message with id {0}")]
    UnknownMessage(MessageId),

    #[error("session {0} is closed")]
    SessionClosed(SessionId),

    #[error("origin {0:?} is not allowed")]
    OriginRejected(Option<String>),

    #[error("connection limit of {0} sessions reached")]
    ConnectionLimit(usize),

    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl RelayError {
    /// Whether the error only affects the single event that caused it.
    pub fn is_per_event(&self) -> bool {
        matches!(
            self,
            RelayError::MalformedEvent(_) | RelayError::UnknownMessage(_)
        )
    }
}
