//! Session representation
//!
//! The relay pushes outbound frames into `sender`; nothing here blocks, so a
//! slow client never stalls a broadcast. Once the write loop has gone away a
//! send fails and the caller decides what to log.

use std::net::SocketAddr;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc::UnboundedSender;
use tungstenite::protocol::Message as WsMessage;
use uuid::Uuid;

use crate::utils::RelayError;

pub type SessionId = String;

#[derive(Debug)]
pub struct Session {
    pub id: SessionId,
    pub sender: UnboundedSender<WsMessage>,
    pub peer: Option<SocketAddr>,
    pub connected_at: DateTime<Utc>,
}

impl Session {
    /// Create a new session around a sender channel, with a fresh UUID-based id.
    pub fn new(sender: UnboundedSender<WsMessage>) -> Self {
        Self {
            id: format!("session-{}", Uuid::new_v4()),
            sender,
            peer: None,
            connected_at: Utc::now(),
        }
    }

    pub fn with_peer(mut self, peer: SocketAddr) -> Self {
        self.peer = Some(peer);
        self
    }

    /// Queue a frame for this session. Fire-and-forget: there is no delivery
    /// acknowledgement.
    pub fn send(&self, frame: WsMessage) -> Result<(), RelayError> {
        self.sender
            .send(frame)
            .map_err(|_| RelayError::SessionClosed(self.id.clone()))
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}
