//! Relay engine
//!
//! This module contains the relay responsible for:
//! - owning the `RelayStore`
//! - tracking connected sessions
//! - translating inbound client events into store operations
//! - fanning the results out to every connected session
//!
//! Concurrency and usage notes:
//! - The API is synchronous and is held behind a single lock
//!   (`SharedRelay`) by the transport. One event is handled to completion,
//!   mutation and broadcast together, while that lock is held, so all sessions
//!   observe events in the same order.
//! - Broadcasting only queues frames on unbounded per-session channels and
//!   never awaits, so the lock is never held across network I/O.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::{debug, warn};

use crate::config::RelaySettings;
use crate::relay::message::{Message, MessageId, NewMessage, Reactions};
use crate::relay::seed::demo_messages;
use crate::relay::store::RelayStore;
use crate::session::{Session, SessionId};
use crate::transport::message::{ClientEvent, ReactionUpdate, ServerEvent};
use crate::utils::RelayError;

pub type SharedRelay = Arc<Mutex<Relay>>;

#[derive(Debug, Default)]
pub struct Relay {
    pub store: RelayStore,
    pub sessions: HashMap<SessionId, Session>,
    max_sessions: Option<usize>,
}

impl Relay {
    pub fn new(store: RelayStore) -> Self {
        Self {
            store,
            sessions: HashMap::new(),
            max_sessions: None,
        }
    }

    pub fn from_settings(settings: &RelaySettings) -> Self {
        let store = if settings.seed_demo_messages {
            RelayStore::with_seed(demo_messages(Utc::now()))
        } else {
            RelayStore::new()
        };
        let mut relay = Self::new(store.with_retention(settings.max_messages));
        relay.max_sessions = (settings.max_connections > 0).then_some(settings.max_connections);
        relay
    }

    pub fn into_shared(self) -> SharedRelay {
        Arc::new(Mutex::new(self))
    }

    pub fn register_session(&mut self, session: Session) -> Result<(), RelayError> {
        if let Some(max) = self.max_sessions {
            if self.sessions.len() >= max {
                return Err(RelayError::ConnectionLimit(max));
            }
        }
        self.sessions.insert(session.id.clone(), session);
        Ok(())
    }

    pub fn remove_session(&mut self, session_id: &SessionId) -> Option<Session> {
        self.sessions.remove(session_id)
    }

    /// Dispatch one inbound event and broadcast its outcome.
    ///
    /// An `update reactions` for an unknown id returns
    /// `RelayError::UnknownMessage` after doing nothing: no store change and
    /// no broadcast.
    pub fn handle(&mut self, event: ClientEvent) -> Result<(), RelayError> {
        debug!(event = event.name(), "dispatching event");
        match event {
            ClientEvent::GetMessages => self.get_messages(),
            ClientEvent::NewMessage(candidate) => self.new_message(candidate).map(|_| ()),
            ClientEvent::UpdateReactions(ReactionUpdate {
                message_id,
                reactions,
            }) => self.update_reactions(message_id, reactions).map(|_| ()),
        }
    }

    pub fn get_messages(&self) -> Result<(), RelayError> {
        self.broadcast(&ServerEvent::GetMessages(self.store.all()))
            .map(|_| ())
    }

    pub fn new_message(&mut self, candidate: NewMessage) -> Result<Message, RelayError> {
        let message = self.store.append(candidate);
        debug!(id = message.id, channel = %message.channel, "appended message");
        self.broadcast(&ServerEvent::NewMessage(self.store.all()))?;
        Ok(message)
    }

    pub fn update_reactions(
        &mut self,
        message_id: MessageId,
        reactions: Reactions,
    ) -> Result<Message, RelayError> {
        let updated = self
            .store
            .replace_reactions(message_id, reactions)
            .cloned()
            .ok_or(RelayError::UnknownMessage(message_id))?;
        self.broadcast(&ServerEvent::MessageUpdate(updated.clone()))?;
        Ok(updated)
    }

    /// Queue `event` on every connected session. Returns how many sessions
    /// accepted the frame; closed sessions are logged and skipped.
    pub fn broadcast(&self, event: &ServerEvent) -> Result<usize, RelayError> {
        let frame = event.to_frame()?;
        let mut delivered = 0;
        for (session_id, session) in &self.sessions {
            match session.send(frame.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => warn!(session = %session_id, "broadcast skipped: {e}"),
            }
        }
        debug!(event = event.name(), delivered, "broadcast");
        Ok(delivered)
    }

    /// Send `event` to one session only.
    pub fn send_to(&self, session_id: &SessionId, event: &ServerEvent) -> Result<(), RelayError> {
        match self.sessions.get(session_id) {
            Some(session) => session.send(event.to_frame()?),
            None => Err(RelayError::SessionClosed(session_id.clone())),
        }
    }
}
