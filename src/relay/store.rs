//! Relay store
//!
//! The authoritative, process-lifetime sequence of messages. Messages are
//! only ever appended; the one post-creation mutation is a full replacement of
//! a message's reactions.
//!
//! Invariants:
//! - ids are strictly increasing in insertion order and never reused, even
//!   after retention has evicted older messages
//! - `timestamp` and `id` come from the store, never from the poster
//!
//! The store itself is not synchronized; the relay engine owns it and callers
//! reach it through the engine lock.

use std::collections::VecDeque;

use chrono::Utc;

use crate::relay::message::{Message, MessageId, NewMessage, Reactions};

#[derive(Debug, Default)]
pub struct RelayStore {
    messages: VecDeque<Message>,
    next_id: MessageId,
    retention: Option<usize>,
}

impl RelayStore {
    /// An empty, unbounded store. The first appended message gets id 0.
    pub fn new() -> Self {
        Self {
            messages: VecDeque::new(),
            next_id: 0,
            retention: None,
        }
    }

    /// A store pre-populated with `seed`. New ids start above the largest
    /// seeded id.
    pub fn with_seed(seed: Vec<Message>) -> Self {
        let next_id = seed.iter().map(|m| m.id + 1).max().unwrap_or(0);
        Self {
            messages: seed.into(),
            next_id,
            retention: None,
        }
    }

    /// Keep at most `max` messages, evicting the oldest first. `0` means
    /// unbounded.
    pub fn with_retention(mut self, max: usize) -> Self {
        self.retention = (max > 0).then_some(max);
        self.evict();
        self
    }

    pub fn append(&mut self, candidate: NewMessage) -> Message {
        let message = Message {
            id: self.next_id,
            channel: candidate.channel,
            account: candidate.account,
            text: candidate.text,
            timestamp: Utc::now(),
            message_timestamp_token_amount: candidate.message_timestamp_token_amount,
            reactions: Reactions::new(),
        };
        self.next_id += 1;
        self.messages.push_back(message.clone());
        self.evict();
        message
    }

    pub fn find_by_id(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// Overwrite the whole reaction map of message `id`. No merge with the
    /// previous reactions takes place.
    ///
    /// Keys are stored as supplied, but an account listed more than once under
    /// the same key is kept only once (first occurrence).
    pub fn replace_reactions(&mut self, id: MessageId, reactions: Reactions) -> Option<&Message> {
        let message = self.messages.iter_mut().find(|m| m.id == id)?;
        message.reactions = reactions.deduplicated();
        Some(message)
    }

    /// Snapshot of every message, oldest first.
    pub fn all(&self) -> Vec<Message> {
        self.messages.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The id the next appended message will receive.
    pub fn next_id(&self) -> MessageId {
        self.next_id
    }

    fn evict(&mut self) {
        if let Some(max) = self.retention {
            while self.messages.len() > max {
                self.messages.pop_front();
            }
        }
    }
}
