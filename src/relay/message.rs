//! Message definitions for the relay
//!
//! `Message` is both the stored representation and the wire shape sent to
//! clients. Field names are camelCase on the wire.
//!
//! Notes on fields:
//! - `id`: assigned by the store on append, strictly increasing, never reused
//! - `timestamp`: set by the store on append; client-supplied values are ignored
//! - `message_timestamp_token_amount`: opaque token balance snapshot; the relay
//!   stores whatever the poster supplied and never computes it
//! - `reactions`: the only field that changes after creation

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Number;

pub type MessageId = u64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub channel: String,
    pub account: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub message_timestamp_token_amount: Option<Number>,
    #[serde(default)]
    pub reactions: Reactions,
}

/// The client-supplied part of a message posted with `new message`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    pub channel: String,
    pub account: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_timestamp_token_amount: Option<Number>,
}

impl NewMessage {
    pub fn new(channel: &str, account: &str, text: &str) -> Self {
        Self {
            channel: channel.to_string(),
            account: account.to_string(),
            text: text.to_string(),
            message_timestamp_token_amount: None,
        }
    }
}

/// Reaction key (usually an emoji) mapped to the accounts that applied it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Reactions(BTreeMap<String, Vec<String>>);

impl Reactions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `account` under `key`. Adding the same account twice is a no-op.
    pub fn add(&mut self, key: &str, account: &str) {
        let accounts = self.0.entry(key.to_string()).or_default();
        if !accounts.iter().any(|a| a == account) {
            accounts.push(account.to_string());
        }
    }

    pub fn accounts(&self, key: &str) -> Option<&[String]> {
        self.0.get(key).map(Vec::as_slice)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Collapse repeated accounts within each key, keeping first occurrences.
    /// Keys and their order of accounts are otherwise left untouched.
    pub fn deduplicated(self) -> Self {
        let map = self
            .0
            .into_iter()
            .map(|(key, accounts)| {
                let mut unique: Vec<String> = Vec::with_capacity(accounts.len());
                for account in accounts {
                    if !unique.contains(&account) {
                        unique.push(account);
                    }
                }
                (key, unique)
            })
            .collect();
        Self(map)
    }
}

impl From<BTreeMap<String, Vec<String>>> for Reactions {
    fn from(map: BTreeMap<String, Vec<String>>) -> Self {
        Self(map)
    }
}
