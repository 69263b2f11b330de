//! Demo conversation loaded at startup when `relay.seed_demo_messages` is set.

use chrono::{DateTime, Utc};
use serde_json::Number;

use crate::relay::message::{Message, Reactions};

/// One whole token in its smallest unit (18 decimals).
const ONE_TOKEN: u64 = 1_000_000_000_000_000_000;

const SEED: [(&str, &str, &str); 9] = [
    (
        "1",
        "0xcA8Fa8f0b631EcdB18Cda619C4Fc9d197c8aFfCa",
        "Welcome to AlphaPING!",
    ),
    (
        "2",
        "0xcA8Fa8f0b631EcdB18Cda619C4Fc9d197c8aFfCa",
        "Welcome to AlphaPING everyone! My name is John and I've been a blockchain developer for 2+ years.",
    ),
    ("1", "0x1b3cB81E51011b549d78bf720b0d924ac763A7C2", "Hello everyone!"),
    (
        "2",
        "0x1b3cB81E51011b549d78bf720b0d924ac763A7C2",
        "Hey there! My name is Ann and I'm an aspiring blockchain developer!",
    ),
    ("1", "0x701C484bfb40ac628aFA487b6082f084B14AF0BD", "Hey everyone!"),
    (
        "1",
        "0x189B9cBd4AfF470aF2C0102f365FC1823d857965",
        "Hey there, great to be here!",
    ),
    (
        "1",
        "0x176F3DAb24a159341c0509bB36B833E7fdd0a132",
        "Hope everyone is having a good day ;)",
    ),
    ("1", "0x828103B231B39ffFCe028562412B3c04A4640e64", "Hello!"),
    (
        "1",
        "0x176F3DAb24a159341c0509bB36B833E7fdd0a132",
        "Does anyone have any tips on becoming a blockchain developer?",
    ),
];

/// Build the demo messages (ids 0 to 8), all stamped with `now`.
pub fn demo_messages(now: DateTime<Utc>) -> Vec<Message> {
    SEED.iter()
        .enumerate()
        .map(|(id, (channel, account, text))| Message {
            id: id as u64,
            channel: channel.to_string(),
            account: account.to_string(),
            text: text.to_string(),
            timestamp: now,
            message_timestamp_token_amount: Some(Number::from(ONE_TOKEN)),
            reactions: Reactions::new(),
        })
        .collect()
}
