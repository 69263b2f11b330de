//! The relay: the authoritative message list and the fan-out of every change
//! to all connected sessions.
//!
//! Public types:
//! - `RelayStore`: ordered, append-only message sequence with lookup by id
//! - `Relay`: store plus session registry, dispatching client events

pub mod engine;
pub mod message;
pub mod seed;
pub mod store;

pub use engine::{Relay, SharedRelay};
pub use store::RelayStore;
