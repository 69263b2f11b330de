//! The `transport` module handles network communication with clients over
//! WebSockets.
//!
//! It defines the event envelopes exchanged with clients and the server that
//! accepts connections, parses inbound events and forwards them to the relay.

pub mod message;
pub mod websocket;

pub use message::{ClientEvent, ReactionUpdate, ServerEvent};
pub use websocket::{bind, handle_frame, serve, start_websocket_server};

#[cfg(test)]
mod websocket_tests;
