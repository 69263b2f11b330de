//! The `session` module defines one live connection between the relay and a
//! client.
//!
//! A `Session` holds the session id and the sending half of the per-connection
//! channel that the transport's write loop drains into the WebSocket.

pub mod session;
pub use session::{Session, SessionId};
