//! # chatrelay
//!
//! `chatrelay` is an in-memory, real-time chat relay. Clients connect over
//! WebSockets, post messages and set reactions, and every change is fanned out
//! to every connected client.
//!
//! ## Core Modules
//!
//! - `relay`: the message store and the engine that dispatches client events
//!   and broadcasts their results.
//! - `session`: represents one connected WebSocket client.
//! - `config`: loads layered server configuration.
//! - `transport`: the wire protocol and the WebSocket server.
//! - `utils`: error taxonomy and logging setup.

pub mod config;
pub mod relay;
pub mod session;
pub mod transport;
pub mod utils;
