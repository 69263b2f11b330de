//! WebSocket transport
//!
//! This file implements the WebSocket server that translates protocol JSON
//! events into relay operations. Responsibilities:
//! - Accept TCP/WebSocket connections, refusing foreign origins when an
//!   allowed origin is configured
//! - Create a `Session` for each connection and register it with the `Relay`
//! - Run one write loop per session draining its channel into the socket
//! - Parse inbound frames and hand them to the relay, one event at a time
//!
//! Malformed events are dropped with a warning. They never close the session
//! and never reach the store.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, MutexGuard, PoisonError};

use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::spawn;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_hdr_async;
use tracing::{debug, info, warn};
use tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tungstenite::http::StatusCode;
use tungstenite::protocol::Message as WsMessage;

use crate::config::Settings;
use crate::relay::{Relay, SharedRelay};
use crate::session::{Session, SessionId};
use crate::transport::message::{ClientEvent, ServerEvent};
use crate::utils::RelayError;

/// Per-connection options taken from `Settings`.
#[derive(Debug, Clone, Default)]
pub struct ConnectionOptions {
    pub allowed_origin: Option<String>,
    pub report_errors: bool,
}

impl From<&Settings> for ConnectionOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            allowed_origin: settings.server.allowed_origin.clone(),
            report_errors: settings.relay.report_errors,
        }
    }
}

pub async fn bind(addr: &str) -> Result<TcpListener, RelayError> {
    let listener = TcpListener::bind(addr).await?;
    info!("WebSocket relay listening on ws://{}", listener.local_addr()?);
    Ok(listener)
}

pub async fn start_websocket_server(
    addr: String,
    relay: SharedRelay,
    settings: Settings,
) -> Result<(), RelayError> {
    let listener = bind(&addr).await?;
    serve(listener, relay, ConnectionOptions::from(&settings)).await;
    Ok(())
}

/// Accept connections forever, one task per connection.
pub async fn serve(listener: TcpListener, relay: SharedRelay, options: ConnectionOptions) {
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!("Failed to accept connection: {e}");
                continue;
            }
        };
        let relay = relay.clone();
        let options = options.clone();
        spawn(async move {
            if let Err(e) = handle_connection(stream, peer, relay, options).await {
                warn!(%peer, "Connection ended with error: {e}");
            }
        });
    }
}

/// Whether a handshake with `origin` may proceed. With no allowed origin
/// configured every client is accepted, including ones sending no header.
pub fn origin_allowed(allowed: Option<&str>, origin: Option<&str>) -> bool {
    match allowed {
        None => true,
        Some(allowed) => origin == Some(allowed),
    }
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    relay: SharedRelay,
    options: ConnectionOptions,
) -> Result<(), RelayError> {
    let allowed = options.allowed_origin.clone();
    let check_origin = move |req: &Request, resp: Response| {
        let origin = req
            .headers()
            .get("origin")
            .and_then(|value| value.to_str().ok());
        if origin_allowed(allowed.as_deref(), origin) {
            Ok(resp)
        } else {
            let e = RelayError::OriginRejected(origin.map(str::to_string));
            warn!(%peer, "Rejected handshake: {e}");
            let mut denied = ErrorResponse::new(Some(e.to_string()));
            *denied.status_mut() = StatusCode::FORBIDDEN;
            Err(denied)
        }
    };

    let ws_stream = accept_hdr_async(stream, check_origin).await?;
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<WsMessage>();
    let session = Session::new(tx).with_peer(peer);
    let session_id = session.id.clone();

    let registered = lock(&relay).register_session(session);
    if let Err(e) = registered {
        warn!(%peer, "Refusing session: {e}");
        ws_sender.send(WsMessage::Close(None)).await?;
        return Err(e);
    }
    info!(session = %session_id, %peer, "session connected");

    let cleanup_called = Arc::new(AtomicBool::new(false));
    let do_cleanup = {
        let relay = relay.clone();
        let session_id = session_id.clone();
        let cleanup_called = cleanup_called.clone();

        move || {
            if !cleanup_called.swap(true, Ordering::SeqCst) {
                if let Some(session) = lock(&relay).remove_session(&session_id) {
                    let connected_secs = (Utc::now() - session.connected_at).num_seconds();
                    info!(
                        session = %session_id,
                        peer = ?session.peer,
                        connected_secs,
                        "session disconnected"
                    );
                }
            }
        }
    };

    {
        let session_id = session_id.clone();
        let do_cleanup = do_cleanup.clone();

        spawn(async move {
            while let Some(frame) = rx.recv().await {
                if let Err(e) = ws_sender.send(frame).await {
                    warn!(session = %session_id, "Failed to send frame: {e}");
                    break;
                }
            }
            // flushes the queued Close reply when the peer started the close
            if let Err(e) = ws_sender.close().await {
                debug!(session = %session_id, "Close handshake incomplete: {e}");
            }
            do_cleanup();
            debug!(session = %session_id, "send loop closed");
        });
    }

    while let Some(frame) = ws_receiver.next().await {
        match frame {
            Ok(WsMessage::Text(text)) => {
                handle_frame(&relay, &session_id, text.as_str(), options.report_errors);
            }
            Ok(WsMessage::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(session = %session_id, "Read error: {e}");
                break;
            }
        }
    }

    do_cleanup();
    Ok(())
}

/// Parse one inbound text frame and dispatch it under the relay lock.
///
/// Failures stay local to the event: unknown message ids are dropped quietly,
/// malformed frames are logged and, when `report_errors` is set, answered with
/// an `error` event to the sender only.
pub fn handle_frame(relay: &SharedRelay, session_id: &SessionId, text: &str, report_errors: bool) {
    let event = match ClientEvent::from_text(text) {
        Ok(event) => event,
        Err(e) => {
            warn!(
                session = %session_id,
                "Invalid client event: {e} | {}",
                text.chars().take(100).collect::<String>()
            );
            if report_errors {
                let reply = ServerEvent::Error {
                    message: e.to_string(),
                };
                if let Err(e) = lock(relay).send_to(session_id, &reply) {
                    debug!(session = %session_id, "Could not report error: {e}");
                }
            }
            return;
        }
    };

    match lock(relay).handle(event) {
        Ok(()) => {}
        Err(e) if e.is_per_event() => debug!(session = %session_id, "Event dropped: {e}"),
        Err(e) => warn!(session = %session_id, "Event failed: {e}"),
    }
}

fn lock(relay: &SharedRelay) -> MutexGuard<'_, Relay> {
    relay.lock().unwrap_or_else(PoisonError::into_inner)
}
