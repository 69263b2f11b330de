use crate::config::RelaySettings;
use crate::relay::{Relay, RelayStore, SharedRelay};
use crate::transport::message::ServerEvent;
use crate::transport::websocket::{ConnectionOptions, bind, serve};
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn start(relay: Relay, options: ConnectionOptions) -> (String, SharedRelay) {
    let relay = relay.into_shared();
    let listener = bind("127.0.0.1:0").await.expect("bind");
    let url = format!("ws://{}", listener.local_addr().unwrap());
    tokio::spawn(serve(listener, relay.clone(), options));
    (url, relay)
}

async fn wait_for_sessions(relay: &SharedRelay, count: usize) {
    for _ in 0..100 {
        if relay.lock().unwrap().sessions.len() == count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("relay never reached {count} sessions");
}

async fn send(client: &mut Client, event: serde_json::Value) {
    client
        .send(WsMessage::Text(event.to_string().into()))
        .await
        .expect("send event");
}

async fn recv(client: &mut Client) -> ServerEvent {
    let frame = tokio::time::timeout(Duration::from_secs(2), client.next())
        .await
        .expect("timed out waiting for event")
        .expect("stream ended")
        .expect("read error");
    ServerEvent::from_text(frame.to_text().unwrap()).unwrap()
}

#[tokio::test]
async fn test_end_to_end_fan_out() {
    let (url, relay) = start(Relay::new(RelayStore::new()), ConnectionOptions::default()).await;
    let (mut alice, _) = connect_async(url.as_str()).await.expect("alice connect");
    let (mut bob, _) = connect_async(url.as_str()).await.expect("bob connect");
    wait_for_sessions(&relay, 2).await;

    send(
        &mut alice,
        json!({ "event": "new message", "data": { "channel": "1", "account": "0xAA", "text": "hi" } }),
    )
    .await;

    for client in [&mut alice, &mut bob] {
        match recv(client).await {
            ServerEvent::NewMessage(messages) => {
                assert_eq!(messages.len(), 1);
                assert_eq!(messages[0].id, 0);
                assert_eq!(messages[0].account, "0xAA");
            }
            other => panic!("Expected new message, got {other:?}"),
        }
    }

    // An unknown id produces nothing; the next broadcast is the real update.
    send(
        &mut bob,
        json!({ "event": "update reactions", "data": { "messageId": 99, "reactions": { "👎": ["0xBB"] } } }),
    )
    .await;
    send(
        &mut bob,
        json!({ "event": "update reactions", "data": { "messageId": 0, "reactions": { "👍": ["0xAA"] } } }),
    )
    .await;

    for client in [&mut alice, &mut bob] {
        match recv(client).await {
            ServerEvent::MessageUpdate(message) => {
                assert_eq!(message.id, 0);
                assert_eq!(message.reactions.accounts("👍").unwrap(), ["0xAA"]);
                assert!(!message.reactions.contains_key("👎"));
            }
            other => panic!("Expected message update, got {other:?}"),
        }
    }

    send(&mut alice, json!({ "event": "get messages" })).await;
    for client in [&mut alice, &mut bob] {
        match recv(client).await {
            ServerEvent::GetMessages(messages) => assert_eq!(messages.len(), 1),
            other => panic!("Expected get messages, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_malformed_event_keeps_session_open() {
    let (url, relay) = start(Relay::new(RelayStore::new()), ConnectionOptions::default()).await;
    let (mut client, _) = connect_async(url.as_str()).await.expect("connect");
    wait_for_sessions(&relay, 1).await;

    client
        .send(WsMessage::Text("definitely not json".into()))
        .await
        .unwrap();
    send(&mut client, json!({ "event": "get messages" })).await;

    match recv(&mut client).await {
        ServerEvent::GetMessages(messages) => assert!(messages.is_empty()),
        other => panic!("Expected get messages, got {other:?}"),
    }
}

#[tokio::test]
async fn test_disconnect_removes_session() {
    let (url, relay) = start(Relay::new(RelayStore::new()), ConnectionOptions::default()).await;
    let (mut client, _) = connect_async(url.as_str()).await.expect("connect");
    wait_for_sessions(&relay, 1).await;

    client.close(None).await.expect("close");
    wait_for_sessions(&relay, 0).await;
}

#[tokio::test]
async fn test_connection_limit_refuses_extra_session() {
    let relay = Relay::from_settings(&RelaySettings {
        seed_demo_messages: false,
        max_messages: 0,
        max_connections: 1,
        report_errors: false,
    });
    let (url, relay) = start(relay, ConnectionOptions::default()).await;
    let (_first, _) = connect_async(url.as_str()).await.expect("first connect");
    wait_for_sessions(&relay, 1).await;

    let (mut second, _) = connect_async(url.as_str()).await.expect("second connect");
    let frame = tokio::time::timeout(Duration::from_secs(2), second.next())
        .await
        .expect("timed out waiting for close");
    assert!(matches!(frame, Some(Ok(WsMessage::Close(_))) | None | Some(Err(_))));
    assert_eq!(relay.lock().unwrap().sessions.len(), 1);
}

#[tokio::test]
async fn test_disallowed_origin_is_rejected() {
    let options = ConnectionOptions {
        allowed_origin: Some("http://localhost:5173".to_string()),
        report_errors: false,
    };
    let (url, _relay) = start(Relay::new(RelayStore::new()), options).await;

    let mut request = url.as_str().into_client_request().unwrap();
    request
        .headers_mut()
        .insert("Origin", "http://evil.example".parse().unwrap());
    assert!(connect_async(request).await.is_err());

    let mut request = url.as_str().into_client_request().unwrap();
    request
        .headers_mut()
        .insert("Origin", "http://localhost:5173".parse().unwrap());
    assert!(connect_async(request).await.is_ok());
}

#[tokio::test]
async fn test_client_close_gets_close_reply() {
    let (url, relay) = start(Relay::new(RelayStore::new()), ConnectionOptions::default()).await;
    let (mut client, _) = connect_async(url.as_str()).await.expect("connect");
    wait_for_sessions(&relay, 1).await;

    client.send(WsMessage::Close(None)).await.expect("send close");
    let reply = tokio::time::timeout(Duration::from_secs(2), client.next())
        .await
        .expect("timed out waiting for close reply");
    match reply {
        Some(Ok(WsMessage::Close(_))) => {}
        other => panic!("Expected a Close frame, got {other:?}"),
    }
    wait_for_sessions(&relay, 0).await;
}
