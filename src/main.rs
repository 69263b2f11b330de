//! CLI for chatrelay
//!
//! Subcommands:
//! - `server`: run the WebSocket relay
//! - `client`: connect, optionally post a message, and print the snapshot
//!   (useful for smoke tests)

use std::time::Duration;

use chatrelay::config::load_config;
use chatrelay::relay::Relay;
use chatrelay::relay::message::NewMessage;
use chatrelay::transport::start_websocket_server;
use chatrelay::transport::{ClientEvent, ServerEvent};
use chatrelay::utils::{RelayError, logging};
use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "chatrelay", version, about = "Real-time chat relay")]
enum Command {
    /// Start the WebSocket relay
    Server,
    /// Run a one-shot client against a running relay
    Client {
        /// WebSocket URL of the relay
        #[arg(long, default_value = "ws://127.0.0.1:3030")]
        url: String,
        /// Channel to post to
        #[arg(long, default_value = "1")]
        channel: String,
        /// Account to post as
        #[arg(long, default_value = "0x0000000000000000000000000000000000000000")]
        account: String,
        /// Text to post; without it the client only fetches the snapshot
        #[arg(long)]
        text: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cmd = Command::parse();

    let result = match cmd {
        Command::Server => run_server().await,
        Command::Client {
            url,
            channel,
            account,
            text,
        } => {
            logging::init("info");
            let post = text.map(|text| NewMessage::new(&channel, &account, &text));
            run_client(&url, post).await
        }
    };

    if let Err(e) = result {
        // config may have failed before logging was set up
        logging::init("info");
        error!("chatrelay failed: {e}");
        std::process::exit(1);
    }
}

async fn run_server() -> Result<(), RelayError> {
    let settings = load_config()?;
    logging::init(&settings.log.level);

    let relay = Relay::from_settings(&settings.relay);
    info!(messages = relay.store.len(), "relay store ready");
    let relay = relay.into_shared();

    tokio::select! {
        res = start_websocket_server(settings.server.addr(), relay, settings.clone()) => {
            res?;
            error!("WebSocket relay exited unexpectedly.");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received. Exiting gracefully.");
        }
    }

    Ok(())
}

async fn run_client(url: &str, post: Option<NewMessage>) -> Result<(), RelayError> {
    let (mut ws_stream, _response) = connect_async(url).await?;

    if let Some(message) = post {
        ws_stream
            .send(ClientEvent::NewMessage(message).to_frame()?)
            .await?;
    }
    ws_stream.send(ClientEvent::GetMessages.to_frame()?).await?;

    // Print broadcasts until our own snapshot arrives
    loop {
        let frame = match tokio::time::timeout(Duration::from_secs(5), ws_stream.next()).await {
            Ok(Some(frame)) => frame?,
            Ok(None) => break,
            Err(_) => {
                info!("No snapshot within 5s, giving up");
                break;
            }
        };
        if let WsMessage::Text(text) = frame {
            println!("{text}");
            if let Ok(ServerEvent::GetMessages(messages)) = ServerEvent::from_text(text.as_str()) {
                info!(count = messages.len(), "received snapshot");
                break;
            }
        }
    }

    ws_stream.close(None).await?;
    Ok(())
}
