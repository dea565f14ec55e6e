//! WebSocket connection handler
//!
//! Bridges one WebSocket session onto the chat core: the HTTP request path
//! names the room, every inbound frame is a `{"text": ...}` post, and
//! outbound traffic flows through a bounded channel so a slow peer never
//! blocks a broadcast.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tokio_tungstenite::tungstenite::Message as WsFrame;
use tracing::{debug, error, info, warn};

use crate::chat::Chat;
use crate::connection::{Connection, ConnectionRef};
use crate::error::SessionError;
use crate::message::{ClientText, Message, ServerEvent};

/// Largest accepted WebSocket payload, in bytes
const MAX_PAYLOAD_BYTES: usize = 10_000;

/// Outbound events buffered per connection before drops kick in
const SEND_BUFFER_SIZE: usize = 64;

/// `Connection` implementation backed by a bounded channel to the session's
/// write task.
///
/// Sends never block: when the buffer is full the event is dropped. A
/// stalled peer is this adapter's problem, not the broadcasting room's.
pub struct WsConnection {
    events: mpsc::Sender<ServerEvent>,
}

impl WsConnection {
    fn push(&self, event: ServerEvent) {
        if self.events.try_send(event).is_err() {
            debug!("outbound buffer full or closed, dropping event");
        }
    }

    fn send_error(&self, err: &dyn std::fmt::Display) {
        self.push(ServerEvent::Error(err.to_string()));
    }
}

impl Connection for WsConnection {
    fn send_message(&self, msg: Message) {
        self.push(ServerEvent::Message(msg));
    }

    fn send_messages(&self, msgs: Vec<Message>) {
        self.push(ServerEvent::Messages(msgs));
    }

    fn send_clients_count(&self, count: usize) {
        self.push(ServerEvent::ClientsCount(count));
    }
}

/// Handle a new TCP connection for its whole lifetime.
///
/// Performs the WebSocket handshake (capturing the request path as the room
/// name), registers the connection with the chat, then pumps frames until
/// the peer goes away. The connection is removed from its room on exit.
pub async fn handle_connection(stream: TcpStream, chat: Arc<Chat>) -> Result<(), SessionError> {
    let peer_addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    debug!("new TCP connection from {}", peer_addr);

    let mut room = String::new();
    let capture_path = |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
        room = req.uri().path().to_string();
        Ok(resp)
    };

    let mut config = WebSocketConfig::default();
    config.max_message_size = Some(MAX_PAYLOAD_BYTES);

    let ws_stream =
        tokio_tungstenite::accept_hdr_async_with_config(stream, capture_path, Some(config))
            .await?;
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    info!("client {} connected to room {:?}", peer_addr, room);

    // Channel between Connection sends and the write task
    let (event_tx, mut event_rx) = mpsc::channel::<ServerEvent>(SEND_BUFFER_SIZE);
    let ws_conn = Arc::new(WsConnection { events: event_tx });
    let conn: ConnectionRef = ws_conn.clone();

    chat.new_client(&room, conn.clone());

    // Write task (ServerEvent -> WebSocket); ends when every sender is gone
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(json) => {
                    if ws_sender.send(WsFrame::Text(json.into())).await.is_err() {
                        debug!("WebSocket send failed, ending write task");
                        break;
                    }
                }
                Err(e) => {
                    error!("failed to serialize event: {}", e);
                    // Continue - don't break on serialization errors
                }
            }
        }
        let _ = ws_sender.close().await;
        debug!("write task ended");
    });

    // Read loop (WebSocket -> Chat)
    while let Some(frame) = ws_receiver.next().await {
        match frame {
            Ok(WsFrame::Text(text)) => match serde_json::from_str::<ClientText>(&text) {
                Ok(post) => {
                    if let Err(e) = chat.new_message(&room, &conn, &post.text).await {
                        warn!("post from {} to room {:?} failed: {}", peer_addr, room, e);
                        ws_conn.send_error(&e);
                    }
                }
                Err(e) => {
                    warn!("invalid JSON from {}: {}", peer_addr, e);
                    ws_conn.send_error(&e);
                }
            },
            Ok(WsFrame::Close(_)) => {
                debug!("client {} sent close frame", peer_addr);
                break;
            }
            Ok(WsFrame::Ping(_)) | Ok(WsFrame::Pong(_)) => {
                // Pong is handled automatically by tungstenite
            }
            Ok(_) => {
                // Binary or other frame types - ignore
            }
            Err(e) => {
                error!("WebSocket error for {}: {}", peer_addr, e);
                break;
            }
        }
    }

    if let Err(e) = chat.remove_client(&room, &conn) {
        warn!("failed to remove {} from room {:?}: {}", peer_addr, room, e);
    }

    info!("client {} disconnected from room {:?}", peer_addr, room);

    Ok(())
}
