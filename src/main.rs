//! Multi-Room WebSocket Chat Server - Entry Point
//!
//! Starts the TCP listener, wires the chat coordinator to its store,
//! and accepts connections.

use std::env;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use chat_rooms::{handle_connection, Chat, MemoryStore};

/// Default server address
const DEFAULT_ADDR: &str = "127.0.0.1:3000";

/// Default per-room history retention
const DEFAULT_MAX_MESSAGES_PER_ROOM: usize = 100;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=chat_rooms=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("chat_rooms=info")),
        )
        .init();

    // Bind address from command line, then CHAT_ADDR, then the default
    let addr = env::args()
        .nth(1)
        .or_else(|| env::var("CHAT_ADDR").ok())
        .unwrap_or_else(|| DEFAULT_ADDR.to_string());

    let max_messages = match env::var("MAX_MESSAGES_PER_ROOM") {
        Ok(raw) => raw.parse()?,
        Err(_) => DEFAULT_MAX_MESSAGES_PER_ROOM,
    };

    let store = Arc::new(MemoryStore::new(max_messages));
    let chat = Arc::new(Chat::new(store));

    let listener = TcpListener::bind(&addr).await?;
    info!(
        "chat server listening on {} (retaining {} messages per room)",
        addr, max_messages
    );

    // Connection accept loop
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                info!("new connection from {}", peer);
                let chat = chat.clone();

                // Spawn handler task for each connection
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, chat).await {
                        error!("connection handler error: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("failed to accept connection: {}", e);
            }
        }
    }
}
