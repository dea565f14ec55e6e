//! Multi-Room WebSocket Chat Server Library
//!
//! A chat-room coordinator built on tokio: rooms are created lazily on the
//! first join for a name and destroyed when their last member leaves, every
//! posted message gets a persistent per-room sequence number, and messages
//! and presence updates fan out to room members as fire-and-forget tasks.
//!
//! # Features
//! - Multi-room membership keyed by connection identity
//! - Markdown posts rendered to sanitized HTML
//! - Persistent, bounded per-room message history with replay on join
//! - Live member-count updates
//! - Author echo with the `approve` flag for submit confirmation
//!
//! # Architecture
//! Two independent lock domains keep the hot paths short:
//! - [`Chat`] guards the room registry with one readers-writer lock
//!   (exclusive for join/leave, shared for posts)
//! - each [`Room`] guards its own member set, so unrelated rooms never
//!   contend
//!
//! Delivery side effects (broadcasts, count updates, history pushes) are
//! spawned tasks that the triggering call never awaits: a successful post
//! means "persisted", not "delivered". The transport and persistence sides
//! are capability traits ([`Connection`], [`Store`]) implemented by the
//! WebSocket adapter and the bundled in-memory store.
//!
//! # Example
//! ```ignore
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//! use chat_rooms::{handle_connection, Chat, MemoryStore};
//!
//! #[tokio::main]
//! async fn main() {
//!     let chat = Arc::new(Chat::new(Arc::new(MemoryStore::new(100))));
//!     let listener = TcpListener::bind("127.0.0.1:3000").await.unwrap();
//!
//!     while let Ok((stream, _)) = listener.accept().await {
//!         tokio::spawn(handle_connection(stream, chat.clone()));
//!     }
//! }
//! ```

pub mod chat;
pub mod connection;
pub mod error;
pub mod handler;
pub mod message;
pub mod render;
pub mod room;
pub mod store;

// Re-export main types for convenience
pub use chat::Chat;
pub use connection::{Connection, ConnectionRef};
pub use error::{ChatError, SessionError};
pub use handler::{handle_connection, WsConnection};
pub use message::{ClientText, Message, ServerEvent};
pub use render::render;
pub use room::Room;
pub use store::{MemoryStore, Store, StoreError};
