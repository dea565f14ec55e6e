//! Store capability and the in-memory backend
//!
//! The store supplies the authoritative per-room sequence counter and the
//! durable, bounded message history. `MemoryStore` implements the same
//! counter-plus-trimmed-list semantics a Redis backend would provide with
//! INCR, LPUSH + LTRIM and LRANGE, so a real backend can slot in behind the
//! trait unchanged.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use thiserror::Error;

use crate::message::Message;

/// Persistence backend failure.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend rejected or could not complete the operation
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Persistence capability: per-room monotonic sequence IDs and
/// most-recent-N message history.
#[async_trait]
pub trait Store: Send + Sync {
    /// Allocate the next sequence ID for `room`, strictly greater than every
    /// ID previously returned for that room name.
    async fn next_message_id(&self, room: &str) -> Result<u64, StoreError>;

    /// Persist `msg` under `room`, evicting the oldest entries beyond the
    /// retention limit.
    async fn add_message(&self, room: &str, msg: &Message) -> Result<(), StoreError>;

    /// Retained history for `room`, oldest first. Empty for a room with no
    /// history.
    async fn get_messages(&self, room: &str) -> Result<Vec<Message>, StoreError>;
}

#[derive(Default)]
struct RoomHistory {
    next_id: u64,
    messages: VecDeque<Message>,
}

/// In-memory `Store` with trim-on-write retention.
pub struct MemoryStore {
    max_messages_per_room: usize,
    rooms: Mutex<HashMap<String, RoomHistory>>,
}

impl MemoryStore {
    pub fn new(max_messages_per_room: usize) -> Self {
        Self {
            max_messages_per_room,
            rooms: Mutex::new(HashMap::new()),
        }
    }

    fn with_room<T>(&self, room: &str, f: impl FnOnce(&mut RoomHistory) -> T) -> T {
        let mut rooms = self.rooms.lock().unwrap_or_else(PoisonError::into_inner);
        f(rooms.entry(room.to_string()).or_default())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn next_message_id(&self, room: &str) -> Result<u64, StoreError> {
        Ok(self.with_room(room, |history| {
            history.next_id += 1;
            history.next_id
        }))
    }

    async fn add_message(&self, room: &str, msg: &Message) -> Result<(), StoreError> {
        let max = self.max_messages_per_room;
        self.with_room(room, |history| {
            history.messages.push_back(msg.clone());
            while history.messages.len() > max {
                history.messages.pop_front();
            }
        });
        Ok(())
    }

    async fn get_messages(&self, room: &str) -> Result<Vec<Message>, StoreError> {
        let rooms = self.rooms.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(rooms
            .get(room)
            .map(|history| history.messages.iter().cloned().collect())
            .unwrap_or_default())
    }
}
