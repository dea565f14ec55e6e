//! Chat registry and orchestration
//!
//! The top-level map from room names to rooms. Join and leave take the
//! registry lock exclusively since they may create or delete a room; posting
//! only looks a room up and takes the lock shared. Each room then guards its
//! own member set, so unrelated rooms never contend.
//!
//! Delivery side effects run as spawned tasks the caller never awaits:
//! success from [`Chat::new_message`] means "persisted", not "delivered".

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info, warn};

use crate::connection::ConnectionRef;
use crate::error::ChatError;
use crate::message::Message;
use crate::render;
use crate::room::Room;
use crate::store::Store;

/// Top-level chat coordinator.
///
/// Owns every [`Room`]; no other component creates or destroys one. Rooms
/// exist only while they have members: created on the first join for a name,
/// deleted on the leave that empties them.
pub struct Chat {
    store: Arc<dyn Store>,
    rooms: RwLock<HashMap<String, Arc<Room>>>,
}

impl Chat {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            rooms: RwLock::new(HashMap::new()),
        }
    }

    /// Add `conn` to the named room, creating the room on first join.
    ///
    /// Two detached tasks are dispatched: the updated member count goes to
    /// every current member, and any persisted history goes to `conn` alone.
    /// The tasks are unordered with respect to each other and to concurrent
    /// live broadcasts; a history fetch failure only costs the joiner its
    /// replay and is not surfaced.
    pub fn new_client(&self, room: &str, conn: ConnectionRef) {
        let r = {
            let mut rooms = self.rooms.write().unwrap_or_else(PoisonError::into_inner);
            let r = rooms
                .entry(room.to_string())
                .or_insert_with(|| Arc::new(Room::new(room)))
                .clone();
            r.new_client(conn.clone());
            r
        };

        info!("client joined room {:?}", room);

        tokio::spawn({
            let r = r.clone();
            async move {
                r.broadcast_clients_count();
            }
        });

        let store = self.store.clone();
        let room = room.to_string();
        tokio::spawn(async move {
            match store.get_messages(&room).await {
                Ok(msgs) if !msgs.is_empty() => conn.send_messages(msgs),
                Ok(_) => {}
                Err(e) => warn!("history fetch for room {:?} failed: {}", room, e),
            }
        });
    }

    /// Remove `conn` from the named room.
    ///
    /// The room is deleted when its last member leaves; otherwise the
    /// remaining members get the updated count, asynchronously.
    pub fn remove_client(&self, room: &str, conn: &ConnectionRef) -> Result<(), ChatError> {
        let survivor = {
            let mut rooms = self.rooms.write().unwrap_or_else(PoisonError::into_inner);
            let r = rooms
                .get(room)
                .cloned()
                .ok_or_else(|| ChatError::RoomNotFound(room.to_string()))?;

            r.remove_client(conn);

            if r.clients_count() == 0 {
                rooms.remove(room);
                debug!("room {:?} deleted (empty)", room);
                None
            } else {
                Some(r)
            }
        };

        info!("client left room {:?}", room);

        if let Some(r) = survivor {
            tokio::spawn(async move {
                r.broadcast_clients_count();
            });
        }

        Ok(())
    }

    /// Post `text` to the named room on behalf of `from`.
    ///
    /// The text is rendered to sanitized markup, the room's next sequence ID
    /// is allocated, and the message is persisted; only then is the broadcast
    /// dispatched, without waiting for delivery. A store failure aborts the
    /// post, and an ID allocated before a failed persist is not reclaimed.
    pub async fn new_message(
        &self,
        room: &str,
        from: &ConnectionRef,
        text: &str,
    ) -> Result<(), ChatError> {
        let r = {
            let rooms = self.rooms.read().unwrap_or_else(PoisonError::into_inner);
            rooms
                .get(room)
                .cloned()
                .ok_or_else(|| ChatError::RoomNotFound(room.to_string()))?
        };

        let html = render::render(text);
        let id = self.store.next_message_id(room).await?;
        let msg = Message::new(id, html);
        self.store.add_message(room, &msg).await?;

        debug!("room {:?}: message {} persisted", room, id);

        let from = from.clone();
        tokio::spawn(async move {
            r.broadcast(&from, msg);
        });

        Ok(())
    }

    #[cfg(test)]
    fn contains_room(&self, room: &str) -> bool {
        self.rooms
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(room)
    }
}
