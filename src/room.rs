//! Room membership and broadcast
//!
//! A room owns the live set of connections for one room name. The set is
//! keyed by connection identity and guarded by the room's own readers-writer
//! lock, so operations on different rooms never contend.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use tracing::debug;

use crate::connection::{self, ConnectionRef};
use crate::message::Message;

/// Named, in-memory registry of the currently connected clients for one
/// chat channel. Created on first join and destroyed by the chat registry
/// when the last member leaves.
pub struct Room {
    name: String,
    clients: RwLock<HashMap<usize, ConnectionRef>>,
}

impl Room {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            clients: RwLock::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a connection to the member set. Adding a handle that is already
    /// present is a no-op.
    pub(crate) fn new_client(&self, conn: ConnectionRef) {
        let mut clients = self.clients.write().unwrap_or_else(PoisonError::into_inner);
        clients.insert(connection::key(&conn), conn);
        debug!("room {:?}: client added ({} members)", self.name, clients.len());
    }

    /// Remove a connection from the member set. Removing an absent handle is
    /// a no-op.
    pub(crate) fn remove_client(&self, conn: &ConnectionRef) {
        let mut clients = self.clients.write().unwrap_or_else(PoisonError::into_inner);
        clients.remove(&connection::key(conn));
        debug!("room {:?}: client removed ({} members)", self.name, clients.len());
    }

    /// Point-in-time member count.
    pub fn clients_count(&self) -> usize {
        self.clients
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Deliver `msg` to every current member except `from`, then echo a copy
    /// to `from` with `approve` set, marking the server-confirmed copy of its
    /// own submission.
    ///
    /// Sends are best-effort and per-connection; a slow member cannot hold up
    /// the others because `Connection` sends never block.
    pub(crate) fn broadcast(&self, from: &ConnectionRef, msg: Message) {
        let clients = self.clients.read().unwrap_or_else(PoisonError::into_inner);
        let from_key = connection::key(from);

        for (key, conn) in clients.iter() {
            if *key == from_key {
                continue;
            }
            conn.send_message(msg.clone());
        }

        let mut echo = msg;
        echo.approve = true;
        from.send_message(echo);
    }

    /// Push the current member count to every current member.
    pub(crate) fn broadcast_clients_count(&self) {
        let clients = self.clients.read().unwrap_or_else(PoisonError::into_inner);
        let count = clients.len();

        for conn in clients.values() {
            conn.send_clients_count(count);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::connection::test_support::{Delivery, RecordingConnection};

    use super::*;

    #[test]
    fn test_membership_counts() {
        let room = Room::new("/lobby");
        let a: ConnectionRef = RecordingConnection::new();
        let b: ConnectionRef = RecordingConnection::new();

        assert_eq!(room.clients_count(), 0);
        room.new_client(a.clone());
        assert_eq!(room.clients_count(), 1);
        room.new_client(b.clone());
        assert_eq!(room.clients_count(), 2);
        room.remove_client(&a);
        assert_eq!(room.clients_count(), 1);
        room.remove_client(&b);
        assert_eq!(room.clients_count(), 0);
    }

    #[test]
    fn test_duplicate_add_is_noop() {
        let room = Room::new("/lobby");
        let a: ConnectionRef = RecordingConnection::new();

        room.new_client(a.clone());
        room.new_client(a.clone());
        assert_eq!(room.clients_count(), 1);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let room = Room::new("/lobby");
        let a: ConnectionRef = RecordingConnection::new();
        let stranger: ConnectionRef = RecordingConnection::new();

        room.new_client(a);
        room.remove_client(&stranger);
        assert_eq!(room.clients_count(), 1);
    }

    #[test]
    fn test_broadcast_echoes_author_with_approve() {
        let room = Room::new("/lobby");
        let a = RecordingConnection::new();
        let b = RecordingConnection::new();
        let a_ref: ConnectionRef = a.clone();
        let b_ref: ConnectionRef = b.clone();

        room.new_client(a_ref.clone());
        room.new_client(b_ref);

        room.broadcast(&a_ref, Message::new(1, "<p>hi</p>".to_string()));

        let to_b = b.messages();
        assert_eq!(to_b.len(), 1);
        assert_eq!(to_b[0].id, 1);
        assert!(!to_b[0].approve);

        let to_a = a.messages();
        assert_eq!(to_a.len(), 1);
        assert_eq!(to_a[0].id, 1);
        assert!(to_a[0].approve);
    }

    #[test]
    fn test_broadcast_clients_count_reaches_everyone() {
        let room = Room::new("/lobby");
        let a = RecordingConnection::new();
        let b = RecordingConnection::new();

        room.new_client(a.clone());
        room.new_client(b.clone());
        room.broadcast_clients_count();

        assert_eq!(a.counts(), vec![2]);
        assert_eq!(b.counts(), vec![2]);
    }

    #[test]
    fn test_broadcast_addresses_members_only() {
        let room = Room::new("/lobby");
        let a = RecordingConnection::new();
        let outsider = RecordingConnection::new();
        let a_ref: ConnectionRef = a.clone();

        room.new_client(a_ref.clone());
        room.broadcast(&a_ref, Message::new(1, String::new()));

        assert_eq!(a.messages().len(), 1);
        assert!(outsider.deliveries().is_empty());
        assert!(matches!(a.deliveries()[0], Delivery::Message(_)));
    }
}
