//! Connection capability
//!
//! What a transport adapter must expose to receive pushed data. The core
//! never constructs a connection; it only stores handles and compares them
//! by identity.

use std::sync::Arc;

use crate::message::Message;

/// Transport-side handle for one client session.
///
/// Sends are fire-and-forget: the core observes no result, and an
/// implementation must never block the caller. Buffering, dropping, and
/// write timeouts are the adapter's concern.
pub trait Connection: Send + Sync {
    /// Push a single live message.
    fn send_message(&self, msg: Message);

    /// Push a batch of history messages, oldest first.
    fn send_messages(&self, msgs: Vec<Message>);

    /// Push the current member count of the client's room.
    fn send_clients_count(&self, count: usize);
}

/// Shared handle to a connection.
pub type ConnectionRef = Arc<dyn Connection>;

/// Identity key for a connection handle.
///
/// Membership is deduplicated by reference, not value: two distinct sessions
/// never collide even if every field they carry compares equal.
pub(crate) fn key(conn: &ConnectionRef) -> usize {
    Arc::as_ptr(conn) as *const () as usize
}


#[cfg(test)]
mod tests {
    use super::test_support::RecordingConnection;
    use super::*;

    #[test]
    fn test_identity_key_distinguishes_equal_values() {
        let a: ConnectionRef = RecordingConnection::new();
        let b: ConnectionRef = RecordingConnection::new();
        assert_ne!(key(&a), key(&b));
    }

    #[test]
    fn test_identity_key_stable_across_clones() {
        let a: ConnectionRef = RecordingConnection::new();
        let a2 = a.clone();
        assert_eq!(key(&a), key(&a2));
    }
}
