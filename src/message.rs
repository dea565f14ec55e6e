//! Message value and wire protocol definitions
//!
//! `Message` is one posted chat line. `ServerEvent` is the outgoing JSON
//! envelope using Serde's tagged enum, and `ClientText` is the single
//! inbound frame shape.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Display format for message timestamps, fixed to UTC.
///
/// Example: `Sun Aug 23 2026 14:05:06 GMT+0000 (UTC)`.
const TIME_FORMAT: &str = "%a %b %d %Y %H:%M:%S GMT+0000 (UTC)";

/// One posted chat line.
///
/// Immutable after construction, with one exception: the `approve` flag is
/// flipped on the copy delivered back to the message's own author. That flag
/// is a delivery-time annotation and is never persisted as true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Room-scoped, server-assigned sequence number
    pub id: u64,
    /// Fixed-format UTC timestamp, assigned when persistence is requested
    pub time: String,
    /// Already-sanitized markup, opaque to the core
    pub html: String,
    /// True only on the copy echoed back to the author
    #[serde(default)]
    pub approve: bool,
}

impl Message {
    /// Create a message with the given sequence ID and rendered markup,
    /// stamped with the current UTC time.
    pub fn new(id: u64, html: String) -> Self {
        Self {
            id,
            time: Utc::now().format(TIME_FORMAT).to_string(),
            html,
            approve: false,
        }
    }
}

/// Server → Client frame
///
/// Serialized as `{"type": ..., "payload": ...}` for the browser client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// One live message broadcast to the room
    Message(Message),
    /// Bulk history replay on join, oldest first
    Messages(Vec<Message>),
    /// Updated member count for the client's room
    ClientsCount(usize),
    /// A post from this client failed
    Error(String),
}

/// Client → Server frame: the raw text of one post.
#[derive(Debug, Deserialize)]
pub struct ClientText {
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_wire_shape() {
        let msg = Message {
            id: 7,
            time: "Sun Aug 23 2026 14:05:06 GMT+0000 (UTC)".to_string(),
            html: "<p>hi</p>".to_string(),
            approve: false,
        };
        let json = serde_json::to_string(&ServerEvent::Message(msg)).unwrap();
        assert!(json.contains("\"type\":\"message\""));
        assert!(json.contains("\"id\":7"));
        assert!(json.contains("\"html\":\"<p>hi</p>\""));
        assert!(json.contains("\"approve\":false"));
    }

    #[test]
    fn test_new_message_defaults() {
        let msg = Message::new(1, "<p>x</p>".to_string());
        assert_eq!(msg.id, 1);
        assert!(!msg.approve);
        assert!(msg.time.ends_with("GMT+0000 (UTC)"));
    }

    #[test]
    fn test_clients_count_wire_shape() {
        let json = serde_json::to_string(&ServerEvent::ClientsCount(3)).unwrap();
        assert_eq!(json, "{\"type\":\"clients-count\",\"payload\":3}");
    }

    #[test]
    fn test_messages_wire_shape() {
        let msgs = vec![Message::new(1, String::new()), Message::new(2, String::new())];
        let json = serde_json::to_string(&ServerEvent::Messages(msgs)).unwrap();
        assert!(json.starts_with("{\"type\":\"messages\",\"payload\":["));
    }

    #[test]
    fn test_client_text_deserialize() {
        let frame: ClientText = serde_json::from_str("{\"text\": \"hello **world**\"}").unwrap();
        assert_eq!(frame.text, "hello **world**");
    }
}
