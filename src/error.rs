//! Error types for the chat server
//!
//! Defines the failures surfaced by chat operations and the transport-level
//! errors that end a WebSocket session. Uses thiserror for ergonomic error
//! definitions.

use thiserror::Error;

use crate::store::StoreError;

/// Failures surfaced synchronously to the caller of a chat operation.
///
/// The core never retries: a failed post is simply aborted, and an already
/// allocated sequence ID stays burned.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Post or leave against an unknown room name
    #[error("room does not exist: {0}")]
    RoomNotFound(String),

    /// Sequence allocation or persistence failed; the post was aborted
    #[error("store failure: {0}")]
    StoreFailure(#[from] StoreError),
}

/// Transport-level failures that terminate a WebSocket session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// WebSocket protocol error (fatal)
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// IO error (fatal)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_not_found_names_the_room() {
        let err = ChatError::RoomNotFound("/lobby".to_string());
        assert_eq!(err.to_string(), "room does not exist: /lobby");
    }

    #[test]
    fn test_store_error_converts() {
        let err: ChatError = StoreError::Backend("connection refused".to_string()).into();
        assert!(matches!(err, ChatError::StoreFailure(_)));
        assert!(err.to_string().contains("connection refused"));
    }
}
