//! Failures raised while running a session.
//!
//! Only send failures and a closed channel end a session. Everything else is
//! logged and the session moves on to its next cycle.

use thiserror::Error;

/// Failure to deliver a question to the client. Always ends the session.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("failed to encode question: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("transport error while sending: {0}")]
    Transport(String),
    #[error("channel is closed")]
    Closed,
}

/// Failure to obtain an answer from the client.
#[derive(Debug, Error)]
pub enum ReceiveError {
    /// The peer closed the connection or the stream ended.
    #[error("channel closed by peer")]
    Closed,
    #[error("malformed answer frame: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("transport error while receiving: {0}")]
    Transport(String),
}

impl ReceiveError {
    /// Whether the session must stop instead of continuing with a degraded record.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReceiveError::Closed)
    }
}

/// Failure to append an answer record to the event stream. The record is dropped.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("failed to encode answer record: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("event stream broker error: {0}")]
    Broker(String),
}
