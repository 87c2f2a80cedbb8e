//! The seams between a session and the outside world.

use crate::{
    answer::AnswerRecord,
    error::{PublishError, ReceiveError, SendError},
    question::Question,
};
use async_trait::async_trait;

/// One client's duplex connection.
#[async_trait]
pub trait SessionChannel: Send {
    /// Sends a question as a single frame.
    async fn send(&mut self, question: &Question) -> Result<(), SendError>;

    /// Waits until one complete answer frame arrives.
    async fn receive(&mut self) -> Result<AnswerRecord, ReceiveError>;

    /// Releases the connection. Calling it more than once is a no-op.
    async fn close(&mut self);
}

/// Appends answer records to the event stream.
///
/// Implementations are shared by every session in the process.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Appends a single record. Failures are returned as-is; nothing is retried
    /// or buffered.
    async fn publish(&self, record: &AnswerRecord) -> Result<(), PublishError>;
}
