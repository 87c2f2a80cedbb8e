//! The per-connection question/answer loop.
//!
//! A session repeatedly generates a question, sends it, waits for the answer
//! and hands the answer to the event publisher. It ends when a send fails, the
//! client closes the channel, or the optional answer deadline passes. The
//! channel is closed on every exit path.

use crate::{
    answer::AnswerRecord,
    channel::{EventPublisher, SessionChannel},
    question,
};
use std::{sync::Arc, time::Duration};
use tracing::{debug, error, info, warn};

/// Tunables for a single session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSettings {
    /// How long to wait for an answer once a question is out. `None` waits forever.
    pub answer_timeout: Option<Duration>,
}

/// Why a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    ClientClosed,
    SendFailed,
    IdleTimeout,
}

/// Counters collected over the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub questions_sent: u64,
    pub answers_received: u64,
    /// Answers that could not be read and were replaced by an empty record.
    pub degraded_answers: u64,
    pub published: u64,
    pub publish_failures: u64,
    pub end: SessionEnd,
}

/// Runs the session loop until the channel is done, then closes it.
pub async fn run_session<C>(
    mut channel: C,
    publisher: Arc<dyn EventPublisher>,
    settings: SessionSettings,
) -> SessionReport
where
    C: SessionChannel,
{
    let mut questions_sent = 0;
    let mut answers_received = 0;
    let mut degraded_answers = 0;
    let mut published = 0;
    let mut publish_failures = 0;

    let end = loop {
        let question = question::generate();
        if let Err(e) = channel.send(&question).await {
            error!(error = %e, "Failed to send question to client.");
            break SessionEnd::SendFailed;
        }
        questions_sent += 1;
        debug!(prompt = %question.prompt, "Question sent.");

        let received = match settings.answer_timeout {
            Some(limit) => match tokio::time::timeout(limit, channel.receive()).await {
                Ok(received) => received,
                Err(_) => {
                    warn!(?limit, "No answer before the deadline. Ending session.");
                    break SessionEnd::IdleTimeout;
                }
            },
            None => channel.receive().await,
        };

        let record = match received {
            Ok(record) => {
                answers_received += 1;
                debug!(?record, "Received answer.");
                record
            }
            Err(e) if e.is_terminal() => {
                info!("Client closed the channel.");
                break SessionEnd::ClientClosed;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read answer. Continuing with an empty record.");
                degraded_answers += 1;
                AnswerRecord::default()
            }
        };

        match publisher.publish(&record).await {
            Ok(()) => published += 1,
            Err(e) => {
                error!(error = %e, "Failed to publish answer record.");
                publish_failures += 1;
            }
        }
    };

    channel.close().await;

    SessionReport {
        questions_sent,
        answers_received,
        degraded_answers,
        published,
        publish_failures,
        end,
    }
}
