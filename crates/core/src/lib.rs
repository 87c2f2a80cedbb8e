//! Core logic for the live game chat: question generation, the answer record
//! model, and the session loop that ties a client channel to the event stream.
//!
//! Transport and broker specifics live behind the [`channel::SessionChannel`]
//! and [`channel::EventPublisher`] traits so the loop can be driven by any
//! implementation.

pub mod answer;
pub mod channel;
pub mod error;
pub mod question;
pub mod session;

/// Name of the event stream topic answer records are appended to.
pub const ANSWERS_TOPIC: &str = "game-answers";
