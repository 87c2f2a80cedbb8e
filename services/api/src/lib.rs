//! Game Chat API Library Crate
//!
//! This library contains the web-facing half of the game chat service: the
//! configuration, the shared application state, the WebSocket endpoint that
//! runs one quiz session per connection, and the Kafka event publisher. The
//! `game-chat` binary is a thin wrapper around this library.

pub mod config;
pub mod publisher;
pub mod router;
pub mod state;
pub mod ws;
