//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds the resources every
//! WebSocket session shares: the event publisher and the session settings.

use crate::config::Config;
use game_chat_core::{channel::EventPublisher, session::SessionSettings};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub publisher: Arc<dyn EventPublisher>,
    pub session_settings: SessionSettings,
}

impl AppState {
    pub fn new(config: &Config, publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            publisher,
            session_settings: SessionSettings {
                answer_timeout: config.answer_timeout,
            },
        }
    }
}
