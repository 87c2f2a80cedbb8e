//! Manages the WebSocket connection lifecycle for a quiz session.

use super::channel::WsChannel;
use crate::state::AppState;
use axum::{
    extract::{
        State,
        ws::{WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use game_chat_core::session::run_session;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Axum handler to upgrade an HTTP connection to a WebSocket.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Runs exactly one session for an upgraded connection.
///
/// Each connection is served on its own task by axum, so a session blocked on
/// its client never holds up another.
#[instrument(name = "ws_session", skip_all, fields(session_id = %Uuid::new_v4()))]
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    info!("New WebSocket connection. Starting quiz session...");

    let report = run_session(
        WsChannel::new(socket),
        state.publisher.clone(),
        state.session_settings.clone(),
    )
    .await;

    info!(
        end = ?report.end,
        questions_sent = report.questions_sent,
        answers_received = report.answers_received,
        degraded_answers = report.degraded_answers,
        published = report.published,
        publish_failures = report.publish_failures,
        "Quiz session finished."
    );
}
