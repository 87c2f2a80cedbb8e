//! `SessionChannel` over an upgraded axum WebSocket.

use super::protocol::QuestionMessage;
use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use game_chat_core::{
    answer::AnswerRecord,
    channel::SessionChannel,
    error::{ReceiveError, SendError},
    question::Question,
};
use tokio_tungstenite::tungstenite::{self, error::ProtocolError};
use tracing::debug;

pub struct WsChannel {
    socket: WebSocket,
    closed: bool,
}

impl WsChannel {
    pub fn new(socket: WebSocket) -> Self {
        Self {
            socket,
            closed: false,
        }
    }
}

/// Maps a socket read error onto the session's receive taxonomy.
///
/// A peer that vanished, with or without a closing handshake, is `Closed`.
fn classify_receive_error(err: axum::Error) -> ReceiveError {
    let inner = match err.into_inner().downcast::<tungstenite::Error>() {
        Ok(inner) => inner,
        Err(other) => return ReceiveError::Transport(other.to_string()),
    };
    let dropped = matches!(
        *inner,
        tungstenite::Error::ConnectionClosed
            | tungstenite::Error::AlreadyClosed
            | tungstenite::Error::Io(_)
            | tungstenite::Error::Protocol(ProtocolError::ResetWithoutClosingHandshake)
    );
    if dropped {
        debug!(error = %inner, "Connection dropped by client.");
        ReceiveError::Closed
    } else {
        ReceiveError::Transport(inner.to_string())
    }
}

#[async_trait]
impl SessionChannel for WsChannel {
    async fn send(&mut self, question: &Question) -> Result<(), SendError> {
        if self.closed {
            return Err(SendError::Closed);
        }
        let serialized = serde_json::to_string(&QuestionMessage::from(question))?;
        self.socket
            .send(Message::Text(serialized.into()))
            .await
            .map_err(|e| SendError::Transport(e.to_string()))
    }

    async fn receive(&mut self) -> Result<AnswerRecord, ReceiveError> {
        if self.closed {
            return Err(ReceiveError::Closed);
        }
        loop {
            let msg = match self.socket.recv().await {
                Some(Ok(msg)) => msg,
                Some(Err(e)) => return Err(classify_receive_error(e)),
                None => return Err(ReceiveError::Closed),
            };
            match msg {
                Message::Text(text) => return Ok(serde_json::from_str(text.as_str())?),
                Message::Binary(data) => return Ok(serde_json::from_slice(&data)?),
                Message::Close(frame) => {
                    debug!(?frame, "Client sent close frame.");
                    return Err(ReceiveError::Closed);
                }
                // Control frames are answered by the socket itself.
                Message::Ping(_) | Message::Pong(_) => continue,
            }
        }
    }

    async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(e) = self.socket.send(Message::Close(None)).await {
            debug!(error = %e, "Close frame not delivered.");
        }
    }
}
