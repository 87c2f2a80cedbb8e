//! Defines the WebSocket message protocol between the browser client and the API server.
//!
//! Clients answer with an [`AnswerRecord`](game_chat_core::answer::AnswerRecord)
//! frame; the server only ever sends questions.

use game_chat_core::question::Question;
use serde::{Deserialize, Serialize};

/// The frame pushed to the client at the start of every cycle.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionMessage {
    pub question: String,
    pub correct_answer: String,
}

impl From<&Question> for QuestionMessage {
    fn from(q: &Question) -> Self {
        Self {
            question: q.prompt.clone(),
            correct_answer: q.correct_answer.clone(),
        }
    }
}
