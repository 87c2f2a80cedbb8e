//! The answer record a client submits and the event stream receives.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A client's answer to one question.
///
/// Fields missing from the incoming frame take their zero value, so a partial
/// message still yields a record. `Default` is the degraded record used when a
/// frame cannot be decoded at all.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct AnswerRecord {
    pub game_id: i64,
    pub mode: String,
    pub question: String,
    pub user_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
    /// Kept with the client's own offset so it is re-emitted unchanged.
    pub answer_time: DateTime<FixedOffset>,
}

impl AnswerRecord {
    /// Encodes the record as the JSON payload appended to the event stream.
    pub fn to_event_payload(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_event_payload(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
