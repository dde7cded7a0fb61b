//! Broadcast messages (business plans)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::room::Listing;

/// Broadcast request accepted by `POST /v1/broadcast_messages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastMsg {
    pub title: String,
    pub text: String,
    /// Unix timestamp (seconds) of the scheduled delivery.
    pub executed_at: i64,
    pub immediate: bool,
}

impl BroadcastMsg {
    /// Request body; an immediate broadcast carries no schedule.
    pub fn to_payload(&self) -> Value {
        if self.immediate {
            json!({"title": self.title, "text": self.text, "immediate": true})
        } else {
            json!({
                "title": self.title,
                "text": self.text,
                "executed_at": self.executed_at,
                "immediate": false,
            })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmoBroadcastMessage {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub executed_at: i64,
    pub finished: bool,
}

impl EmoBroadcastMessage {
    pub fn executed_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.executed_at, 0)
    }
}

/// Response of `GET /v1/broadcast_messages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmoBroadcastInfoList {
    pub listing: Listing,
    #[serde(default)]
    pub messages: Vec<EmoBroadcastMessage>,
}

/// Response of `GET /v1/broadcast_messages/{id}`.
///
/// Per-room delivery details are kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmoBroadcastInfo {
    pub message: EmoBroadcastMessage,
    #[serde(default)]
    pub details: Vec<Value>,
}
