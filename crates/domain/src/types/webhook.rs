//! Webhook setting and event payload types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::message::EmoMessageInfo;
use super::room::EmoRoomMember;
use crate::errors::{EmoPlatformError, Result};

/// Webhook destination registered with the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebHook {
    pub url: String,
    #[serde(default)]
    pub description: String,
}

impl WebHook {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), description: String::new() }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Current webhook setting, including the secret deliveries are signed with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmoWebhookInfo {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub events: Vec<String>,
    pub status: String,
    pub secret: String,
    pub url: String,
}

/// Event delivered by the platform to the webhook URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookBody {
    pub request_id: String,
    /// Room the event originated in.
    pub uuid: String,
    #[serde(default)]
    pub serial_number: String,
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub timestamp: i64,
    pub event: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub receiver: String,
}

impl WebhookBody {
    /// Typed view of `data`.
    pub fn event_data(&self) -> WebhookEventData {
        WebhookEventData::from_value(self.data.clone())
    }

    pub fn occurred_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }
}

/// Parse a raw webhook delivery.
///
/// # Errors
///
/// Returns `WebhookRequest` when the payload is not a webhook body.
pub fn parse_webhook_body(raw: &[u8]) -> Result<WebhookBody> {
    serde_json::from_slice(raw)
        .map_err(|e| EmoPlatformError::WebhookRequest(format!("invalid webhook body: {e}")))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmoKind {
    #[serde(default)]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmoVuiCommand {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub parameters: Value,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmoRadar {
    pub begin: bool,
    pub end: bool,
    pub near_begin: bool,
    pub near_end: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmoTalk {
    #[serde(default)]
    pub talk: Value,
}

/// Message posted by a paired sensor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmoWebhookSensorMessage {
    pub sequence: i64,
    pub unique_id: String,
    pub user: Option<EmoRoomMember>,
    pub lang: String,
    pub message_type: String,
    pub sensor_action: String,
}

/// `data` of a webhook body, keyed by the kind of event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookEventData {
    Message(EmoMessageInfo),
    TriggerWord(Value),
    Motion(Value),
    VuiCommand(EmoVuiCommand),
    Recording(Value),
    Illuminance(EmoKind),
    Accel(EmoKind),
    MovementSensor(EmoWebhookSensorMessage),
    HumanSensor(EmoWebhookSensorMessage),
    LockSensor(EmoWebhookSensorMessage),
    RoomSensor(EmoWebhookSensorMessage),
    Radar(EmoRadar),
    EmoTalk(EmoTalk),
    #[serde(untagged)]
    Other(Value),
}

impl WebhookEventData {
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or(Self::Other(value))
    }
}
