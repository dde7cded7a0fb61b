//! Domain types and models
//!
//! Response records mirror the platform's JSON payloads field for field.
//! Request models serialize to the bodies the platform expects.

pub mod account;
pub mod broadcast;
pub mod catalog;
pub mod commands;
pub mod message;
pub mod plan;
pub mod room;
pub mod sensor;
pub mod webhook;

pub use account::{AccountDetails, AccountInfo, EmoAccountInfo, EmoBizAccountInfo, EmoTokens, Tokens};
pub use broadcast::{BroadcastMsg, EmoBroadcastInfo, EmoBroadcastInfoList, EmoBroadcastMessage};
pub use catalog::{EmoMotion, EmoMotionsInfo, EmoStamp, EmoStampsInfo};
pub use commands::{Color, Head, MotionSource};
pub use message::{EmoMessage, EmoMessageInfo, EmoMsgsInfo};
pub use plan::{Feature, Plan};
pub use room::{EmoRoomInfo, EmoRoomMember, Listing, RoomInfo};
pub use sensor::{EmoRoomSensorEvent, EmoRoomSensorInfo, EmoSensor, EmoSensorsInfo, EmoSettingsInfo};
pub use webhook::{
    parse_webhook_body, EmoKind, EmoRadar, EmoTalk, EmoVuiCommand, EmoWebhookInfo,
    EmoWebhookSensorMessage, WebHook, WebhookBody, WebhookEventData,
};

/// Serde helpers for fields the platform encodes inconsistently.
pub(crate) mod de {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        Text(String),
        Int(i64),
        Float(f64),
    }

    /// Accept either a JSON string or a JSON number and keep it as text.
    pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match StringOrNumber::deserialize(deserializer)? {
            StringOrNumber::Text(s) => s,
            StringOrNumber::Int(i) => i.to_string(),
            StringOrNumber::Float(f) => f.to_string(),
        })
    }
}
