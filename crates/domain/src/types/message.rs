//! Room message types

use serde::{Deserialize, Serialize};

use super::room::EmoRoomMember;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmoMessage {
    #[serde(default)]
    pub ja: String,
}

/// A message posted to a room by a user, the robot or a sensor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmoMessageInfo {
    pub sequence: i64,
    pub unique_id: String,
    pub user: EmoRoomMember,
    #[serde(default)]
    pub message: EmoMessage,
    #[serde(default)]
    pub media: String,
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub lang: String,
}

/// Response of `GET /v1/rooms/{room}/messages`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmoMsgsInfo {
    #[serde(default)]
    pub messages: Vec<EmoMessageInfo>,
}

impl EmoMsgsInfo {
    pub fn latest_sequence(&self) -> Option<i64> {
        self.messages.iter().map(|m| m.sequence).max()
    }

    /// Messages newer than `sequence`, oldest first.
    pub fn newer_than(&self, sequence: i64) -> Vec<EmoMessageInfo> {
        let mut newer: Vec<_> =
            self.messages.iter().filter(|m| m.sequence > sequence).cloned().collect();
        newer.sort_by_key(|m| m.sequence);
        newer
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn message(sequence: i64) -> serde_json::Value {
        json!({
            "sequence": sequence,
            "unique_id": format!("msg-{sequence}"),
            "user": {"uuid": "u", "user_type": "normal", "nickname": "n", "profile_image": ""},
            "message": {"ja": "こんにちは"},
            "media": "text",
            "audio_url": null,
            "image_url": null,
            "lang": "ja"
        })
    }

    #[test]
    fn newer_messages_are_returned_oldest_first() {
        let info: EmoMsgsInfo = serde_json::from_value(json!({
            "messages": [message(12), message(10), message(11)]
        }))
        .unwrap();

        assert_eq!(info.latest_sequence(), Some(12));
        let newer: Vec<i64> = info.newer_than(10).iter().map(|m| m.sequence).collect();
        assert_eq!(newer, vec![11, 12]);
        assert!(info.newer_than(12).is_empty());
    }

    #[test]
    fn empty_listing_has_no_sequence() {
        assert_eq!(EmoMsgsInfo::default().latest_sequence(), None);
    }
}
