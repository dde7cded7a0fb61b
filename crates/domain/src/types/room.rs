//! Room types

use serde::{Deserialize, Serialize};

/// Pagination block returned with list endpoints.
///
/// The platform sends these as integers or floats depending on the endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub offset: f64,
    pub limit: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmoRoomMember {
    pub uuid: String,
    pub user_type: String,
    pub nickname: String,
    #[serde(default)]
    pub profile_image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomInfo {
    pub uuid: String,
    pub name: String,
    pub room_type: String,
    pub room_members: Vec<EmoRoomMember>,
}

/// Response of `GET /v1/rooms`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmoRoomInfo {
    pub listing: Listing,
    #[serde(default)]
    pub rooms: Vec<RoomInfo>,
}

impl EmoRoomInfo {
    pub fn room_ids(&self) -> Vec<String> {
        self.rooms.iter().map(|room| room.uuid.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn rooms_parse_with_float_listing() {
        let info: EmoRoomInfo = serde_json::from_value(json!({
            "listing": {"offset": 0, "limit": 50.0, "total": 1},
            "rooms": [{
                "uuid": "room-1",
                "name": "Living",
                "room_type": "normal",
                "room_members": [{
                    "uuid": "member-1",
                    "user_type": "emo",
                    "nickname": "emo",
                    "profile_image": "https://example.com/emo.png"
                }]
            }]
        }))
        .unwrap();

        assert!((info.listing.limit - 50.0).abs() < f64::EPSILON);
        assert_eq!(info.room_ids(), vec!["room-1".to_string()]);
        assert_eq!(info.rooms[0].room_members[0].user_type, "emo");
    }

    #[test]
    fn missing_rooms_field_is_empty() {
        let info: EmoRoomInfo =
            serde_json::from_value(json!({"listing": {"offset": 0, "limit": 50, "total": 0}}))
                .unwrap();
        assert!(info.room_ids().is_empty());
    }
}
