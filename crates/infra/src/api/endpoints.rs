//! Platform API endpoints
//!
//! Each function describes one call. The async and blocking clients send
//! these descriptions unchanged.

use emo_domain::{AccountInfo, BroadcastMsg, Color, Head, WebHook};
use serde_json::{json, Value};

use crate::http::{ApiRequest, UploadFile};

pub const TOKEN_REFRESH: &str = "/oauth/token/refresh";
pub const ME: &str = "/v1/me";
pub const ROOMS: &str = "/v1/rooms";
pub const STAMPS: &str = "/v1/stamps";
pub const MOTIONS: &str = "/v1/motions";
pub const WEBHOOK: &str = "/v1/webhook";
pub const WEBHOOK_EVENTS: &str = "/v1/webhook/events";
pub const BROADCAST_MESSAGES: &str = "/v1/broadcast_messages";

fn room_path(room_id: &str, suffix: &str) -> String {
    format!("{ROOMS}/{room_id}{suffix}")
}

// ============================================================================
// Account and tokens
// ============================================================================

/// Exchange a refresh token for a new pair. Never retried on 401.
pub fn refresh_token(refresh_token: &str) -> ApiRequest {
    ApiRequest::post(TOKEN_REFRESH)
        .json(json!({ "refresh_token": refresh_token }))
        .without_refresh()
}

pub fn get_account() -> ApiRequest {
    ApiRequest::get(ME)
}

pub fn delete_account() -> ApiRequest {
    ApiRequest::delete(ME)
}

pub fn change_account(info: &AccountInfo) -> ApiRequest {
    ApiRequest::put(ME).json(json!({
        "name": info.name,
        "name_furigana": info.name_furigana,
        "organization_name": info.organization_name,
        "organization_unit_name": info.organization_unit_name,
        "phone_number": info.phone_number,
    }))
}

// ============================================================================
// Rooms and catalogues
// ============================================================================

pub fn list_rooms() -> ApiRequest {
    ApiRequest::get(ROOMS)
}

pub fn list_stamps() -> ApiRequest {
    ApiRequest::get(STAMPS)
}

pub fn list_motions() -> ApiRequest {
    ApiRequest::get(MOTIONS)
}

// ============================================================================
// Webhook setting
// ============================================================================

pub fn get_webhook() -> ApiRequest {
    ApiRequest::get(WEBHOOK)
}

pub fn create_webhook(webhook: &WebHook) -> ApiRequest {
    ApiRequest::post(WEBHOOK).json(json!({ "description": webhook.description, "url": webhook.url }))
}

pub fn change_webhook(webhook: &WebHook) -> ApiRequest {
    ApiRequest::put(WEBHOOK).json(json!({ "description": webhook.description, "url": webhook.url }))
}

pub fn register_webhook_events(events: &[String]) -> ApiRequest {
    ApiRequest::put(WEBHOOK_EVENTS).json(json!({ "events": events }))
}

pub fn delete_webhook() -> ApiRequest {
    ApiRequest::delete(WEBHOOK)
}

// ============================================================================
// Broadcast messages
// ============================================================================

pub fn list_broadcasts() -> ApiRequest {
    ApiRequest::get(BROADCAST_MESSAGES)
}

pub fn get_broadcast(message_id: i64) -> ApiRequest {
    ApiRequest::get(format!("{BROADCAST_MESSAGES}/{message_id}"))
}

pub fn create_broadcast(message: &BroadcastMsg) -> ApiRequest {
    ApiRequest::post(BROADCAST_MESSAGES).json(message.to_payload())
}

// ============================================================================
// Room operations
// ============================================================================

/// Messages of a room, optionally only those before the unix time `before`.
/// A `before` of zero means no bound.
pub fn room_messages(room_id: &str, before: Option<i64>) -> ApiRequest {
    let request = ApiRequest::get(room_path(room_id, "/messages"));
    match before.filter(|ts| *ts != 0) {
        Some(ts) => request.query("before", ts),
        None => request,
    }
}

pub fn room_sensors(room_id: &str) -> ApiRequest {
    ApiRequest::get(room_path(room_id, "/sensors"))
}

pub fn sensor_values(room_id: &str, sensor_id: &str) -> ApiRequest {
    ApiRequest::get(room_path(room_id, &format!("/sensors/{sensor_id}/values")))
}

pub fn send_audio(room_id: &str, file: UploadFile) -> ApiRequest {
    ApiRequest::post(room_path(room_id, "/messages/audio")).upload(file)
}

pub fn send_image(room_id: &str, file: UploadFile) -> ApiRequest {
    ApiRequest::post(room_path(room_id, "/messages/image")).upload(file)
}

pub fn send_text(room_id: &str, text: &str) -> ApiRequest {
    ApiRequest::post(room_path(room_id, "/messages/text")).json(json!({ "text": text }))
}

/// Post a stamp; `text` is sent only when non-empty.
pub fn send_stamp(room_id: &str, stamp_id: &str, text: Option<&str>) -> ApiRequest {
    let mut payload = json!({ "uuid": stamp_id });
    if let Some(text) = text.filter(|t| !t.is_empty()) {
        payload["text"] = Value::String(text.to_string());
    }
    ApiRequest::post(room_path(room_id, "/messages/stamp")).json(payload)
}

pub fn send_original_motion(room_id: &str, motion: Value) -> ApiRequest {
    ApiRequest::post(room_path(room_id, "/motions")).json(motion)
}

pub fn change_led_color(room_id: &str, color: Color) -> ApiRequest {
    ApiRequest::post(room_path(room_id, "/motions/led_color"))
        .json(json!({ "red": color.red, "green": color.green, "blue": color.blue }))
}

pub fn move_to(room_id: &str, head: Head) -> ApiRequest {
    ApiRequest::post(room_path(room_id, "/motions/move_to"))
        .json(json!({ "angle": head.angle, "vertical_angle": head.vertical_angle }))
}

pub fn send_preset_motion(room_id: &str, motion_id: &str) -> ApiRequest {
    ApiRequest::post(room_path(room_id, "/motions/preset")).json(json!({ "uuid": motion_id }))
}

pub fn emo_settings(room_id: &str) -> ApiRequest {
    ApiRequest::get(room_path(room_id, "/emo/settings"))
}
