//! Sensor and device setting types

use serde::{Deserialize, Serialize};

/// A sensor paired with the robot of a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmoSensor {
    pub uuid: String,
    pub sensor_type: String,
    pub nickname: String,
    pub signal_strength: i64,
    pub battery: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmoSensorsInfo {
    #[serde(default)]
    pub sensors: Vec<EmoSensor>,
}

/// One reading of a room sensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmoRoomSensorEvent {
    pub temperature: f64,
    pub humidity: f64,
    pub illuminance: f64,
}

/// Response of `GET /v1/rooms/{room}/sensors/{sensor}/values`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmoRoomSensorInfo {
    pub sensor_type: String,
    pub uuid: String,
    pub nickname: String,
    #[serde(default)]
    pub events: Vec<EmoRoomSensorEvent>,
}

/// Response of `GET /v1/rooms/{room}/emo/settings`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmoSettingsInfo {
    pub nickname: String,
    pub wakeword: String,
    pub volume: i64,
    pub voice_pitch: i64,
    pub voice_speed: i64,
    pub lang: String,
    pub serial_number: String,
    pub timezone: String,
    pub zip_code: String,
}
