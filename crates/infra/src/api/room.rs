//! Per-room clients
//!
//! [`AsyncRoom`] and [`Room`] borrow the credentials and plan of the client
//! that created them.

use std::path::Path;

use emo_domain::{
    Color, EmoMessageInfo, EmoMsgsInfo, EmoRoomSensorInfo, EmoSensorsInfo, EmoSettingsInfo,
    Feature, Head, MotionSource, Result,
};
use serde_json::Value;

use super::blocking::Client;
use super::client::AsyncClient;
use super::endpoints;
use crate::http::UploadFile;

fn parse_motion(bytes: &[u8]) -> Result<Value> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Async client bound to one room.
#[derive(Debug, Clone)]
pub struct AsyncRoom {
    client: AsyncClient,
    room_id: String,
}

impl AsyncRoom {
    pub(crate) const fn new(client: AsyncClient, room_id: String) -> Self {
        Self { client, room_id }
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    /// Messages of the room, only those posted before the unix time
    /// `before` when given.
    pub async fn get_msgs(&self, before: Option<i64>) -> Result<EmoMsgsInfo> {
        self.client.execute(endpoints::room_messages(&self.room_id, before)).await
    }

    pub async fn get_sensors_list(&self) -> Result<EmoSensorsInfo> {
        self.client.execute(endpoints::room_sensors(&self.room_id)).await
    }

    pub async fn get_sensor_values(&self, sensor_id: &str) -> Result<EmoRoomSensorInfo> {
        self.client.ensure(Feature::SensorValues)?;
        self.client.execute(endpoints::sensor_values(&self.room_id, sensor_id)).await
    }

    /// Upload an audio file as a voice message.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read.
    pub async fn send_audio_msg(&self, path: impl AsRef<Path>) -> Result<EmoMessageInfo> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file = UploadFile::new("audio", path, bytes);
        self.client.execute(endpoints::send_audio(&self.room_id, file)).await
    }

    /// Upload an image file.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read.
    pub async fn send_image(&self, path: impl AsRef<Path>) -> Result<EmoMessageInfo> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file = UploadFile::new("image", path, bytes);
        self.client.execute(endpoints::send_image(&self.room_id, file)).await
    }

    pub async fn send_msg(&self, text: &str) -> Result<EmoMessageInfo> {
        self.client.execute(endpoints::send_text(&self.room_id, text)).await
    }

    pub async fn send_stamp(&self, stamp_id: &str, text: Option<&str>) -> Result<EmoMessageInfo> {
        self.client.execute(endpoints::send_stamp(&self.room_id, stamp_id, text)).await
    }

    /// Play a custom motion given inline or as a JSON file.
    pub async fn send_original_motion(&self, motion: MotionSource) -> Result<EmoMessageInfo> {
        self.client.ensure(Feature::OriginalMotion)?;
        let motion = match motion {
            MotionSource::Json(value) => value,
            MotionSource::File(path) => parse_motion(&tokio::fs::read(path).await?)?,
        };
        self.client.execute(endpoints::send_original_motion(&self.room_id, motion)).await
    }

    pub async fn change_led_color(&self, color: Color) -> Result<EmoMessageInfo> {
        self.client.ensure(Feature::LedColor)?;
        self.client.execute(endpoints::change_led_color(&self.room_id, color)).await
    }

    pub async fn move_to(&self, head: Head) -> Result<EmoMessageInfo> {
        self.client.ensure(Feature::MoveTo)?;
        self.client.execute(endpoints::move_to(&self.room_id, head)).await
    }

    pub async fn send_motion(&self, motion_id: &str) -> Result<EmoMessageInfo> {
        self.client.ensure(Feature::PresetMotion)?;
        self.client.execute(endpoints::send_preset_motion(&self.room_id, motion_id)).await
    }

    pub async fn get_emo_settings(&self) -> Result<EmoSettingsInfo> {
        self.client.execute(endpoints::emo_settings(&self.room_id)).await
    }
}

/// Blocking client bound to one room.
#[derive(Debug, Clone)]
pub struct Room {
    client: Client,
    room_id: String,
}

impl Room {
    pub(crate) const fn new(client: Client, room_id: String) -> Self {
        Self { client, room_id }
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn get_msgs(&self, before: Option<i64>) -> Result<EmoMsgsInfo> {
        self.client.execute(endpoints::room_messages(&self.room_id, before))
    }

    pub fn get_sensors_list(&self) -> Result<EmoSensorsInfo> {
        self.client.execute(endpoints::room_sensors(&self.room_id))
    }

    pub fn get_sensor_values(&self, sensor_id: &str) -> Result<EmoRoomSensorInfo> {
        self.client.ensure(Feature::SensorValues)?;
        self.client.execute(endpoints::sensor_values(&self.room_id, sensor_id))
    }

    pub fn send_audio_msg(&self, path: impl AsRef<Path>) -> Result<EmoMessageInfo> {
        let path = path.as_ref();
        let file = UploadFile::new("audio", path, std::fs::read(path)?);
        self.client.execute(endpoints::send_audio(&self.room_id, file))
    }

    pub fn send_image(&self, path: impl AsRef<Path>) -> Result<EmoMessageInfo> {
        let path = path.as_ref();
        let file = UploadFile::new("image", path, std::fs::read(path)?);
        self.client.execute(endpoints::send_image(&self.room_id, file))
    }

    pub fn send_msg(&self, text: &str) -> Result<EmoMessageInfo> {
        self.client.execute(endpoints::send_text(&self.room_id, text))
    }

    pub fn send_stamp(&self, stamp_id: &str, text: Option<&str>) -> Result<EmoMessageInfo> {
        self.client.execute(endpoints::send_stamp(&self.room_id, stamp_id, text))
    }

    pub fn send_original_motion(&self, motion: MotionSource) -> Result<EmoMessageInfo> {
        self.client.ensure(Feature::OriginalMotion)?;
        let motion = match motion {
            MotionSource::Json(value) => value,
            MotionSource::File(path) => parse_motion(&std::fs::read(path)?)?,
        };
        self.client.execute(endpoints::send_original_motion(&self.room_id, motion))
    }

    pub fn change_led_color(&self, color: Color) -> Result<EmoMessageInfo> {
        self.client.ensure(Feature::LedColor)?;
        self.client.execute(endpoints::change_led_color(&self.room_id, color))
    }

    pub fn move_to(&self, head: Head) -> Result<EmoMessageInfo> {
        self.client.ensure(Feature::MoveTo)?;
        self.client.execute(endpoints::move_to(&self.room_id, head))
    }

    pub fn send_motion(&self, motion_id: &str) -> Result<EmoMessageInfo> {
        self.client.ensure(Feature::PresetMotion)?;
        self.client.execute(endpoints::send_preset_motion(&self.room_id, motion_id))
    }

    pub fn get_emo_settings(&self) -> Result<EmoSettingsInfo> {
        self.client.execute(endpoints::emo_settings(&self.room_id))
    }
}
