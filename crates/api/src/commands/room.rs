//! `emo room ...`

use anyhow::Result;
use emo_domain::{Color, Head, MotionSource};
use emo_infra::{AsyncClient, AsyncRoom};
use serde_json::Value;
use tracing::info;

use super::to_json;
use crate::cli::{RoomArgs, RoomCommand};

pub(super) async fn run(client: &AsyncClient, args: RoomArgs) -> Result<Option<Value>> {
    let room = select_room(client, args.room_id).await?;
    info!(room_id = room.room_id(), "Using room");

    match args.action {
        RoomCommand::Msgs { before } => to_json(room.get_msgs(before).await?),
        RoomCommand::Sensors => to_json(room.get_sensors_list().await?),
        RoomCommand::SensorValues { sensor_id } => to_json(room.get_sensor_values(&sensor_id).await?),
        RoomCommand::SendMsg { text } => to_json(room.send_msg(&text).await?),
        RoomCommand::SendImage { path } => to_json(room.send_image(path).await?),
        RoomCommand::SendAudio { path } => to_json(room.send_audio_msg(path).await?),
        RoomCommand::SendStamp { stamp_id, text } => {
            to_json(room.send_stamp(&stamp_id, text.as_deref()).await?)
        }
        RoomCommand::SendMotion { motion_id } => to_json(room.send_motion(&motion_id).await?),
        RoomCommand::OriginalMotion { path } => {
            to_json(room.send_original_motion(MotionSource::File(path)).await?)
        }
        RoomCommand::LedColor { red, green, blue } => {
            to_json(room.change_led_color(Color::new(red, green, blue)).await?)
        }
        RoomCommand::MoveTo { angle, vertical_angle } => {
            to_json(room.move_to(Head::new(angle, vertical_angle)).await?)
        }
        RoomCommand::Settings => to_json(room.get_emo_settings().await?),
    }
}

async fn select_room(client: &AsyncClient, room_id: Option<String>) -> Result<AsyncRoom> {
    match room_id {
        Some(id) => Ok(client.create_room_client(id)),
        None => Ok(client.room().await?),
    }
}
