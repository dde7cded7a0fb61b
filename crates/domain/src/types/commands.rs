//! Device command models

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// LED colour of the robot's cheek.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }
}

/// Head position in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Head {
    pub angle: i32,
    pub vertical_angle: i32,
}

impl Head {
    pub const fn new(angle: i32, vertical_angle: i32) -> Self {
        Self { angle, vertical_angle }
    }
}

/// Original motion data, inline or read from a JSON file at send time.
#[derive(Debug, Clone, PartialEq)]
pub enum MotionSource {
    Json(Value),
    File(PathBuf),
}

impl From<Value> for MotionSource {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<PathBuf> for MotionSource {
    fn from(path: PathBuf) -> Self {
        Self::File(path)
    }
}
