//! Stamp and preset motion catalogues

use serde::{Deserialize, Serialize};

use super::room::Listing;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmoStamp {
    pub uuid: String,
    pub name: String,
    pub summary: String,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmoStampsInfo {
    pub listing: Listing,
    #[serde(default)]
    pub stamps: Vec<EmoStamp>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmoMotion {
    pub uuid: String,
    pub name: String,
    pub preview: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmoMotionsInfo {
    pub listing: Listing,
    #[serde(default)]
    pub motions: Vec<EmoMotion>,
}
