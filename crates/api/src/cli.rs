//! Command-line arguments for the `emo` binary

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use emo_domain::constants::MESSAGE_RECEIVED_EVENT;
use emo_domain::Plan;

/// Command-line client for the BOCCO emo Platform API
#[derive(Parser, Debug)]
#[command(name = "emo")]
#[command(about = "Command-line client for the BOCCO emo Platform API", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Flags that override the loaded configuration.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionArgs {
    /// Configuration file (TOML or JSON); probed when omitted
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Account plan: personal, biz_basic or biz_advanced
    #[arg(long, global = true, value_parser = parse_plan)]
    pub plan: Option<Plan>,

    /// Channel key for business plans
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Refresh token, overriding the environment and the token file
    #[arg(long, global = true)]
    pub refresh_token: Option<String>,

    /// API base URL
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Directory holding the saved token files
    #[arg(long, global = true)]
    pub token_dir: Option<PathBuf>,
}

fn parse_plan(value: &str) -> Result<Plan, String> {
    value.parse()
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Account information
    #[command(subcommand)]
    Account(AccountCommand),

    /// Rooms of the account
    #[command(subcommand)]
    Rooms(RoomsCommand),

    /// List available stamps
    Stamps,

    /// List preset motions
    Motions,

    /// Webhook setting
    #[command(subcommand)]
    Webhook(WebhookCommand),

    /// Read from or send to one room (the first room when no id is given)
    Room(RoomArgs),

    /// Broadcast messages (business plans)
    #[command(subcommand)]
    Broadcast(BroadcastCommand),

    /// Receive webhook events and print them as JSON
    Listen(ListenArgs),
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum AccountCommand {
    Get,
    Delete,
    Change(AccountChangeArgs),
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountChangeArgs {
    #[arg(long, default_value = "")]
    pub name: String,
    #[arg(long, default_value = "")]
    pub name_furigana: String,
    #[arg(long, default_value = "")]
    pub organization_name: String,
    #[arg(long, default_value = "")]
    pub organization_unit_name: String,
    #[arg(long, default_value = "")]
    pub phone_number: String,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum RoomsCommand {
    /// Full room listing
    List,
    /// Room ids only
    Ids,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum WebhookCommand {
    Get,
    Create(WebhookArgs),
    Change(WebhookArgs),
    Delete,
    /// Replace the subscribed events
    Events {
        #[arg(required = true)]
        events: Vec<String>,
    },
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct WebhookArgs {
    #[arg(long)]
    pub url: String,
    #[arg(long, default_value = "")]
    pub description: String,
}

#[derive(Args, Debug, PartialEq, Eq)]
pub struct RoomArgs {
    #[arg(long)]
    pub room_id: Option<String>,

    #[command(subcommand)]
    pub action: RoomCommand,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum RoomCommand {
    /// Recent messages
    Msgs {
        /// Only messages before this sequence number
        #[arg(long)]
        before: Option<i64>,
    },
    Sensors,
    SensorValues {
        sensor_id: String,
    },
    SendMsg {
        text: String,
    },
    SendImage {
        path: PathBuf,
    },
    SendAudio {
        path: PathBuf,
    },
    SendStamp {
        stamp_id: String,
        #[arg(long)]
        text: Option<String>,
    },
    /// Play a preset motion
    SendMotion {
        motion_id: String,
    },
    /// Play motion data read from a JSON file
    OriginalMotion {
        path: PathBuf,
    },
    LedColor {
        red: u8,
        green: u8,
        blue: u8,
    },
    MoveTo {
        #[arg(allow_hyphen_values = true)]
        angle: i32,
        #[arg(allow_hyphen_values = true)]
        vertical_angle: i32,
    },
    Settings,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum BroadcastCommand {
    List,
    Get {
        message_id: i64,
    },
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        text: String,
        /// Unix timestamp of the scheduled delivery
        #[arg(long, required_unless_present = "immediate")]
        executed_at: Option<i64>,
        #[arg(long)]
        immediate: bool,
    },
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ListenArgs {
    /// Event to subscribe to; repeatable
    #[arg(long = "event", default_value = MESSAGE_RECEIVED_EVENT)]
    pub events: Vec<String>,

    /// Restrict callbacks to these rooms; repeatable
    #[arg(long = "room-id")]
    pub room_ids: Vec<String>,

    #[arg(long)]
    pub host: Option<String>,

    #[arg(long)]
    pub port: Option<u16>,

    /// Poll room messages instead of running a webhook listener
    #[arg(long)]
    pub poll: bool,

    /// Poll interval in seconds
    #[arg(long)]
    pub interval: Option<u64>,
}
