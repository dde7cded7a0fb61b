//! # emo CLI
//!
//! Command-line front end for the BOCCO emo Platform API.
//!
//! This crate contains:
//! - The clap argument definitions ([`Cli`])
//! - One handler per command, all running on [`emo_infra::AsyncClient`]
//! - Logging setup for the binary
//!
//! ## Architecture
//! - Depends on `emo-domain` for types and `emo-infra` for the client
//! - Configuration comes from `emo_infra::config`, then the global flags

pub mod cli;
pub mod commands;
pub mod utils;

// Re-export for convenience
pub use cli::{Cli, Command, ConnectionArgs};
pub use commands::run;
