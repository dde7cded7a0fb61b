//! # emo Domain
//!
//! Domain types and models for the BOCCO emo Platform API.
//!
//! This crate contains:
//! - Response records mirroring the platform's JSON payloads
//! - Request models (account info, broadcast messages, LED colour, head angle)
//! - Account plans and the operations each plan offers
//! - Domain error types and Result definitions
//! - Configuration structures
//!
//! ## Architecture
//! - No dependencies on other emo crates
//! - No I/O; the infra crate performs every network and file operation

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
