//! # emo Infrastructure
//!
//! Network, file and runtime code for the BOCCO emo Platform API.
//!
//! This crate contains:
//! - Async ([`AsyncClient`]) and blocking ([`Client`]) API clients with the
//!   same method surface, plus per-room clients
//! - Token persistence and refresh-on-expiry
//! - Webhook dispatch, the local webhook listener and the message poller
//! - Configuration loading from files and the environment
//!
//! ## Architecture
//! - Value types and errors come from `emo-domain`
//! - Both clients build requests from the shared [`api::endpoints`] module
//! - All logging goes through `tracing`

pub mod api;
pub mod auth;
pub mod config;
pub mod errors;
pub mod http;
pub mod webhook;

// Re-export commonly used items
pub use api::{AsyncClient, AsyncRoom, Client, ClientBuilder, Room};
pub use auth::{TokenSource, TokenStore};
pub use webhook::{
    async_handler, blocking_handler, MessagePoller, MessageSource, WebhookDispatcher,
    WebhookHandler, WebhookListener,
};
