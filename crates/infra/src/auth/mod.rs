//! Credential handling
//!
//! The platform issues a short-lived access token and a long-lived refresh
//! token. [`TokenStore`] decides which pair is in use and persists refreshed
//! pairs; the clients drive the refresh itself.

pub mod token_store;

pub use token_store::{RefreshCandidate, TokenSource, TokenStore};
