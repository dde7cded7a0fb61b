//! emo Platform API clients
//!
//! [`AsyncClient`] and [`Client`] expose the same operations; both send the
//! request descriptions built in [`endpoints`]. Plan restrictions are checked
//! before any network call.

mod blocking;
mod builder;
mod client;
pub mod endpoints;
mod room;
mod shared;

pub use blocking::Client;
pub use builder::ClientBuilder;
pub use client::AsyncClient;
pub use room::{AsyncRoom, Room};
