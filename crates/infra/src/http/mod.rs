//! HTTP request layer shared by the async and blocking clients
//!
//! Requests are described as plain [`ApiRequest`] values so both transports
//! build identical calls, and responses go through [`decode_response`] so
//! both map status codes identically.

pub mod client;
pub mod request;
pub mod response;

pub use client::HttpClientBuilder;
pub use request::{ApiRequest, RequestBody, UploadFile};
pub use response::decode_response;
