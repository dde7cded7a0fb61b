//! Error types used throughout the client

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Plan;

/// Description of the request that produced an HTTP error.
///
/// Credential-bearing headers are redacted on insertion so the value can be
/// logged or shown to a user as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestInfo {
    pub method: String,
    pub url: String,
    pub headers: BTreeMap<String, String>,
}

const REDACTED: &str = "<redacted>";
const SENSITIVE_HEADERS: [&str; 2] = ["authorization", "x-channel-user"];

impl RequestInfo {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self { method: method.into(), url: url.into(), headers: BTreeMap::new() }
    }

    /// Adds a header, redacting its value when it carries a credential.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = if SENSITIVE_HEADERS.contains(&name.to_ascii_lowercase().as_str()) {
            REDACTED.to_string()
        } else {
            value.into()
        };
        self.headers.insert(name, value);
        self
    }
}

impl fmt::Display for RequestInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// Main error type for the emo platform client
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail")]
pub enum EmoPlatformError {
    #[error("Bad request ({request}): {message}")]
    BadRequest { message: String, request: RequestInfo },

    #[error("Unauthorized ({request}): {message}")]
    Unauthorized { message: String, request: RequestInfo },

    #[error("Not found ({request}): {message}")]
    NotFound { message: String, request: RequestInfo },

    #[error("Rate limit exceeded ({request}): {message}")]
    RateLimit { message: String, request: RequestInfo },

    #[error("Unexpected status {status} ({request}): {message}")]
    Unknown { status: u16, message: String, request: RequestInfo },

    #[error("Token error: {0}")]
    Token(String),

    #[error("No room: {0}")]
    NoRoom(String),

    #[error("{operation} is not available on the {plan} plan")]
    Unavailable { plan: Plan, operation: String },

    #[error("Webhook request error: {0}")]
    WebhookRequest(String),

    #[error("Webhook callback error: {0}")]
    WebhookCallback(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Coarse classification of [`EmoPlatformError`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,
    Unauthorized,
    NotFound,
    RateLimit,
    Unknown,
    Token,
    NoRoom,
    Unavailable,
    WebhookRequest,
    WebhookCallback,
    Config,
    Network,
    Io,
    Serialization,
}

impl EmoPlatformError {
    /// Map a non-success HTTP status to its error kind.
    ///
    /// # Arguments
    ///
    /// * `status` - HTTP status code returned by the platform
    /// * `message` - Response body text
    /// * `request` - The request that produced the response
    pub fn from_status(status: u16, message: impl Into<String>, request: RequestInfo) -> Self {
        let message = message.into();
        match status {
            400 => Self::BadRequest { message, request },
            401 => Self::Unauthorized { message, request },
            404 => Self::NotFound { message, request },
            429 => Self::RateLimit { message, request },
            _ => Self::Unknown { status, message, request },
        }
    }

    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::BadRequest { .. } => ErrorKind::BadRequest,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::RateLimit { .. } => ErrorKind::RateLimit,
            Self::Unknown { .. } => ErrorKind::Unknown,
            Self::Token(_) => ErrorKind::Token,
            Self::NoRoom(_) => ErrorKind::NoRoom,
            Self::Unavailable { .. } => ErrorKind::Unavailable,
            Self::WebhookRequest(_) => ErrorKind::WebhookRequest,
            Self::WebhookCallback(_) => ErrorKind::WebhookCallback,
            Self::Config(_) => ErrorKind::Config,
            Self::Network(_) => ErrorKind::Network,
            Self::Io(_) => ErrorKind::Io,
            Self::Serialization(_) => ErrorKind::Serialization,
        }
    }

    /// Request metadata for HTTP status errors.
    pub const fn request_info(&self) -> Option<&RequestInfo> {
        match self {
            Self::BadRequest { request, .. }
            | Self::Unauthorized { request, .. }
            | Self::NotFound { request, .. }
            | Self::RateLimit { request, .. }
            | Self::Unknown { request, .. } => Some(request),
            _ => None,
        }
    }

    /// HTTP status code for status errors.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::BadRequest { .. } => Some(400),
            Self::Unauthorized { .. } => Some(401),
            Self::NotFound { .. } => Some(404),
            Self::RateLimit { .. } => Some(429),
            Self::Unknown { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

impl From<serde_json::Error> for EmoPlatformError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for EmoPlatformError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Result type alias for emo platform operations
pub type Result<T> = std::result::Result<T, EmoPlatformError>;
