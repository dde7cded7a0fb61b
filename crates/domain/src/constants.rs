//! Platform constants
//!
//! Centralized location for endpoint defaults, header names, file names and
//! environment variable names shared by the client crates.

// Endpoint
pub const DEFAULT_ENDPOINT_URL: &str = "https://platform-api.bocco.me";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// Token persistence
pub const TOKEN_FILE_NAME: &str = "emo-platform-api.json";
pub const PREVIOUS_TOKEN_FILE_NAME: &str = "emo-platform-api_previous.json";
pub const DEFAULT_TOKEN_DIR: &str = ".emo-platform";

// Credentials from the environment
pub const ENV_ACCESS_TOKEN: &str = "EMO_PLATFORM_API_ACCESS_TOKEN";
pub const ENV_REFRESH_TOKEN: &str = "EMO_PLATFORM_API_REFRESH_TOKEN";

// Configuration overrides from the environment
pub const ENV_ENDPOINT_URL: &str = "EMO_PLATFORM_API_ENDPOINT";
pub const ENV_TOKEN_DIR: &str = "EMO_PLATFORM_API_TOKEN_DIR";
pub const ENV_PLAN: &str = "EMO_PLATFORM_API_PLAN";
pub const ENV_API_KEY: &str = "EMO_PLATFORM_API_KEY";
pub const ENV_TIMEOUT_SECS: &str = "EMO_PLATFORM_API_TIMEOUT";
pub const ENV_WEBHOOK_HOST: &str = "EMO_PLATFORM_WEBHOOK_HOST";
pub const ENV_WEBHOOK_PORT: &str = "EMO_PLATFORM_WEBHOOK_PORT";

// Headers
pub const CHANNEL_USER_HEADER: &str = "X-Channel-User";
pub const WEBHOOK_SECRET_HEADER: &str = "x-platform-api-secret";

// Webhook delivery
pub const DEFAULT_WEBHOOK_HOST: &str = "localhost";
pub const DEFAULT_WEBHOOK_PORT: u16 = 8000;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;
pub const MAX_SAVED_REQUEST_IDS: usize = 10;
pub const MAX_CONCURRENT_POLL_REQUESTS: usize = 2;

/// Room key that matches every room when registering a webhook callback.
pub const ALL_ROOMS: &str = "";

/// Event type emitted for new room messages.
pub const MESSAGE_RECEIVED_EVENT: &str = "message.received";
