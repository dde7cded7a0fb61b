//! Configuration loader
//!
//! Loads client configuration from a file and the environment.
//!
//! ## Loading Strategy
//! 1. Probes multiple paths for a config file (JSON or TOML)
//! 2. Falls back to built-in defaults when no file exists
//! 3. Applies environment variable overrides on top
//! 4. Validates the result
//!
//! ## Environment Variables
//! - `EMO_PLATFORM_API_ENDPOINT`: API base URL
//! - `EMO_PLATFORM_API_TOKEN_DIR`: Directory for the token files
//! - `EMO_PLATFORM_API_PLAN`: `personal`, `biz_basic` or `biz_advanced`
//! - `EMO_PLATFORM_API_KEY`: Channel key for business plans
//! - `EMO_PLATFORM_API_TIMEOUT`: Request timeout in seconds
//! - `EMO_PLATFORM_WEBHOOK_HOST`: Webhook listener host
//! - `EMO_PLATFORM_WEBHOOK_PORT`: Webhook listener port
//!
//! Credentials are read separately by [`load_env_tokens`] from
//! `EMO_PLATFORM_API_ACCESS_TOKEN` and `EMO_PLATFORM_API_REFRESH_TOKEN`.
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./emo-platform.toml` or `./emo-platform.json` (current working directory)
//! 2. `./config.toml` or `./config.json` (current working directory)
//! 3. `../emo-platform.toml` or `../emo-platform.json` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};

use emo_domain::constants::{
    ENV_ACCESS_TOKEN, ENV_API_KEY, ENV_ENDPOINT_URL, ENV_PLAN, ENV_REFRESH_TOKEN,
    ENV_TIMEOUT_SECS, ENV_TOKEN_DIR, ENV_WEBHOOK_HOST, ENV_WEBHOOK_PORT,
};
use emo_domain::{EmoPlatformError, Plan, PlatformConfig, Result, Tokens};

use crate::errors::to_domain;

/// Load configuration with file discovery and environment overrides
///
/// # Errors
/// Returns `EmoPlatformError::Config` if:
/// - A discovered file cannot be read or parsed
/// - An environment override has an invalid value
/// - The resulting configuration fails validation
pub fn load() -> Result<PlatformConfig> {
    let config = match probe_config_paths() {
        Some(path) => load_from_file(Some(path))?,
        None => {
            tracing::debug!("No config file found, using defaults");
            PlatformConfig::default()
        }
    };

    let config = apply_env_overrides(config, |key| std::env::var(key).ok())?;
    validate(&config)?;
    tracing::info!(endpoint = %config.endpoint_url, plan = %config.plan, "Configuration loaded");
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Arguments
/// * `path` - Optional path to config file. If `None`, uses
///   [`probe_config_paths`].
///
/// # Errors
/// Returns `EmoPlatformError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<PlatformConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(EmoPlatformError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            EmoPlatformError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| EmoPlatformError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `EmoPlatformError::Config` if format is invalid or parsing fails.
pub fn parse_config(contents: &str, path: &Path) -> Result<PlatformConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents).map_err(to_domain),
        "json" => serde_json::from_str(contents)
            .map_err(|e| EmoPlatformError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(EmoPlatformError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Apply environment overrides using `lookup` to read variables
///
/// # Errors
/// Returns `EmoPlatformError::Config` when a variable has an invalid value.
pub fn apply_env_overrides<F>(mut config: PlatformConfig, lookup: F) -> Result<PlatformConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(endpoint) = lookup(ENV_ENDPOINT_URL) {
        config.endpoint_url = endpoint;
    }
    if let Some(dir) = lookup(ENV_TOKEN_DIR) {
        config.token_dir = PathBuf::from(dir);
    }
    if let Some(plan) = lookup(ENV_PLAN) {
        config.plan = plan.parse::<Plan>().map_err(EmoPlatformError::Config)?;
    }
    if let Some(key) = lookup(ENV_API_KEY) {
        config.api_key = Some(key);
    }
    if let Some(timeout) = lookup(ENV_TIMEOUT_SECS) {
        config.timeout_secs = timeout
            .trim()
            .parse()
            .map_err(|e| EmoPlatformError::Config(format!("Invalid timeout: {e}")))?;
    }
    if let Some(host) = lookup(ENV_WEBHOOK_HOST) {
        config.webhook.host = host;
    }
    if let Some(port) = lookup(ENV_WEBHOOK_PORT) {
        config.webhook.port = port
            .trim()
            .parse()
            .map_err(|e| EmoPlatformError::Config(format!("Invalid webhook port: {e}")))?;
    }

    Ok(config)
}

/// Validate a configuration, including the endpoint URL syntax
///
/// # Errors
/// Returns `EmoPlatformError::Config` on the first invalid value.
pub fn validate(config: &PlatformConfig) -> Result<()> {
    config.validate()?;
    let url = url::Url::parse(&config.endpoint_url)
        .map_err(|e| EmoPlatformError::Config(format!("Invalid endpoint URL: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(EmoPlatformError::Config(format!(
            "Endpoint URL must use http or https: {}",
            config.endpoint_url
        )));
    }
    Ok(())
}

/// Read credentials from `EMO_PLATFORM_API_ACCESS_TOKEN` and
/// `EMO_PLATFORM_API_REFRESH_TOKEN`
pub fn load_env_tokens() -> Tokens {
    Tokens::new(std::env::var(ENV_ACCESS_TOKEN).ok(), std::env::var(ENV_REFRESH_TOKEN).ok())
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    const NAMES: [&str; 4] = ["emo-platform.toml", "emo-platform.json", "config.toml", "config.json"];

    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(NAMES.iter().map(|name| cwd.join(name)));
        candidates.push(cwd.join("../emo-platform.toml"));
        candidates.push(cwd.join("../emo-platform.json"));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(NAMES.iter().map(|name| exe_dir.join(name)));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}
