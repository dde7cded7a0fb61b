//! Client configuration structures

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ENDPOINT_URL, DEFAULT_POLL_INTERVAL_SECS, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_TOKEN_DIR, DEFAULT_WEBHOOK_HOST, DEFAULT_WEBHOOK_PORT,
};
use crate::errors::{EmoPlatformError, Result};
use crate::types::Plan;

/// Client configuration, loadable from TOML or JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    pub endpoint_url: String,
    /// Directory holding the saved token files.
    pub token_dir: PathBuf,
    pub plan: Plan,
    /// Channel key required by business plans.
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    /// Treat the saved token file as authoritative.
    pub use_cached_credentials: bool,
    pub webhook: WebhookConfig,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            endpoint_url: DEFAULT_ENDPOINT_URL.to_string(),
            token_dir: PathBuf::from(DEFAULT_TOKEN_DIR),
            plan: Plan::Personal,
            api_key: None,
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            use_cached_credentials: false,
            webhook: WebhookConfig::default(),
        }
    }
}

impl PlatformConfig {
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check values that cannot be expressed by the types alone.
    ///
    /// # Errors
    ///
    /// Returns `Config` when a business plan has no API key, the timeout is
    /// zero or the endpoint URL is empty.
    pub fn validate(&self) -> Result<()> {
        if self.endpoint_url.trim().is_empty() {
            return Err(EmoPlatformError::Config("endpoint_url must not be empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(EmoPlatformError::Config("timeout_secs must be greater than 0".to_string()));
        }
        if self.plan.is_business() && self.api_key.as_deref().map_or(true, str::is_empty) {
            return Err(EmoPlatformError::Config(format!(
                "the {} plan requires an api_key",
                self.plan.label()
            )));
        }
        Ok(())
    }
}

/// Local webhook listener and poller settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    pub host: String,
    pub port: u16,
    pub poll_interval_secs: u64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_WEBHOOK_HOST.to_string(),
            port: DEFAULT_WEBHOOK_PORT,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_production() {
        let config = PlatformConfig::default();
        assert_eq!(config.endpoint_url, "https://platform-api.bocco.me");
        assert_eq!(config.webhook.port, 8000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn business_plan_requires_api_key() {
        let mut config = PlatformConfig { plan: Plan::BizAdvanced, ..PlatformConfig::default() };
        assert!(matches!(config.validate(), Err(EmoPlatformError::Config(_))));

        config.api_key = Some("key".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = PlatformConfig { timeout_secs: 0, ..PlatformConfig::default() };
        assert!(config.validate().is_err());
    }
}
