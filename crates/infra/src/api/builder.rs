use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use emo_domain::{Plan, PlatformConfig, Result, Tokens};
use tracing::info;

use super::blocking::Client;
use super::client::AsyncClient;
use super::shared::ClientCore;
use crate::auth::TokenStore;
use crate::config;
use crate::http::HttpClientBuilder;

/// Builder for [`AsyncClient`] and [`Client`].
///
/// Starts from [`PlatformConfig::default`]; credentials default to the
/// `EMO_PLATFORM_API_*_TOKEN` environment variables.
///
/// ```no_run
/// use emo_domain::Plan;
/// use emo_infra::ClientBuilder;
///
/// # async fn demo() -> emo_domain::Result<()> {
/// let client = ClientBuilder::new()
///     .plan(Plan::BizAdvanced)
///     .api_key("channel-key")
///     .build_async()?;
/// let rooms = client.get_rooms_id().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ClientBuilder {
    config: PlatformConfig,
    tokens: Tokens,
    env_tokens: Option<Tokens>,
    user_agent: Option<String>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a loaded configuration.
    pub fn from_config(config: PlatformConfig) -> Self {
        Self { config, ..Self::default() }
    }

    #[must_use]
    pub fn endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint_url = url.into();
        self
    }

    #[must_use]
    pub fn token_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.token_dir = dir.into();
        self
    }

    #[must_use]
    pub const fn plan(mut self, plan: Plan) -> Self {
        self.config.plan = plan;
        self
    }

    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    /// Explicit credentials; these win over the environment.
    #[must_use]
    pub fn tokens(mut self, tokens: Tokens) -> Self {
        self.tokens = tokens;
        self
    }

    #[must_use]
    pub fn refresh_token(mut self, token: impl Into<String>) -> Self {
        self.tokens = Tokens::new(self.tokens.access_token.take(), Some(token.into()));
        self
    }

    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout_secs = timeout.as_secs();
        self
    }

    #[must_use]
    pub const fn use_cached_credentials(mut self, enabled: bool) -> Self {
        self.config.use_cached_credentials = enabled;
        self
    }

    /// Use `tokens` instead of reading the environment.
    #[must_use]
    pub fn env_tokens(mut self, tokens: Tokens) -> Self {
        self.env_tokens = Some(tokens);
        self
    }

    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    fn http(&self) -> HttpClientBuilder {
        let builder = HttpClientBuilder::default().timeout(self.config.timeout());
        match &self.user_agent {
            Some(agent) => builder.user_agent(agent.clone()),
            None => builder,
        }
    }

    fn core(self) -> Result<ClientCore> {
        config::validate(&self.config)?;
        let env = self.env_tokens.unwrap_or_else(config::load_env_tokens);
        let store = TokenStore::open(
            &self.config.token_dir,
            self.tokens,
            env,
            self.config.use_cached_credentials,
        )?;

        info!(endpoint = %self.config.endpoint_url, plan = %self.config.plan, "Client configured");
        Ok(ClientCore::new(self.config.endpoint_url, self.config.plan, self.config.api_key, store))
    }

    /// Build the async client.
    ///
    /// # Errors
    ///
    /// Returns `Config` for an invalid configuration, `Token` when no
    /// credentials are available, or `Io` when the token directory cannot be
    /// prepared.
    pub fn build_async(self) -> Result<AsyncClient> {
        let http = self.http().build_async()?;
        Ok(AsyncClient::from_parts(Arc::new(self.core()?), http))
    }

    /// Build the blocking client.
    ///
    /// Must not be called from inside an async runtime.
    ///
    /// # Errors
    ///
    /// Same as [`ClientBuilder::build_async`].
    pub fn build_blocking(self) -> Result<Client> {
        let http = self.http().build_blocking()?;
        Ok(Client::from_parts(Arc::new(self.core()?), http))
    }
}
