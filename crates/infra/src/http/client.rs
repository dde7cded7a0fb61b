use std::time::Duration;

use emo_domain::constants::DEFAULT_REQUEST_TIMEOUT_SECS;
use emo_domain::Result;

use crate::errors::to_domain;

const USER_AGENT: &str = concat!("emo-platform-rs/", env!("CARGO_PKG_VERSION"));

/// Builder for the reqwest clients behind [`crate::AsyncClient`] and
/// [`crate::Client`].
#[derive(Debug, Clone)]
pub struct HttpClientBuilder {
    timeout: Duration,
    user_agent: Option<String>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS), user_agent: None }
    }
}

impl HttpClientBuilder {
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    fn agent(&self) -> String {
        self.user_agent.clone().unwrap_or_else(|| USER_AGENT.to_string())
    }

    /// Build an async client.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn build_async(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.agent())
            .no_proxy()
            .build()
            .map_err(to_domain)
    }

    /// Build a blocking client.
    ///
    /// Must not be called from inside an async runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn build_blocking(&self) -> Result<reqwest::blocking::Client> {
        reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.agent())
            .no_proxy()
            .build()
            .map_err(to_domain)
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn async_client_sends_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .and(header("user-agent", "emo-test"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClientBuilder::default().user_agent("emo-test").build_async().unwrap();
        let response = client.get(format!("{}/ping", server.uri())).send().await.unwrap();
        assert!(response.status().is_success());
    }

    #[tokio::test]
    async fn timeout_is_applied() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let client =
            HttpClientBuilder::default().timeout(Duration::from_millis(50)).build_async().unwrap();
        let err = client.get(format!("{}/slow", server.uri())).send().await.unwrap_err();
        assert!(err.is_timeout());
    }
}
