//! Conversions from external infrastructure errors into domain errors.

use emo_domain::EmoPlatformError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub EmoPlatformError);

impl From<InfraError> for EmoPlatformError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<EmoPlatformError> for InfraError {
    fn from(value: EmoPlatformError) -> Self {
        Self(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoEmoError {
    fn into_emo(self) -> EmoPlatformError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → EmoPlatformError */
/* -------------------------------------------------------------------------- */

impl IntoEmoError for HttpError {
    fn into_emo(self) -> EmoPlatformError {
        if self.is_timeout() {
            return EmoPlatformError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return EmoPlatformError::Network(format!("HTTP connection failure: {self}"));
        }

        if self.is_builder() {
            return EmoPlatformError::Config(format!("invalid HTTP request: {self}"));
        }

        if self.is_decode() {
            return EmoPlatformError::Serialization(format!("failed to decode response: {self}"));
        }

        EmoPlatformError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        Self(value.into_emo())
    }
}

/* -------------------------------------------------------------------------- */
/* toml::de::Error → EmoPlatformError */
/* -------------------------------------------------------------------------- */

impl IntoEmoError for toml::de::Error {
    fn into_emo(self) -> EmoPlatformError {
        EmoPlatformError::Config(format!("Invalid TOML format: {self}"))
    }
}

impl From<toml::de::Error> for InfraError {
    fn from(value: toml::de::Error) -> Self {
        Self(value.into_emo())
    }
}

/// Shorthand for `EmoPlatformError::from(InfraError::from(err))`.
pub fn to_domain<E>(err: E) -> EmoPlatformError
where
    InfraError: From<E>,
{
    InfraError::from(err).into()
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
