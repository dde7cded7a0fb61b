use emo_domain::{EmoPlatformError, RequestInfo, Result};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

/// Turn a status code and body text into a typed result.
///
/// Non-success statuses become the matching [`EmoPlatformError`] kind with the
/// body text as message. Empty bodies (including 204/205) decode from JSON
/// `null`.
///
/// # Errors
///
/// Returns the mapped status error, or `Serialization` if the body does not
/// match `T`.
pub fn decode_response<T: DeserializeOwned>(
    status: StatusCode,
    body: &str,
    request: RequestInfo,
) -> Result<T> {
    if !status.is_success() {
        return Err(EmoPlatformError::from_status(status.as_u16(), body, request));
    }

    let no_content = status == StatusCode::NO_CONTENT || status == StatusCode::RESET_CONTENT;
    if no_content || body.trim().is_empty() {
        return serde_json::from_value(serde_json::Value::Null).map_err(|_| {
            EmoPlatformError::Serialization(format!(
                "{request} returned no content ({}), but the response type cannot be empty",
                status.as_u16()
            ))
        });
    }

    serde_json::from_str(body).map_err(|e| {
        EmoPlatformError::Serialization(format!("failed to parse response of {request}: {e}"))
    })
}
