//! Shared HTTP plumbing for vendor adapters
//!
//! Status codes and transport errors are classified here so every adapter
//! reports the same [`ProviderError`] for the same situation.

use hotbox_application::ProviderError;
use hotbox_domain::util::preview;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

/// Send a request and decode a JSON body.
pub(crate) async fn send_json<T: DeserializeOwned>(
    request: RequestBuilder,
) -> Result<T, ProviderError> {
    let response = request.send().await.map_err(transport_error)?;
    let status = response.status();
    let body = response.text().await.map_err(transport_error)?;

    if !status.is_success() {
        return Err(status_error(status, &body));
    }

    decode(&body)
}

pub(crate) fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ProviderError> {
    serde_json::from_str(body).map_err(|e| {
        ProviderError::MalformedResponse(format!("{} in body: {}", e, preview(body, 120)))
    })
}

/// Classify a non-success HTTP status
pub(crate) fn status_error(status: StatusCode, body: &str) -> ProviderError {
    let detail = format!("HTTP {}: {}", status.as_u16(), preview(body, 200));
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::Unauthorized(detail),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited(detail),
        _ => ProviderError::Transport(detail),
    }
}

pub(crate) fn transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout
    } else if e.is_decode() {
        ProviderError::MalformedResponse(e.to_string())
    } else {
        ProviderError::Transport(e.to_string())
    }
}
