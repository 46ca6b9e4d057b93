//! Send/receive plumbing shared by every adapter.

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{DispatchError, Result};

/// Send `request` and return the response body of a 2xx reply.
///
/// Non-2xx replies become [`DispatchError::Http`] carrying the provider's own
/// error message when its envelope has one.
pub async fn send_for_text(label: &str, request: RequestBuilder) -> Result<String> {
    let response = request
        .send()
        .await
        .map_err(|e| DispatchError::from_transport(label, e))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        log::warn!("{} API returned {}: {}", label, status, body);
        return Err(DispatchError::Http {
            status: status.as_u16(),
            message: http_error_message(label, &body),
        });
    }

    response
        .text()
        .await
        .map_err(|e| DispatchError::from_transport(label, e))
}

/// Decode a successful body into the provider's typed response.
pub fn decode_json<T: DeserializeOwned>(label: &str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| {
        log::debug!("{} response did not match the expected schema: {}", label, e);
        DispatchError::malformed(format!("{label} returned an unexpected response: {e}"))
    })
}

/// Message from an `{"error": {"message": ..}}` or `{"error": ".."}` envelope.
pub fn provider_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let error = value.get("error")?;
    let message = match error {
        Value::String(s) => s.as_str(),
        Value::Object(_) => error.get("message")?.as_str()?,
        _ => return None,
    };
    let message = message.trim();
    (!message.is_empty()).then(|| message.to_string())
}

fn http_error_message(label: &str, body: &str) -> String {
    provider_error_message(body).unwrap_or_else(|| {
        let body = body.trim();
        if body.is_empty() {
            format!("{label} API Error")
        } else {
            format!("{label} API Error: {body}")
        }
    })
}

/// Trim extracted text; a missing or blank result is a malformed response.
pub fn require_text(label: &str, text: Option<&str>) -> Result<String> {
    match text.map(str::trim) {
        Some(t) if !t.is_empty() => Ok(t.to_string()),
        Some(_) => Err(DispatchError::malformed(format!("{label} returned empty text"))),
        None => Err(DispatchError::malformed(format!(
            "{label} response contained no text"
        ))),
    }
}
