use crate::error::WwoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}: {body}")]
    HttpStatus {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Failed to read response body from {0}")]
    BodyRead(String, #[source] reqwest::Error),

    #[error("Response body is not valid JSON")]
    Json(#[from] serde_json::Error),

    #[error("Response body is not valid XML: {0}")]
    Xml(String),

    #[error("Unexpected response payload: {0}")]
    UnexpectedPayload(String),

    #[error("Provider returned an error: {0}")]
    Message(String),
}

/// Maps a provider-reported error message onto the error kind callers act on.
pub(crate) fn classify_provider_message(message: &str) -> WwoError {
    let lower = message.to_lowercase();
    let throttled = ["calls per", "rate limit", "too many", "quota"]
        .iter()
        .any(|phrase| lower.contains(phrase));
    if throttled {
        return WwoError::RateLimit {
            message: message.to_string(),
        };
    }
    let names_key = lower.contains("key");
    let rejects = ["invalid", "not valid", "expired", "disabled", "missing", "unauthori"]
        .iter()
        .any(|word| lower.contains(word));
    if names_key && rejects {
        return WwoError::Auth {
            message: message.to_string(),
        };
    }
    WwoError::Provider(ProviderError::Message(message.to_string()))
}
