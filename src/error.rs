//! Error types for image generation.

use std::time::Duration;

/// Message shown when the service answered but carried no image payload.
pub const NO_IMAGE_DATA_MESSAGE: &str =
    "Image generation failed: No image data received from the API.";

/// Maximum length of a service error body surfaced to the user.
const MAX_ERROR_MESSAGE_LEN: usize = 500;

/// Errors raised while talking to the image generation service.
#[derive(Debug, thiserror::Error)]
pub enum WeaverError {
    /// API key missing or rejected.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API returned an error response without a recognised error envelope.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The service reported a failure in its own error envelope.
    #[error("{0}")]
    Service(String),

    /// Rate limit or quota exceeded.
    #[error("{message}{}", retry_hint(.retry_after))]
    RateLimited {
        message: String,
        retry_after: Option<Duration>,
    },

    /// Invalid request parameters or unknown model.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to decode base64 data.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// I/O error (e.g., saving file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Startup configuration is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The call succeeded but no image payload came back.
    #[error("No image data received from the API.")]
    NoImageData,
}

/// Result type alias for service operations.
pub type Result<T> = std::result::Result<T, WeaverError>;

/// The single failure kind surfaced by the image request client.
///
/// `message` is what the view shows verbatim in its error banner.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct GenerationError {
    message: String,
    #[source]
    source: WeaverError,
}

impl GenerationError {
    /// Wraps a service failure with its user-facing message.
    pub fn from_service(err: WeaverError) -> Self {
        let message = match &err {
            WeaverError::NoImageData => NO_IMAGE_DATA_MESSAGE.to_string(),
            other => format!("Failed to generate image: {other}"),
        };
        Self {
            message,
            source: err,
        }
    }

    /// The user-facing message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The underlying service error.
    pub fn service_error(&self) -> &WeaverError {
        &self.source
    }
}

impl From<WeaverError> for GenerationError {
    fn from(err: WeaverError) -> Self {
        Self::from_service(err)
    }
}

fn retry_hint(retry_after: &Option<Duration>) -> String {
    match retry_after {
        Some(d) => format!(" (retry after {}s)", d.as_secs()),
        None => String::new(),
    }
}

/// Redacts API keys and caps the length of an error body before it is
/// surfaced.
pub(crate) fn sanitize_error_message(text: &str) -> String {
    let redacted: Vec<String> = text
        .split_whitespace()
        .map(|word| {
            let trimmed = word.trim_matches(|c: char| !c.is_ascii_alphanumeric() && c != '_' && c != '-');
            // Google API keys are 39 chars starting with "AIza".
            if trimmed.starts_with("AIza") && trimmed.len() >= 30 {
                word.replace(trimmed, "[REDACTED]")
            } else if let Some(pos) = word.find("key=") {
                format!("{}key=[REDACTED]", &word[..pos])
            } else {
                word.to_string()
            }
        })
        .collect();
    let joined = redacted.join(" ");

    if joined.chars().count() > MAX_ERROR_MESSAGE_LEN {
        let truncated: String = joined.chars().take(MAX_ERROR_MESSAGE_LEN).collect();
        format!("{truncated}...")
    } else {
        joined
    }
}

/// Reads a `Retry-After` header given in whole seconds.
pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}
