//! Error types for flyer generation.

use std::time::Duration;

/// Message shown when a failure carries no text of its own.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "An error occurred while generating the flyer. Please try again.";

/// Message shown when the description field is blank.
pub const EMPTY_DESCRIPTION_MESSAGE: &str = "Please provide a description of the flyer.";

/// Message returned when the response holds no inline image.
pub const NO_IMAGE_MESSAGE: &str =
    "Failed to generate flyer image. Ensure images are valid and try again.";

/// Errors that can occur while building, sending or storing a flyer.
#[derive(Debug, thiserror::Error)]
pub enum FlyerError {
    /// Form input rejected before any remote call.
    #[error("{0}")]
    Validation(String),

    /// The remote call succeeded but returned no usable image.
    #[error("{0}")]
    Generation(String),

    /// A submission is already outstanding.
    #[error("a flyer generation is already in progress")]
    Busy,

    /// Download requested with no generated flyer.
    #[error("no generated flyer to download")]
    NoResult,

    /// API key missing or invalid.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Rate limit or quota exceeded.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    /// Content was blocked by safety filters.
    #[error("content blocked: {0}")]
    ContentBlocked(String),

    /// Invalid request parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to decode base64 data or a data URL.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// I/O error (reading an attachment, writing a download).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FlyerError {
    /// Returns true when the failure came from the remote capability.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Auth(_)
                | Self::Api { .. }
                | Self::RateLimited { .. }
                | Self::ContentBlocked(_)
                | Self::Network(_)
                | Self::Json(_)
        )
    }

    /// Returns the single message shown to the user for this failure.
    ///
    /// Falls back to [`GENERIC_FAILURE_MESSAGE`] when the error renders empty.
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            GENERIC_FAILURE_MESSAGE.to_string()
        } else {
            message
        }
    }
}

/// Result type alias for flyer operations.
pub type Result<T> = std::result::Result<T, FlyerError>;

/// Maximum length kept from a remote error body.
const MAX_ERROR_MESSAGE_LEN: usize = 500;

/// Trims a remote error body to something fit for display.
///
/// Extracts `error.message` from Google-style JSON bodies, collapses
/// whitespace and truncates on a char boundary.
pub(crate) fn sanitize_error_message(text: &str) -> String {
    let extracted = serde_json::from_str::<serde_json::Value>(text)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| text.to_string());

    let collapsed = extracted.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= MAX_ERROR_MESSAGE_LEN {
        return collapsed;
    }
    let mut truncated: String = collapsed.chars().take(MAX_ERROR_MESSAGE_LEN).collect();
    truncated.push_str("...");
    truncated
}

/// Reads a `Retry-After` header expressed in seconds.
pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}
