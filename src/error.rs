//! Error types for scene generation.

use std::path::PathBuf;
use std::time::Duration;

/// Longest error body kept in an error message.
const MAX_ERROR_MESSAGE_LEN: usize = 500;

/// Errors that can occur while selecting, encoding, or composing an image.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// The selected file is not an image.
    #[error("{0}")]
    Validation(String),

    /// Reading the selected image failed.
    #[error("failed to read image: {0}")]
    Read(#[from] std::io::Error),

    /// A configuration or prompt file could not be read.
    #[error("failed to read config file {}: {source}", path.display())]
    Config {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Generation was triggered before an image was selected and encoded.
    #[error("please upload an image first")]
    MissingImage,

    /// API key missing or invalid.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Sanitized response body.
        message: String,
    },

    /// Rate limit or quota exceeded.
    #[error("rate limited: {message}{}", retry_hint(.retry_after))]
    RateLimited {
        /// Sanitized service message.
        message: String,
        /// Server-suggested delay, if any.
        retry_after: Option<Duration>,
    },

    /// Content was blocked by safety filters.
    #[error("content blocked: {0}")]
    ContentBlocked(String),

    /// The service answered but no candidate part carried an image.
    #[error("no image produced - the request may have been refused")]
    NoImage,

    /// Invalid request parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Service call failed with a free-form message (used by non-HTTP services).
    #[error("generation failed: {0}")]
    Generation(String),

    /// Network or HTTP error.
    #[cfg(feature = "gemini")]
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to decode base64 data.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse classification of a [`SceneError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected locally before any state change.
    Validation,
    /// The image could not be read or encoded.
    Read,
    /// The remote call failed or returned no usable image.
    Generation,
}

impl SceneError {
    /// Returns the coarse kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::MissingImage | Self::Config { .. } => {
                ErrorKind::Validation
            }
            Self::Read(_) => ErrorKind::Read,
            _ => ErrorKind::Generation,
        }
    }
}

fn retry_hint(retry_after: &Option<Duration>) -> String {
    match retry_after {
        Some(delay) => format!(" (retry after {}s)", delay.as_secs()),
        None => String::new(),
    }
}

/// Result type alias for scene generation operations.
pub type Result<T> = std::result::Result<T, SceneError>;

/// Strips secrets and truncates an error body before it reaches a message.
#[cfg_attr(not(feature = "gemini"), allow(dead_code))]
pub(crate) fn sanitize_error_message(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len().min(MAX_ERROR_MESSAGE_LEN));
    for token in text.split_inclusive(char::is_whitespace) {
        let word = token.trim_end();
        if word.starts_with("AIza") || word.contains("key=") {
            cleaned.push_str("[redacted]");
            cleaned.push_str(&token[word.len()..]);
        } else {
            cleaned.push_str(token);
        }
    }

    let trimmed = cleaned.trim();
    if trimmed.chars().count() <= MAX_ERROR_MESSAGE_LEN {
        return trimmed.to_string();
    }
    let truncated: String = trimmed.chars().take(MAX_ERROR_MESSAGE_LEN).collect();
    format!("{truncated}...")
}

/// Reads a `Retry-After` header expressed in whole seconds.
#[cfg(feature = "gemini")]
pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}
