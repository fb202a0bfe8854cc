use std::time::Duration;

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// The error body returned by the API alongside a non-2xx status.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ErrorPayload {
    /// Machine-readable code, e.g. `"insufficient_credits"`.
    #[serde(default = "unknown_code")]
    pub code: String,

    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub details: Option<Map<String, Value>>,
}

fn unknown_code() -> String {
    "unknown_error".to_string()
}

/// Fields shared by every error the API itself reports.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub status: u16,
    pub code: String,
    pub message: String,
    pub details: Option<Map<String, Value>>,
}

impl ApiError {
    pub(crate) fn new(status: u16, payload: ErrorPayload) -> Self {
        Self {
            status,
            code: payload.code,
            message: payload.message,
            details: payload.details,
        }
    }
}

/// Discriminant of a [`TranscriptError`], for matching without destructuring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidRequest,
    Authentication,
    InsufficientCredits,
    NoCaptions,
    RateLimit,
    Api,
    Config,
    Timeout,
    PollTimeout,
    Http,
    Json,
}

/// All errors that can occur when using the VidTranscript SDK.
#[derive(Error, Debug)]
pub enum TranscriptError {
    /// The request was malformed or referenced an invalid video (HTTP 400).
    #[error("invalid request ({}): {}", .0.code, .0.message)]
    InvalidRequest(ApiError),

    /// The API key is missing or invalid (HTTP 401).
    #[error("authentication failed ({}): {}", .0.code, .0.message)]
    Authentication(ApiError),

    /// The account has no credits left for this operation (HTTP 402).
    #[error("insufficient credits ({}): {}", .0.code, .0.message)]
    InsufficientCredits(ApiError),

    /// The video has no captions in the requested language (HTTP 404).
    #[error("no captions ({}): {}", .0.code, .0.message)]
    NoCaptions(ApiError),

    /// The request was rate-limited (HTTP 429).
    #[error("rate limited (retry after {retry_after:?}s) ({}): {}", .error.code, .error.message)]
    RateLimit {
        error: ApiError,
        /// Seconds from the `Retry-After` header, when present and numeric.
        retry_after: Option<u64>,
    },

    /// Any other non-success status.
    #[error("API error {} ({}): {}", .0.status, .0.code, .0.message)]
    Api(ApiError),

    /// The client could not be constructed, e.g. no API key was available.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A single request did not complete within the client timeout.
    #[error("request to {path} timed out after {timeout:?}")]
    Timeout { path: String, timeout: Duration },

    /// A polling loop used up its attempts without reaching a terminal status.
    #[error("{resource} {id} did not finish after {attempts} polling attempts")]
    PollTimeout {
        resource: &'static str,
        id: String,
        attempts: u32,
    },

    /// A transport-level HTTP error from reqwest.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A request body could not be encoded or a response body decoded.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl TranscriptError {
    /// Map an HTTP status and error body to the matching variant.
    pub(crate) fn from_status(status: u16, payload: ErrorPayload, retry_after: Option<u64>) -> Self {
        let error = ApiError::new(status, payload);
        match status {
            400 => Self::InvalidRequest(error),
            401 => Self::Authentication(error),
            402 => Self::InsufficientCredits(error),
            404 => Self::NoCaptions(error),
            429 => Self::RateLimit { error, retry_after },
            _ => Self::Api(error),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Self::Authentication(_) => ErrorKind::Authentication,
            Self::InsufficientCredits(_) => ErrorKind::InsufficientCredits,
            Self::NoCaptions(_) => ErrorKind::NoCaptions,
            Self::RateLimit { .. } => ErrorKind::RateLimit,
            Self::Api(_) => ErrorKind::Api,
            Self::Config(_) => ErrorKind::Config,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::PollTimeout { .. } => ErrorKind::PollTimeout,
            Self::Http(_) => ErrorKind::Http,
            Self::Json(_) => ErrorKind::Json,
        }
    }

    /// The API error carried by this variant, if the server reported one.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::InvalidRequest(e)
            | Self::Authentication(e)
            | Self::InsufficientCredits(e)
            | Self::NoCaptions(e)
            | Self::Api(e)
            | Self::RateLimit { error: e, .. } => Some(e),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        self.api_error().map(|e| e.status)
    }

    pub fn code(&self) -> Option<&str> {
        self.api_error().map(|e| e.code.as_str())
    }

    pub fn message(&self) -> Option<&str> {
        self.api_error().map(|e| e.message.as_str())
    }

    pub fn details(&self) -> Option<&Map<String, Value>> {
        self.api_error().and_then(|e| e.details.as_ref())
    }

    /// Seconds to wait before retrying, only set on [`TranscriptError::RateLimit`].
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            Self::RateLimit { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

/// Parse an error body. Accepts `{"error": {...}}`, `{"error": "msg"}` and a
/// top-level `{code, message, details}`. Non-JSON bodies keep the raw text.
pub(crate) fn parse_error_payload(body: &[u8]) -> ErrorPayload {
    let text = String::from_utf8_lossy(body);

    let Ok(value) = serde_json::from_slice::<Value>(body) else {
        return ErrorPayload {
            code: unknown_code(),
            message: text.trim().to_string(),
            details: None,
        };
    };

    let parsed = match value.get("error") {
        Some(inner @ Value::Object(_)) if has_error_fields(inner) => {
            serde_json::from_value(inner.clone()).ok()
        }
        Some(Value::String(message)) => Some(ErrorPayload {
            code: value
                .get("code")
                .and_then(|c| c.as_str())
                .map_or_else(unknown_code, str::to_string),
            message: message.clone(),
            details: None,
        }),
        _ if has_error_fields(&value) => serde_json::from_value(value.clone()).ok(),
        _ => None,
    };

    parsed.unwrap_or_else(|| ErrorPayload {
        code: unknown_code(),
        message: text.trim().to_string(),
        details: None,
    })
}

/// An object only counts as an error payload if it names a code or message.
fn has_error_fields(value: &Value) -> bool {
    ["code", "message"]
        .iter()
        .any(|key| value.get(key).is_some_and(Value::is_string))
}

/// `Retry-After` as integer seconds; anything else (HTTP dates included) is ignored.
pub(crate) fn parse_retry_after(value: Option<&str>) -> Option<u64> {
    value.and_then(|v| v.trim().parse::<u64>().ok())
}

/// A convenience alias for `Result<T, TranscriptError>`.
pub type Result<T> = std::result::Result<T, TranscriptError>;
