use std::time::Duration;
use thiserror::Error;

/// Google RPC status carried in the `error.status` field of an error body.
///
/// Only the values the speech pipeline routes on get their own variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiStatus {
    ResourceExhausted,
    InvalidArgument,
    PermissionDenied,
    NotFound,
    Unauthenticated,
    Unavailable,
    Internal,
    DeadlineExceeded,
    Other(String),
}

impl ApiStatus {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::ResourceExhausted => "RESOURCE_EXHAUSTED",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::NotFound => "NOT_FOUND",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Unavailable => "UNAVAILABLE",
            Self::Internal => "INTERNAL",
            Self::DeadlineExceeded => "DEADLINE_EXCEEDED",
            Self::Other(other) => other,
        }
    }
}

impl From<String> for ApiStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "RESOURCE_EXHAUSTED" => Self::ResourceExhausted,
            "INVALID_ARGUMENT" => Self::InvalidArgument,
            "PERMISSION_DENIED" => Self::PermissionDenied,
            "NOT_FOUND" => Self::NotFound,
            "UNAUTHENTICATED" => Self::Unauthenticated,
            "UNAVAILABLE" => Self::Unavailable,
            "INTERNAL" => Self::Internal,
            "DEADLINE_EXCEEDED" => Self::DeadlineExceeded,
            _ => Self::Other(value),
        }
    }
}

impl std::fmt::Display for ApiStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced by the wire layer.
///
/// # Example: Routing on API errors
///
/// ```ignore
/// match genai_client::generate_content(&transport, model, key, &request, timeout).await {
///     Err(InternalError::Api { status_code: 429, .. }) => {
///         tracing::warn!("Rate limited");
///     }
///     Err(InternalError::Api { status: Some(ApiStatus::InvalidArgument), message, .. }) => {
///         tracing::error!("Rejected: {message}");
///     }
///     // ...
/// }
/// ```
#[derive(Debug, Error)]
pub enum InternalError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    /// Non-200 response with whatever structure could be recovered from the body.
    #[error("API error (HTTP {status_code}): {message}")]
    Api {
        /// HTTP status code (e.g., 400, 429, 500)
        status_code: u16,
        /// `error.message` from the body, or a truncated raw body
        message: String,
        /// `error.status` from the body, if present
        status: Option<ApiStatus>,
        /// `error.details[].reason` values, if present
        reasons: Vec<String>,
        /// Request ID from `x-goog-request-id` header, if available
        request_id: Option<String>,
    },
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    /// A 200 response whose body did not match the expected schema.
    #[error("Malformed API response: {0}")]
    MalformedResponse(String),
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}

impl InternalError {
    /// Returns the HTTP status code for API errors.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}
