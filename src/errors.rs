use genai_client::{ApiStatus, InternalError};
use std::time::Duration;
use thiserror::Error;

/// Everything that can go wrong while producing speech.
///
/// None of these escape [`Synthesizer::generate`](crate::Synthesizer::generate);
/// each one is turned into a placeholder buffer and a status message. The
/// variants exist so the orchestrator can route on structure rather than on
/// error text.
///
/// # Example: Routing a failure
///
/// ```
/// use genai_tts::{FailureKind, TtsError};
///
/// let error = TtsError::RateLimited {
///     message: "Quota exceeded".to_string(),
///     request_id: None,
/// };
/// assert_eq!(error.failure_kind(), FailureKind::RateLimit);
/// assert!(!error.is_retryable());
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TtsError {
    #[error("API key required")]
    CredentialMissing,
    #[error("Invalid API key format: {preview}... (length: {length})")]
    CredentialMalformed { preview: String, length: usize },
    #[error("Invalid project ID format: {0}")]
    BillingProjectMalformed(String),
    /// HTTP 429 or `RESOURCE_EXHAUSTED`.
    #[error("Rate limit (429): {message}")]
    RateLimited {
        message: String,
        request_id: Option<String>,
    },
    /// The API rejected the key or the request arguments (`INVALID_ARGUMENT`).
    #[error("API key not valid (INVALID_ARGUMENT): {message}")]
    CredentialInvalid { message: String },
    /// 403, `PERMISSION_DENIED`, or a billing/project problem.
    #[error("{}", describe_billing(.status_code, .message, *.paid_tier, .billing_project))]
    BillingPermissionDenied {
        status_code: u16,
        message: String,
        issue: BillingIssue,
        paid_tier: bool,
        /// Billing project the request was made against, when on the paid tier.
        billing_project: Option<String>,
    },
    /// 5xx that outlived the retry budget.
    #[error("REST API error {status_code}: {message}")]
    Server { status_code: u16, message: String },
    #[error("Request timeout after {0:?}")]
    Timeout(Duration),
    #[error("Request failed: {0}")]
    Http(#[source] reqwest::Error),
    #[error("Malformed API response: {0}")]
    MalformedResponse(String),
    /// Any other non-200 status.
    #[error("REST API error {status_code}: {message}")]
    Api { status_code: u16, message: String },
    #[error("Max retries exceeded")]
    RetriesExhausted,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Credential store error: {0}")]
    Store(#[from] StoreError),
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}

/// Which remediation a billing/permission failure calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillingIssue {
    /// The billing project does not exist or was deleted.
    ProjectNotFound,
    /// The key may not use the billing project (`USER_PROJECT_DENIED`).
    ProjectDenied,
    /// Anything else: billing disabled, API not enabled, missing permission.
    Configuration,
}

/// The four handling branches a failed synthesis attempt can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    RateLimit,
    InvalidCredential,
    BillingPermission,
    Generic,
}

/// Tier and project of the request an API error came back for.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct BillingContext<'a> {
    pub paid_tier: bool,
    pub project: Option<&'a str>,
}

/// Errors from reading or writing the persisted credential record.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("No configuration directory available on this platform")]
    NoConfigDir,
}

fn describe_billing(
    status_code: &u16,
    message: &str,
    paid_tier: bool,
    billing_project: &Option<String>,
) -> String {
    if paid_tier {
        let project = billing_project.as_deref().unwrap_or_default();
        format!(
            "Billing/Permission error ({status_code}): Check billing project '{project}' and API access. {message}"
        )
    } else {
        format!("Permission denied ({status_code}): {message}")
    }
}

const RATE_LIMIT_STATUS: u16 = 429;
const FORBIDDEN_STATUS: u16 = 403;
const API_KEY_INVALID_REASON: &str = "API_KEY_INVALID";
const API_KEY_INVALID_MARKER: &str = "API key not valid";
const INVALID_ARGUMENT_MARKER: &str = "INVALID_ARGUMENT";
const USER_PROJECT_DENIED_REASON: &str = "USER_PROJECT_DENIED";
const PROJECT_GONE_MARKER: &str = "not found or deleted";

impl TtsError {
    /// Converts a wire-layer error, classifying API errors by status code,
    /// Google status and detail reasons. Bodies that are not a Google error
    /// envelope fall back to message markers.
    ///
    /// Precedence: rate limit, then invalid credential, then billing/permission,
    /// then server error, then anything else.
    pub(crate) fn from_transport(error: InternalError, billing: BillingContext<'_>) -> Self {
        match error {
            InternalError::Api {
                status_code,
                message,
                status,
                reasons,
                request_id,
            } => Self::from_api(status_code, message, status, &reasons, request_id, billing),
            InternalError::Timeout(timeout) => Self::Timeout(timeout),
            InternalError::Http(e) => Self::Http(e),
            InternalError::Json(e) => Self::MalformedResponse(e.to_string()),
            InternalError::MalformedResponse(msg) => Self::MalformedResponse(msg),
            InternalError::ClientBuild(msg) => Self::ClientBuild(msg),
        }
    }

    fn from_api(
        status_code: u16,
        message: String,
        status: Option<ApiStatus>,
        reasons: &[String],
        request_id: Option<String>,
        billing: BillingContext<'_>,
    ) -> Self {
        let has_reason = |wanted: &str| reasons.iter().any(|r| r == wanted);

        if status_code == RATE_LIMIT_STATUS || status == Some(ApiStatus::ResourceExhausted) {
            return Self::RateLimited {
                message,
                request_id,
            };
        }

        if status == Some(ApiStatus::InvalidArgument)
            || has_reason(API_KEY_INVALID_REASON)
            || message.contains(API_KEY_INVALID_MARKER)
            || message.contains(INVALID_ARGUMENT_MARKER)
        {
            return Self::CredentialInvalid { message };
        }

        let project_gone = message.contains(PROJECT_GONE_MARKER);
        let project_denied = has_reason(USER_PROJECT_DENIED_REASON);
        if status_code == FORBIDDEN_STATUS
            || status == Some(ApiStatus::PermissionDenied)
            || project_denied
            || project_gone
            || message.to_lowercase().contains("billing")
        {
            let issue = if project_gone {
                BillingIssue::ProjectNotFound
            } else if project_denied {
                BillingIssue::ProjectDenied
            } else {
                BillingIssue::Configuration
            };
            return Self::BillingPermissionDenied {
                status_code,
                message,
                issue,
                paid_tier: billing.paid_tier,
                billing_project: billing.project.map(String::from),
            };
        }

        if status_code >= 500 {
            Self::Server {
                status_code,
                message,
            }
        } else {
            Self::Api {
                status_code,
                message,
            }
        }
    }

    /// Selects the handling branch for this error.
    #[must_use]
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::RateLimited { .. } => FailureKind::RateLimit,
            Self::CredentialInvalid { .. } => FailureKind::InvalidCredential,
            Self::BillingPermissionDenied { .. } => FailureKind::BillingPermission,
            _ => FailureKind::Generic,
        }
    }

    /// Returns `true` for failures a single synthesis call retries locally:
    /// server errors, timeouts and network failures.
    ///
    /// Rate limits are deliberately absent; they are handed to the
    /// tier-aware rate-limit branch instead.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Server { .. } | Self::Timeout(_) | Self::Http(_))
    }
}

impl From<InternalError> for TtsError {
    fn from(error: InternalError) -> Self {
        Self::from_transport(error, BillingContext::default())
    }
}
