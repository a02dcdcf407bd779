//! The HTTP seam between the speech pipeline and the network.
//!
//! [`Transport`] performs exactly one POST per call and hands back the raw
//! status and body. Status interpretation, retries and decoding live above it,
//! so tests can script replies without a server.

use crate::common::{ApiVersion, BASE_URL_PREFIX, construct_url, redact_key};
use crate::errors::InternalError;
use crate::loud_wire;
use crate::models::request::GenerateContentRequest;
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use reqwest::header::USER_AGENT;
use std::time::Duration;
use tracing::debug;

/// Google's request ID header name.
const REQUEST_ID_HEADER: &str = "x-goog-request-id";

const USER_AGENT_VALUE: &str = concat!("genai-client/", env!("CARGO_PKG_VERSION"));

/// Status and body of one HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
    /// Value of the `x-goog-request-id` header, if the server sent one.
    pub request_id: Option<String>,
}

impl HttpReply {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            request_id: None,
        }
    }
}

/// One `generateContent` POST.
///
/// Implementations must not retry: a single call maps to a single request.
/// Timeouts are reported as [`InternalError::Timeout`], other network failures
/// as [`InternalError::Http`]; any HTTP status, success or not, is an `Ok`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn generate_content(
        &self,
        model: &str,
        api_key: &str,
        request: &GenerateContentRequest,
        timeout: Duration,
    ) -> Result<HttpReply, InternalError>;
}

/// [`Transport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    #[allow(clippy::struct_field_names)]
    http_client: ReqwestClient,
    base_url: String,
    version: ApiVersion,
}

/// Builder for [`HttpTransport`].
///
/// # Example
///
/// ```
/// use genai_client::HttpTransport;
/// use std::time::Duration;
///
/// let transport = HttpTransport::builder()
///     .connect_timeout(Duration::from_secs(10))
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Default)]
pub struct HttpTransportBuilder {
    base_url: Option<String>,
    version: ApiVersion,
    connect_timeout: Option<Duration>,
}

impl HttpTransportBuilder {
    /// Overrides the API origin (defaults to the public Gemini endpoint).
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    #[must_use]
    pub const fn api_version(mut self, version: ApiVersion) -> Self {
        self.version = version;
        self
    }

    /// Sets the connection timeout. Per-request timeouts are passed per call.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Builds the transport.
    ///
    /// # Errors
    ///
    /// Returns [`InternalError::ClientBuild`] if the TLS backend cannot be initialized.
    pub fn build(self) -> Result<HttpTransport, InternalError> {
        let mut builder = ReqwestClient::builder().user_agent(USER_AGENT_VALUE);

        if let Some(connect_timeout) = self.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }

        let http_client = builder
            .build()
            .map_err(|e| InternalError::ClientBuild(e.to_string()))?;

        Ok(HttpTransport {
            http_client,
            base_url: self.base_url.unwrap_or_else(|| BASE_URL_PREFIX.to_string()),
            version: self.version,
        })
    }
}

impl HttpTransport {
    #[must_use]
    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::default()
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn classify_send_error(error: reqwest::Error, timeout: Duration) -> InternalError {
    if error.is_timeout() {
        InternalError::Timeout(timeout)
    } else {
        // The URL carries the key; keep it out of error text.
        InternalError::Http(error.without_url())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn generate_content(
        &self,
        model: &str,
        api_key: &str,
        request: &GenerateContentRequest,
        timeout: Duration,
    ) -> Result<HttpReply, InternalError> {
        let url = construct_url(&self.base_url, model, api_key, self.version);
        let logged_url = redact_key(&url);
        debug!("POST {logged_url} (timeout {timeout:?})");

        // LOUD_WIRE: Log outgoing request
        let wire_id = loud_wire::next_request_id();
        let request_body = match serde_json::to_string(request) {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::warn!("LOUD_WIRE: Failed to serialize request body: {}", e);
                None
            }
        };
        loud_wire::log_request(wire_id, "POST", &logged_url, request_body.as_deref());

        let response = self
            .http_client
            .post(&url)
            .header(USER_AGENT, USER_AGENT_VALUE)
            .timeout(timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| classify_send_error(e, timeout))?;

        let status = response.status().as_u16();
        loud_wire::log_response_status(wire_id, status);

        let request_id = response
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let body = response
            .text()
            .await
            .map_err(|e| classify_send_error(e, timeout))?;

        loud_wire::log_response_body(wire_id, &body);

        Ok(HttpReply {
            status,
            body,
            request_id,
        })
    }
}
