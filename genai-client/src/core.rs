use crate::error_helpers::{api_error_from_reply, deserialize_with_context};
use crate::errors::InternalError;
use crate::models::request::GenerateContentRequest;
use crate::models::response::GenerateContentResponse;
use crate::transport::Transport;
use std::time::Duration;
use tracing::debug;

/// Sends one `generateContent` request and parses the reply.
///
/// Only HTTP 200 counts as success; every other status becomes
/// [`InternalError::Api`] with the structured fields of Google's error body.
///
/// # Errors
/// Returns an error if the transport fails, the status is not 200, or the body
/// does not parse as a `GenerateContentResponse`.
pub async fn generate_content(
    transport: &dyn Transport,
    model: &str,
    api_key: &str,
    request: &GenerateContentRequest,
    timeout: Duration,
) -> Result<GenerateContentResponse, InternalError> {
    let reply = transport
        .generate_content(model, api_key, request, timeout)
        .await?;

    debug!("{model} replied with HTTP {}", reply.status);

    if reply.status != 200 {
        return Err(api_error_from_reply(reply));
    }

    deserialize_with_context(&reply.body, "GenerateContentResponse")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ApiStatus;
    use crate::transport::HttpReply;
    use async_trait::async_trait;

    struct FixedReply(HttpReply);

    #[async_trait]
    impl Transport for FixedReply {
        async fn generate_content(
            &self,
            _model: &str,
            _api_key: &str,
            _request: &GenerateContentRequest,
            _timeout: Duration,
        ) -> Result<HttpReply, InternalError> {
            Ok(self.0.clone())
        }
    }

    fn request() -> GenerateContentRequest {
        GenerateContentRequest::speech("hi", 1.0, "Puck")
    }

    #[tokio::test]
    async fn test_generate_content_success() {
        let transport = FixedReply(HttpReply::new(
            200,
            r#"{"candidates": [{"content": {"parts": [{"text": "Hello, world!"}], "role": "model"}}]}"#,
        ));

        let response = generate_content(&transport, "m", "k", &request(), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(response.first_text(), Some("Hello, world!"));
    }

    #[tokio::test]
    async fn test_generate_content_non_200_is_api_error() {
        let transport = FixedReply(HttpReply::new(
            400,
            r#"{"error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}}"#,
        ));

        let err = generate_content(&transport, "m", "k", &request(), Duration::from_secs(1))
            .await
            .unwrap_err();
        match err {
            InternalError::Api {
                status_code,
                status,
                message,
                ..
            } => {
                assert_eq!(status_code, 400);
                assert_eq!(status, Some(ApiStatus::InvalidArgument));
                assert_eq!(message, "API key not valid.");
            }
            other => panic!("Expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_content_other_2xx_is_not_success() {
        let transport = FixedReply(HttpReply::new(204, ""));
        let err = generate_content(&transport, "m", "k", &request(), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(204));
    }

    #[tokio::test]
    async fn test_generate_content_malformed_body() {
        let transport = FixedReply(HttpReply::new(200, "<html>not json</html>"));
        let err = generate_content(&transport, "m", "k", &request(), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, InternalError::MalformedResponse(_)));
    }
}
