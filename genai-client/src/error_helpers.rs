//! Error handling utilities for HTTP replies and error context formatting.

use crate::errors::InternalError;
use crate::models::response::ErrorEnvelope;
use crate::transport::HttpReply;
use serde::de::DeserializeOwned;

/// Maximum characters to include from error body in context messages
const ERROR_BODY_PREVIEW_LENGTH: usize = 200;

/// Turns a non-200 reply into a structured `InternalError::Api`.
///
/// Google error bodies look like
/// `{"error": {"code": 429, "message": "...", "status": "RESOURCE_EXHAUSTED", "details": [...]}}`.
/// When the body has that shape, the message, status and detail reasons are
/// lifted out of it; otherwise the message is a truncated copy of the raw body.
#[must_use]
pub fn api_error_from_reply(reply: HttpReply) -> InternalError {
    let HttpReply {
        status,
        body,
        request_id,
    } = reply;

    match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(envelope) => {
            let reasons = envelope
                .error
                .details
                .into_iter()
                .filter_map(|detail| detail.reason)
                .collect();
            let message = envelope
                .error
                .message
                .unwrap_or_else(|| truncate_for_context(&body, ERROR_BODY_PREVIEW_LENGTH));

            InternalError::Api {
                status_code: status,
                message,
                status: envelope.error.status,
                reasons,
                request_id,
            }
        }
        Err(_) => InternalError::Api {
            status_code: status,
            message: truncate_for_context(&body, ERROR_BODY_PREVIEW_LENGTH),
            status: None,
            reasons: Vec::new(),
            request_id,
        },
    }
}

/// Deserializes a 200 body, reporting schema mismatches as malformed responses.
///
/// # Errors
///
/// Returns `InternalError::MalformedResponse` with a preview of the body.
pub fn deserialize_with_context<T: DeserializeOwned>(
    body: &str,
    type_name: &str,
) -> Result<T, InternalError> {
    serde_json::from_str(body).map_err(|e| {
        InternalError::MalformedResponse(format!(
            "{type_name}: {}",
            format_json_parse_error(body, e)
        ))
    })
}

/// Formats JSON parsing context by including a preview of the raw JSON.
pub fn format_json_parse_error(json_str: &str, error: serde_json::Error) -> String {
    let preview = truncate_for_context(json_str, ERROR_BODY_PREVIEW_LENGTH);
    format!("JSON parse error: {} | Context: {}", error, preview)
}

/// Truncates a string to `max_len` bytes, adding "..." if truncated.
///
/// Uses character-boundary-aware slicing to prevent panics on multi-byte UTF-8 characters.
#[must_use]
pub fn truncate_for_context(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let truncate_at = s
            .char_indices()
            .take_while(|(i, c)| i + c.len_utf8() <= max_len)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        format!("{}...", &s[..truncate_at])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ApiStatus;

    fn reply(status: u16, body: &str) -> HttpReply {
        HttpReply {
            status,
            body: body.to_string(),
            request_id: Some("req-1".to_string()),
        }
    }

    #[test]
    fn test_api_error_from_google_body() {
        let body = r#"{"error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}}"#;
        match api_error_from_reply(reply(429, body)) {
            InternalError::Api {
                status_code,
                message,
                status,
                reasons,
                request_id,
            } => {
                assert_eq!(status_code, 429);
                assert_eq!(message, "Quota exceeded");
                assert_eq!(status, Some(ApiStatus::ResourceExhausted));
                assert!(reasons.is_empty());
                assert_eq!(request_id.as_deref(), Some("req-1"));
            }
            other => panic!("Expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_api_error_collects_reasons() {
        let body = r#"{"error": {"code": 403, "message": "denied", "status": "PERMISSION_DENIED",
            "details": [{"reason": "USER_PROJECT_DENIED"}, {"metadata": {}}]}}"#;
        match api_error_from_reply(reply(403, body)) {
            InternalError::Api { reasons, .. } => {
                assert_eq!(reasons, vec!["USER_PROJECT_DENIED".to_string()]);
            }
            other => panic!("Expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_api_error_from_plain_text_body() {
        let body = "x".repeat(500);
        match api_error_from_reply(reply(502, &body)) {
            InternalError::Api {
                status_code,
                message,
                status,
                ..
            } => {
                assert_eq!(status_code, 502);
                assert_eq!(message.len(), 203);
                assert!(status.is_none());
            }
            other => panic!("Expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_deserialize_with_context_reports_malformed() {
        let result: Result<serde_json::Value, _> = deserialize_with_context("{oops", "Thing");
        match result {
            Err(InternalError::MalformedResponse(msg)) => {
                assert!(msg.starts_with("Thing: JSON parse error"));
                assert!(msg.contains("{oops"));
            }
            other => panic!("Expected MalformedResponse, got {other:?}"),
        }
    }

    #[test]
    fn test_truncate_for_context_short_string() {
        assert_eq!(truncate_for_context("Short", 100), "Short");
    }

    #[test]
    fn test_truncate_for_context_utf8_boundary() {
        let emoji_str = "x".repeat(198) + "🎉";
        let result = truncate_for_context(&emoji_str, 200);
        assert_eq!(result.len(), 201);
        assert!(!result.contains("🎉"));
    }
}
