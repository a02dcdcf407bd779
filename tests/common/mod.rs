//! Common test utilities shared across integration test files.
//!
//! Usage in test files:
//! ```ignore
//! mod common;
//! use common::*;
//! ```

#![allow(dead_code)]

use async_trait::async_trait;
use base64::Engine;
use genai_tts::{
    GenerateContentRequest, HttpReply, InternalError, MemoryStore, Synthesizer, Transport,
};
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const PRO: &str = "gemini-2.5-pro-preview-tts";
pub const FLASH: &str = "gemini-2.5-flash-preview-tts";
pub const GUIDANCE: &str = "gemini-2.0-flash-exp";

/// A syntactically valid key: `AIza` plus 35 characters.
pub fn valid_key() -> String {
    format!("AIzaSyD{}", "0123456789abcdefghijklmnopqrstuvw".chars().take(32).collect::<String>())
}

/// One request seen by [`ScriptedTransport`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub model: String,
    pub api_key: String,
    pub body: Value,
    pub timeout: Duration,
}

/// In-memory transport that replays queued replies per model and records calls.
///
/// Calling a model with nothing queued panics, so tests also assert which
/// models are *not* contacted.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<HashMap<String, VecDeque<Result<HttpReply, InternalError>>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push(&self, model: &str, reply: HttpReply) -> &Self {
        self.push_result(model, Ok(reply))
    }

    pub fn push_result(&self, model: &str, reply: Result<HttpReply, InternalError>) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .entry(model.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, model: &str) -> usize {
        self.calls().iter().filter(|c| c.model == model).count()
    }

    pub fn models_called(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.model).collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn generate_content(
        &self,
        model: &str,
        api_key: &str,
        request: &GenerateContentRequest,
        timeout: Duration,
    ) -> Result<HttpReply, InternalError> {
        self.calls.lock().unwrap().push(RecordedCall {
            model: model.to_string(),
            api_key: api_key.to_string(),
            body: serde_json::to_value(request).unwrap(),
            timeout,
        });

        self.replies
            .lock()
            .unwrap()
            .get_mut(model)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| panic!("unexpected call to {model}"))
    }
}

/// Synthesizer wired to `transport` and `store`, with no environment key and
/// zero backoff.
pub fn synthesizer(transport: Arc<ScriptedTransport>, store: Arc<MemoryStore>) -> Synthesizer {
    Synthesizer::builder()
        .transport(transport)
        .store(store)
        .environment_key(None)
        .base_backoff(Duration::ZERO)
        .build()
        .unwrap()
}

/// Store holding [`valid_key`].
pub fn keyed_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::with_key(valid_key()))
}

/// `n` PCM samples forming a ramp, little-endian, base64-encoded.
pub fn pcm_base64(n: usize) -> String {
    let bytes: Vec<u8> = (0..n)
        .flat_map(|i| ((i % 2000) as i16 - 1000).to_le_bytes())
        .collect();
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

pub fn audio_reply(samples: usize) -> HttpReply {
    let body = json!({
        "candidates": [{
            "content": {
                "parts": [{"inlineData": {"mimeType": "audio/L16;codec=pcm;rate=24000", "data": pcm_base64(samples)}}],
                "role": "model"
            },
            "finishReason": "STOP"
        }]
    });
    HttpReply::new(200, body.to_string())
}

pub fn text_reply(text: &str) -> HttpReply {
    let body = json!({"candidates": [{"content": {"parts": [{"text": text}], "role": "model"}}]});
    HttpReply::new(200, body.to_string())
}

pub fn error_reply(code: u16, status: &str, message: &str, reasons: &[&str]) -> HttpReply {
    let details: Vec<Value> = reasons
        .iter()
        .map(|reason| json!({"@type": "type.googleapis.com/google.rpc.ErrorInfo", "reason": reason}))
        .collect();
    let body = json!({"error": {"code": code, "message": message, "status": status, "details": details}});
    HttpReply::new(code, body.to_string())
}

pub fn rate_limited() -> HttpReply {
    error_reply(
        429,
        "RESOURCE_EXHAUSTED",
        "You exceeded your current quota, please check your plan and billing details.",
        &[],
    )
}

pub fn key_not_valid() -> HttpReply {
    error_reply(
        400,
        "INVALID_ARGUMENT",
        "API key not valid. Please pass a valid API key.",
        &["API_KEY_INVALID"],
    )
}

pub fn server_error(code: u16) -> HttpReply {
    error_reply(code, "UNAVAILABLE", "The model is overloaded. Please try again later.", &[])
}
