// End-to-end tests through the reqwest transport against a local mock server.
mod common;

use common::*;
use genai_tts::{AudioSource, SpeechRequest, Synthesizer, TtsModel};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn model_path(model: &str) -> String {
    format!("/v1beta/models/{model}:generateContent")
}

async fn http_synthesizer(server: &MockServer) -> Synthesizer {
    Synthesizer::builder()
        .base_url(server.uri())
        .store(keyed_store())
        .environment_key(None)
        .base_backoff(Duration::ZERO)
        .build()
        .unwrap()
}

fn respond(reply: genai_tts::HttpReply) -> ResponseTemplate {
    ResponseTemplate::new(reply.status).set_body_raw(reply.body, "application/json")
}

#[tokio::test]
async fn test_http_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(model_path(PRO)))
        .and(query_param("key", valid_key()))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(json!({
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {"voiceConfig": {"prebuiltVoiceConfig": {"voiceName": "Zephyr"}}}
            }
        })))
        .respond_with(respond(audio_reply(2_000)))
        .expect(1)
        .mount(&server)
        .await;

    let synth = http_synthesizer(&server).await;
    let outcome = synth
        .generate(&SpeechRequest::new("Say: Bright morning").with_voice("[F] Zephyr"))
        .await;

    assert_eq!(outcome.audio().len(), 2_000);
    assert!(outcome.status().contains("REST TTS Success"));
}

#[tokio::test]
async fn test_http_rate_limit_falls_back_to_flash() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(model_path(PRO)))
        .respond_with(respond(rate_limited()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(model_path(FLASH)))
        .respond_with(respond(audio_reply(1_200)))
        .expect(1)
        .mount(&server)
        .await;

    let synth = http_synthesizer(&server).await;
    let outcome = synth.generate(&SpeechRequest::new("hello")).await;

    assert_eq!(
        outcome.source(),
        AudioSource::Synthesized {
            model: TtsModel::Flash
        }
    );
    assert!(outcome.status().contains("Fallback Success"));
}

#[tokio::test]
async fn test_http_non_json_error_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(model_path(PRO)))
        .respond_with(ResponseTemplate::new(418).set_body_string("I'm a teapot"))
        .mount(&server)
        .await;

    let synth = http_synthesizer(&server).await;
    let outcome = synth.generate(&SpeechRequest::new("hello")).await;

    assert!(outcome.status().contains("REST API error 418: I'm a teapot"));
    assert!(outcome.audio().is_silent());
}

#[tokio::test]
async fn test_http_server_errors_retried_on_paid_tier() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(model_path(PRO)))
        .respond_with(respond(server_error(503)))
        .expect(5)
        .mount(&server)
        .await;

    let synth = http_synthesizer(&server).await;
    let outcome = synth
        .generate(&SpeechRequest::new("hello").with_paid_tier(true))
        .await;

    assert!(outcome.status().contains("REST API error 503"));
}

#[tokio::test]
async fn test_http_key_never_in_status() {
    // Nothing listens here; the connection error must not echo the URL.
    let synth = Synthesizer::builder()
        .base_url("http://127.0.0.1:9")
        .store(keyed_store())
        .environment_key(None)
        .base_backoff(Duration::ZERO)
        .build()
        .unwrap();

    let outcome = synth.generate(&SpeechRequest::new("hello")).await;

    assert!(outcome.status().starts_with("❌ TTS failed"));
    assert!(!outcome.status().contains(&valid_key()));
}
