//! Single-model synthesis with local retry, and the guidance text call.

use crate::audio::AudioBuffer;
use crate::errors::{BillingContext, TtsError};
use crate::request::{RetryPolicy, TtsModel};
use crate::status::SimulationReason;
use genai_client::{GenerateContentRequest, GenerateContentResponse, Transport};
use std::time::Duration;
use tracing::{debug, warn};

const GUIDANCE_MAX_OUTPUT_TOKENS: u32 = 1024;

/// Parameters of one synthesis call against one model.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SpeechCall<'a> {
    pub model: TtsModel,
    pub api_key: &'a str,
    pub text: &'a str,
    pub voice_name: &'a str,
    pub temperature: f32,
    pub billing: BillingContext<'a>,
    pub timeout: Duration,
}

/// Calls the TTS model up to `policy.max_attempts()` times.
///
/// Server errors, timeouts and network failures are retried after
/// `policy.backoff(attempt)`. Every other failure, rate limits included, is
/// returned at once.
///
/// # Errors
///
/// Returns the classified error of the last attempt.
pub(crate) async fn synthesize_with_retry(
    transport: &dyn Transport,
    call: &SpeechCall<'_>,
    policy: RetryPolicy,
) -> Result<AudioBuffer, TtsError> {
    let request = GenerateContentRequest::speech(call.text, call.temperature, call.voice_name);
    let max_attempts = policy.max_attempts();

    for attempt in 0..max_attempts {
        let result = genai_client::generate_content(
            transport,
            call.model.as_str(),
            call.api_key,
            &request,
            call.timeout,
        )
        .await;

        let error = match result {
            Ok(response) => {
                debug!(
                    "{} answered on attempt {}/{max_attempts}",
                    call.model,
                    attempt + 1
                );
                return decode_speech_response(&response);
            }
            Err(e) => TtsError::from_transport(e, call.billing),
        };

        if error.is_retryable() && attempt + 1 < max_attempts {
            let delay = policy.backoff(attempt);
            warn!(
                "{} attempt {}/{max_attempts} failed: {error}; retrying in {delay:?}",
                call.model,
                attempt + 1
            );
            tokio::time::sleep(delay).await;
            continue;
        }

        return Err(error);
    }

    Err(TtsError::RetriesExhausted)
}

/// Pulls `candidates[0].content.parts[0].inlineData.data` and decodes it.
///
/// # Errors
///
/// Returns [`TtsError::MalformedResponse`] when the part chain or the inline
/// audio is missing, or the payload does not decode.
pub(crate) fn decode_speech_response(response: &GenerateContentResponse) -> Result<AudioBuffer, TtsError> {
    let part = response
        .first_part()
        .ok_or_else(|| TtsError::MalformedResponse("Invalid REST response structure".to_string()))?;

    let data = part
        .inline_data
        .as_ref()
        .and_then(|inline| inline.data.as_deref())
        .ok_or_else(|| TtsError::MalformedResponse("No audio data found in REST response".to_string()))?;

    AudioBuffer::from_pcm16_base64(data)
}

/// Prompt asking a text model how the voice should deliver `text`.
pub(crate) fn guidance_prompt(
    voice_name: &str,
    text: &str,
    temperature: f32,
    reason: SimulationReason,
) -> String {
    format!(
        "You are simulating the {voice_name} voice from Gemini TTS for text-to-speech generation.\n\n\
         {}, so provide detailed voice acting instructions for:\n\
         VOICE: {voice_name}\n\
         TEXT: \"{text}\"\n\
         STYLE: Temperature {temperature} (0.0=consistent, 2.0=creative)\n\n\
         Provide voice characteristics for {voice_name} including tone, pace, and delivery style.",
        reason.guidance_context()
    )
}

/// One plain text call to the guidance model. Not retried.
///
/// # Errors
///
/// Returns the classified transport error, or [`TtsError::MalformedResponse`]
/// if the reply carries no text.
pub(crate) async fn request_guidance(
    transport: &dyn Transport,
    model: &str,
    api_key: &str,
    prompt: &str,
    temperature: f32,
    timeout: Duration,
) -> Result<String, TtsError> {
    let request = GenerateContentRequest::text(prompt, temperature, GUIDANCE_MAX_OUTPUT_TOKENS);
    let response = genai_client::generate_content(transport, model, api_key, &request, timeout)
        .await
        .map_err(TtsError::from)?;

    response
        .first_text()
        .map(str::to_string)
        .ok_or_else(|| TtsError::MalformedResponse("Guidance response contained no text".to_string()))
}
