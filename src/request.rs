//! The speech request descriptor and its retry policy.

use crate::errors::TtsError;
use crate::voices::DEFAULT_VOICE;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const PRO_MODEL_ID: &str = "gemini-2.5-pro-preview-tts";
pub const FLASH_MODEL_ID: &str = "gemini-2.5-flash-preview-tts";

/// Text model asked for voice-acting guidance when no audio can be produced.
pub const GUIDANCE_MODEL_ID: &str = "gemini-2.0-flash-exp";

pub const DEFAULT_PROMPT: &str = "Say: Hello, this is a test of Gemini text-to-speech.";

const MIN_TEMPERATURE: f32 = 0.0;
const MAX_TEMPERATURE: f32 = 2.0;

const DEFAULT_RETRY_DELAY_SECS: u32 = 30;
const MIN_RETRY_DELAY_SECS: u32 = 10;
const MAX_RETRY_DELAY_SECS: u32 = 120;

const PAID_TIER_TIMEOUT: Duration = Duration::from_secs(60);
const FREE_TIER_TIMEOUT: Duration = Duration::from_secs(30);

/// The two Gemini TTS models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TtsModel {
    #[default]
    Pro,
    Flash,
}

impl TtsModel {
    /// API model identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pro => PRO_MODEL_ID,
            Self::Flash => FLASH_MODEL_ID,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pro => "Pro",
            Self::Flash => "Flash",
        }
    }
}

impl fmt::Display for TtsModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TtsModel {
    type Err = TtsError;

    /// Accepts the full model id or the short names `pro` / `flash`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            PRO_MODEL_ID | "pro" => Ok(Self::Pro),
            FLASH_MODEL_ID | "flash" => Ok(Self::Flash),
            other => Err(TtsError::InvalidInput(format!("Unknown TTS model: {other}"))),
        }
    }
}

/// How many times one model is tried, and how long to wait between tries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_backoff: Duration,
}

impl RetryPolicy {
    pub const PAID_TIER_ATTEMPTS: u32 = 5;
    pub const FREE_TIER_ATTEMPTS: u32 = 1;
    pub const DEFAULT_BASE_BACKOFF: Duration = Duration::from_secs(1);

    /// At least one attempt is always made.
    #[must_use]
    pub fn new(max_attempts: u32, base_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_backoff,
        }
    }

    /// Five attempts on the paid tier or with aggressive retry, otherwise one.
    #[must_use]
    pub fn for_tier(paid_tier: bool, aggressive_retry: bool) -> Self {
        let attempts = if paid_tier || aggressive_retry {
            Self::PAID_TIER_ATTEMPTS
        } else {
            Self::FREE_TIER_ATTEMPTS
        };
        Self::new(attempts, Self::DEFAULT_BASE_BACKOFF)
    }

    #[must_use]
    pub const fn with_base_backoff(mut self, base_backoff: Duration) -> Self {
        self.base_backoff = base_backoff;
        self
    }

    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay after the zero-based `attempt` failed: `base * 2^attempt`.
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_backoff
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::for_tier(false, false)
    }
}

/// Everything one call to [`Synthesizer::generate`](crate::Synthesizer::generate) needs.
///
/// # Example
///
/// ```
/// use genai_tts::{SpeechRequest, TtsModel};
///
/// let request = SpeechRequest::new("Say cheerfully: Have a wonderful day!")
///     .with_model(TtsModel::Flash)
///     .with_voice("[F] Kore")
///     .with_temperature(0.7);
///
/// assert_eq!(request.voice_name(), "Kore");
/// assert_eq!(request.retry_policy().max_attempts(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRequest {
    text: String,
    model: TtsModel,
    voice: String,
    temperature: f32,
    api_key: Option<String>,
    paid_tier: bool,
    billing_project_id: Option<String>,
    aggressive_retry: bool,
    flash_fallback: bool,
    retry_delay_secs: u32,
    show_voice_info: bool,
}

impl Default for SpeechRequest {
    fn default() -> Self {
        Self::new(DEFAULT_PROMPT)
    }
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

impl SpeechRequest {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model: TtsModel::default(),
            voice: DEFAULT_VOICE.to_string(),
            temperature: 1.0,
            api_key: None,
            paid_tier: false,
            billing_project_id: None,
            aggressive_retry: false,
            flash_fallback: true,
            retry_delay_secs: DEFAULT_RETRY_DELAY_SECS,
            show_voice_info: false,
        }
    }

    #[must_use]
    pub const fn with_model(mut self, model: TtsModel) -> Self {
        self.model = model;
        self
    }

    /// Sets the voice by display label (`"[M] Puck"`) or API name.
    #[must_use]
    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = voice.into();
        self
    }

    /// Sets the sampling temperature, clamped to `[0, 2]`.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        let clamped = if temperature.is_nan() {
            1.0
        } else {
            temperature.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE)
        };
        if clamped != temperature {
            tracing::warn!("Temperature {temperature} outside [0, 2], using {clamped}");
        }
        self.temperature = clamped;
        self
    }

    /// Supplies an API key that wins over the environment and the stored record.
    ///
    /// A non-blank key is persisted when the request runs.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    #[must_use]
    pub const fn with_paid_tier(mut self, paid_tier: bool) -> Self {
        self.paid_tier = paid_tier;
        self
    }

    #[must_use]
    pub fn with_billing_project(mut self, project_id: impl Into<String>) -> Self {
        self.billing_project_id = Some(project_id.into());
        self
    }

    /// Uses the paid-tier retry budget on the free tier as well.
    #[must_use]
    pub const fn with_aggressive_retry(mut self, aggressive: bool) -> Self {
        self.aggressive_retry = aggressive;
        self
    }

    /// Whether a rate-limited Pro request may fall back to Flash (default `true`).
    #[must_use]
    pub const fn with_flash_fallback(mut self, enabled: bool) -> Self {
        self.flash_fallback = enabled;
        self
    }

    /// Retry hint shown in rate-limit messages, clamped to 10..=120 seconds.
    #[must_use]
    pub fn with_retry_delay_secs(mut self, secs: u32) -> Self {
        self.retry_delay_secs = secs.clamp(MIN_RETRY_DELAY_SECS, MAX_RETRY_DELAY_SECS);
        self
    }

    #[must_use]
    pub const fn with_voice_info(mut self, show: bool) -> Self {
        self.show_voice_info = show;
        self
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub const fn model(&self) -> TtsModel {
        self.model
    }

    /// The voice as supplied by the caller.
    #[must_use]
    pub fn voice(&self) -> &str {
        &self.voice
    }

    /// The API voice name for [`voice`](Self::voice).
    #[must_use]
    pub fn voice_name(&self) -> &str {
        crate::voices::resolve_voice(&self.voice)
    }

    #[must_use]
    pub const fn temperature(&self) -> f32 {
        self.temperature
    }

    /// The explicit key, trimmed, if one was given and is not blank.
    #[must_use]
    pub fn api_key_override(&self) -> Option<&str> {
        non_blank(self.api_key.as_ref())
    }

    #[must_use]
    pub const fn paid_tier(&self) -> bool {
        self.paid_tier
    }

    /// The billing project, trimmed, if one was given and is not blank.
    #[must_use]
    pub fn billing_project(&self) -> Option<&str> {
        non_blank(self.billing_project_id.as_ref())
    }

    #[must_use]
    pub const fn aggressive_retry(&self) -> bool {
        self.aggressive_retry
    }

    #[must_use]
    pub const fn flash_fallback(&self) -> bool {
        self.flash_fallback
    }

    #[must_use]
    pub const fn retry_delay_secs(&self) -> u32 {
        self.retry_delay_secs
    }

    #[must_use]
    pub const fn show_voice_info(&self) -> bool {
        self.show_voice_info
    }

    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::for_tier(self.paid_tier, self.aggressive_retry)
    }

    /// Per-attempt HTTP timeout: 60 s on the paid tier, 30 s otherwise.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        if self.paid_tier {
            PAID_TIER_TIMEOUT
        } else {
            FREE_TIER_TIMEOUT
        }
    }
}
