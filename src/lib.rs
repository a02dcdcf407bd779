//! Gemini text-to-speech with tier-aware retry and graceful fallback.
//!
//! [`Synthesizer::generate`] turns a [`SpeechRequest`] into an [`AudioBuffer`]
//! (mono, 24 kHz, `f32`) plus a status line. It never returns an error. When
//! the Pro model is rate limited on the free tier it retries once on Flash.
//! When both are exhausted, or the key lacks access to the preview models, it
//! returns a faint placeholder tone along with voice-acting guidance from a
//! text model. Every other failure yields one second of silence and an
//! explanation.
//!
//! # Example
//!
//! ```no_run
//! use genai_tts::{SpeechRequest, Synthesizer, TtsModel};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let synthesizer = Synthesizer::new()?;
//! let request = SpeechRequest::new("Say cheerfully: Have a wonderful day!")
//!     .with_model(TtsModel::Pro)
//!     .with_voice("[F] Kore");
//!
//! let outcome = synthesizer.generate(&request).await;
//! println!("{}", outcome.status());
//! outcome.audio().write_wav("speech.wav")?;
//! # Ok(())
//! # }
//! ```
//!
//! # Credentials
//!
//! The API key comes from the request, then `GEMINI_API_KEY`, then the
//! injected [`CredentialStore`]. A key passed with a request is written back
//! to the store.
//!
//! # Wire logging
//!
//! Set `LOUD_WIRE=1` to print every request and response to stderr, with audio
//! payloads truncated and the key masked.

mod client;
mod errors;
mod outcome;
mod speech;
mod status;

pub mod audio;
pub mod credentials;
pub mod pricing;
pub mod request;
pub mod voices;

pub use audio::AudioBuffer;
pub use client::{Synthesizer, SynthesizerBuilder};
pub use credentials::{CredentialRecord, CredentialStore, JsonFileStore, MemoryStore};
pub use errors::{BillingIssue, FailureKind, StoreError, TtsError};
pub use outcome::{AudioSource, SpeechOutcome};
pub use request::{RetryPolicy, SpeechRequest, TtsModel};
pub use status::SimulationReason;

// Re-exported for implementing a custom `Transport`.
pub use genai_client::{
    GenerateContentRequest, HttpReply, HttpTransport, InternalError, Transport,
};
