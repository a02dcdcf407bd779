use crate::audio::AudioBuffer;
use crate::request::TtsModel;

/// Where the audio in a [`SpeechOutcome`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioSource {
    /// Real speech from a TTS model.
    Synthesized { model: TtsModel },
    /// The faint placeholder tone; guidance text is in the status.
    Simulated,
    /// One second of silence after a failure.
    Placeholder,
}

/// The result of [`Synthesizer::generate`](crate::Synthesizer::generate):
/// always a buffer and a non-empty status line.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechOutcome {
    audio: AudioBuffer,
    status: String,
    source: AudioSource,
}

impl SpeechOutcome {
    pub(crate) fn synthesized(audio: AudioBuffer, status: String, model: TtsModel) -> Self {
        Self {
            audio,
            status,
            source: AudioSource::Synthesized { model },
        }
    }

    pub(crate) fn simulated(audio: AudioBuffer, status: String) -> Self {
        Self {
            audio,
            status,
            source: AudioSource::Simulated,
        }
    }

    /// Silence paired with a failure message.
    pub(crate) fn placeholder(status: String) -> Self {
        Self {
            audio: AudioBuffer::silence(),
            status,
            source: AudioSource::Placeholder,
        }
    }

    #[must_use]
    pub fn audio(&self) -> &AudioBuffer {
        &self.audio
    }

    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    #[must_use]
    pub const fn source(&self) -> AudioSource {
        self.source
    }

    /// Returns `true` when the buffer holds real speech.
    #[must_use]
    pub const fn is_synthesized(&self) -> bool {
        matches!(self.source, AudioSource::Synthesized { .. })
    }

    #[must_use]
    pub fn into_parts(self) -> (AudioBuffer, String) {
        (self.audio, self.status)
    }
}
