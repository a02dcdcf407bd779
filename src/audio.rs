//! Mono floating-point audio buffers and PCM decoding.
//!
//! Gemini TTS returns raw little-endian 16-bit PCM at 24 kHz, base64-encoded
//! in `inlineData.data`. [`AudioBuffer`] is what every synthesis path hands
//! back: decoded speech, one second of silence, or the faint placeholder tone
//! used by the simulation fallback.

use crate::errors::TtsError;
use base64::Engine;
use std::f64::consts::PI;
use std::path::Path;

/// Fixed output sample rate in Hz.
pub const SAMPLE_RATE: u32 = 24_000;

/// Output is always mono.
pub const CHANNELS: u16 = 1;

/// Peak amplitude of the simulation tone.
const TONE_AMPLITUDE: f64 = 0.001;
const TONE_FREQUENCY_HZ: f64 = 440.0;

/// Minimum simulated duration, and seconds per word.
const MIN_SIMULATED_SECS: f64 = 2.0;
const SECS_PER_WORD: f64 = 0.4;

/// A mono `f32` waveform at [`SAMPLE_RATE`].
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u16,
}

impl AudioBuffer {
    /// Wraps samples as a mono buffer at 24 kHz.
    #[must_use]
    pub fn mono(samples: Vec<f32>) -> Self {
        Self {
            samples,
            sample_rate: SAMPLE_RATE,
            channels: CHANNELS,
        }
    }

    /// One second of silence: the buffer returned by every hard failure.
    #[must_use]
    pub fn silence() -> Self {
        Self::mono(vec![0.0; SAMPLE_RATE as usize])
    }

    /// A 440 Hz sine at 0.001 peak, lasting `duration_secs`.
    ///
    /// Sample count is `round(duration_secs * 24000)`, with sample times spaced
    /// evenly over `[0, duration_secs]` inclusive of both ends.
    #[must_use]
    pub fn placeholder_tone(duration_secs: f64) -> Self {
        let count = (duration_secs * f64::from(SAMPLE_RATE)).round().max(0.0) as usize;
        let step = if count > 1 {
            duration_secs / (count - 1) as f64
        } else {
            0.0
        };

        let samples = (0..count)
            .map(|i| {
                let t = i as f64 * step;
                (TONE_AMPLITUDE * (2.0 * PI * TONE_FREQUENCY_HZ * t).sin()) as f32
            })
            .collect();

        Self::mono(samples)
    }

    /// Decodes a base64 payload of little-endian `i16` PCM.
    ///
    /// # Errors
    ///
    /// Returns [`TtsError::MalformedResponse`] for invalid base64 or an odd byte count.
    pub fn from_pcm16_base64(data: &str) -> Result<Self, TtsError> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(data)
            .map_err(|e| TtsError::MalformedResponse(format!("Invalid base64 audio data: {e}")))?;
        Ok(Self::mono(decode_pcm16(&bytes)?))
    }

    #[must_use]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    #[must_use]
    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[must_use]
    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    #[must_use]
    pub const fn channels(&self) -> u16 {
        self.channels
    }

    /// Length in seconds.
    #[must_use]
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }

    /// Returns `true` when every sample is exactly zero.
    #[must_use]
    pub fn is_silent(&self) -> bool {
        self.samples.iter().all(|s| *s == 0.0)
    }

    /// Writes the buffer as a 32-bit float WAV file.
    ///
    /// # Errors
    ///
    /// Returns any I/O or encoding error from `hound`.
    pub fn write_wav(&self, path: impl AsRef<Path>) -> Result<(), hound::Error> {
        let spec = hound::WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(path, spec)?;
        for sample in &self.samples {
            writer.write_sample(*sample)?;
        }
        writer.finalize()
    }
}

/// Converts little-endian `i16` PCM bytes to floats in `[-1, 1)`.
///
/// # Errors
///
/// Returns [`TtsError::MalformedResponse`] if `bytes` has odd length.
pub fn decode_pcm16(bytes: &[u8]) -> Result<Vec<f32>, TtsError> {
    if bytes.len() % 2 != 0 {
        return Err(TtsError::MalformedResponse(format!(
            "PCM payload has odd length {}",
            bytes.len()
        )));
    }

    Ok(bytes
        .chunks_exact(2)
        .map(|pair| f32::from(i16::from_le_bytes([pair[0], pair[1]])) / 32768.0)
        .collect())
}

/// Seconds of placeholder audio for a prompt: `max(2.0, 0.4 * words)`.
///
/// A leading "Say:"/"Say " instruction does not count toward the words.
#[must_use]
pub fn simulated_duration_secs(text: &str) -> f64 {
    let spoken = text.replace("Say:", "").replace("Say ", "");
    let words = spoken.split_whitespace().count();
    (words as f64 * SECS_PER_WORD).max(MIN_SIMULATED_SECS)
}
