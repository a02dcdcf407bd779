//! Property-based tests for PCM decoding, voice resolution, key validation and
//! simulated durations.

use base64::Engine;
use genai_tts::audio::{AudioBuffer, decode_pcm16, simulated_duration_secs};
use genai_tts::credentials::{mask_key, validate_billing_project, validate_key_format};
use genai_tts::voices::{VOICES, resolve_voice};
use proptest::prelude::*;

// =============================================================================
// Strategy Generators
// =============================================================================

/// Labels that cannot collide with the voice table.
fn arb_unknown_label() -> impl Strategy<Value = String> {
    "[a-z]{1,12}( [a-z]{1,12})?"
}

fn arb_words() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{1,10}", 0..60)
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn decode_matches_le_i16_over_32768(samples in prop::collection::vec(any::<i16>(), 0..512)) {
        let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        let decoded = decode_pcm16(&bytes).unwrap();

        prop_assert_eq!(decoded.len(), samples.len());
        for (value, sample) in decoded.iter().zip(&samples) {
            prop_assert_eq!(*value, f32::from(*sample) / 32768.0);
            prop_assert!((-1.0..1.0).contains(value));
        }
    }

    #[test]
    fn base64_payload_decodes_to_same_samples(samples in prop::collection::vec(any::<i16>(), 0..256)) {
        let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
        let buffer = AudioBuffer::from_pcm16_base64(&encoded).unwrap();

        let expected = decode_pcm16(&bytes).unwrap();
        prop_assert_eq!(buffer.samples(), expected.as_slice());
        prop_assert_eq!(buffer.sample_rate(), 24_000);
    }

    #[test]
    fn odd_byte_counts_are_rejected(bytes in prop::collection::vec(any::<u8>(), 0..255)) {
        let odd = if bytes.len() % 2 == 0 { [bytes.as_slice(), &[0u8][..]].concat() } else { bytes };
        prop_assert!(decode_pcm16(&odd).is_err());
    }

    #[test]
    fn known_labels_resolve_to_api_names(index in 0..VOICES.len()) {
        let voice = &VOICES[index];
        prop_assert_eq!(resolve_voice(voice.label), voice.name);
    }

    #[test]
    fn unknown_labels_pass_through(label in arb_unknown_label()) {
        prop_assert_eq!(resolve_voice(&label), label.as_str());
    }

    #[test]
    fn simulated_duration_counts_words(words in arb_words()) {
        let text = format!("Say: {}", words.join(" "));
        let expected = (words.len() as f64 * 0.4).max(2.0);
        prop_assert!((simulated_duration_secs(&text) - expected).abs() < 1e-9);
    }

    #[test]
    fn placeholder_tone_length_and_amplitude(words in arb_words()) {
        let duration = simulated_duration_secs(&words.join(" "));
        let tone = AudioBuffer::placeholder_tone(duration);

        prop_assert_eq!(tone.len(), (duration * 24_000.0).round() as usize);
        prop_assert!(tone.samples().iter().all(|s| s.abs() <= 0.001));
    }

    #[test]
    fn short_or_unprefixed_keys_are_rejected(key in "[A-Za-z0-9_-]{0,60}") {
        let expected_ok = key.starts_with("AIza") && key.len() >= 35;
        prop_assert_eq!(validate_key_format(&key).is_ok(), expected_ok);
    }

    #[test]
    fn masked_keys_hide_the_middle(middle in "[a-z]{30}") {
        let key = format!("AIzaSyXXXXXXXXX{middle}ZZZZZ");
        let masked = mask_key(&key);
        prop_assert!(masked.starts_with("AIzaSyXXXXXXXXX..."));
        prop_assert!(masked.ends_with("ZZZZZ"));
        prop_assert!(!masked.contains(&middle));
    }

    #[test]
    fn project_ids_with_spaces_are_rejected(left in "[a-z]{1,10}", right in "[a-z]{1,10}") {
        let with_space = format!("{left} {right}");
        prop_assert!(validate_billing_project(&with_space).is_err());
        let with_hyphen = format!("{left}-{right}");
        prop_assert!(validate_billing_project(&with_hyphen).is_ok());
    }
}
