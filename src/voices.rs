//! The prebuilt Gemini TTS voices.
//!
//! Callers pick voices by display label (`"[F] Kore"`, `"[M] Puck"`); the API
//! wants the bare voice name. Labels not in the table are sent as-is so new
//! voices work before this table learns about them.

/// Voice gender as advertised by Google.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Female => "Female",
            Self::Male => "Male",
        }
    }
}

/// One row of the voice table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Voice {
    pub label: &'static str,
    pub name: &'static str,
    pub gender: Gender,
    pub style: &'static str,
}

impl Voice {
    /// Human description, e.g. `"Male • Upbeat and energetic"`.
    #[must_use]
    pub fn characteristics(&self) -> String {
        format!("{} • {}", self.gender.as_str(), self.style)
    }
}

const fn female(label: &'static str, name: &'static str, style: &'static str) -> Voice {
    Voice {
        label,
        name,
        gender: Gender::Female,
        style,
    }
}

const fn male(label: &'static str, name: &'static str, style: &'static str) -> Voice {
    Voice {
        label,
        name,
        gender: Gender::Male,
        style,
    }
}

/// Default voice label.
pub const DEFAULT_VOICE: &str = "[M] Puck";

pub const VOICES: &[Voice] = &[
    female("[F] Aoede", "Aoede", "Breezy and natural"),
    female("[F] Kore", "Kore", "Firm and confident"),
    female("[F] Leda", "Leda", "Youthful and energetic"),
    female("[F] Zephyr", "Zephyr", "Bright and cheerful"),
    female("[F] Autonoe", "Autonoe", "Bright and optimistic"),
    female("[F] Callirhoe", "Callirhoe", "Easy-going and relaxed"),
    female("[F] Despina", "Despina", "Smooth and flowing"),
    female("[F] Erinome", "Erinome", "Clear and precise"),
    female("[F] Gacrux", "Gacrux", "Mature and experienced"),
    female("[F] Laomedeia", "Laomedeia", "Upbeat and lively"),
    female("[F] Pulcherrima", "Pulcherrima", "Forward and expressive"),
    female("[F] Sulafat", "Sulafat", "Warm and welcoming"),
    female("[F] Vindemiatrix", "Vindemiatrix", "Gentle and kind"),
    female("[F] Achernar", "Achernar", "Soft and gentle"),
    male("[M] Puck", "Puck", "Upbeat and energetic"),
    male("[M] Charon", "Charon", "Informative and clear"),
    male("[M] Fenrir", "Fenrir", "Excitable and dynamic"),
    male("[M] Orus", "Orus", "Firm and decisive"),
    male("[M] Achird", "Achird", "Friendly and approachable"),
    male("[M] Algenib", "Algenib", "Gravelly texture"),
    male("[M] Algieba", "Algieba", "Smooth and pleasant"),
    male("[M] Alnilam", "Alnilam", "Firm and strong"),
    male("[M] Enceladus", "Enceladus", "Breathy and soft"),
    male("[M] Iapetus", "Iapetus", "Clear and articulate"),
    male("[M] Rasalgethi", "Rasalgethi", "Informative and professional"),
    male("[M] Sadachbia", "Sadachbia", "Lively and animated"),
    male("[M] Sadaltager", "Sadaltager", "Knowledgeable and authoritative"),
    male("[M] Schedar", "Schedar", "Even and balanced"),
    male("[M] Umbriel", "Umbriel", "Easy-going and calm"),
    male("[M] Zubenelgenubi", "Zubenelgenubi", "Casual and conversational"),
];

/// Maps a display label to its API voice name; unknown labels pass through.
#[must_use]
pub fn resolve_voice(label: &str) -> &str {
    VOICES
        .iter()
        .find(|voice| voice.label == label)
        .map_or(label, |voice| voice.name)
}

/// Looks a voice up by API name.
#[must_use]
pub fn find_voice(name: &str) -> Option<&'static Voice> {
    VOICES.iter().find(|voice| voice.name == name)
}

/// Characteristics for an API voice name, if the voice is known.
#[must_use]
pub fn voice_description(name: &str) -> Option<String> {
    find_voice(name).map(Voice::characteristics)
}

/// All display labels, in table order.
pub fn display_labels() -> impl Iterator<Item = &'static str> {
    VOICES.iter().map(|voice| voice.label)
}
