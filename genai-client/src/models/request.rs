use serde::Serialize;

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Content {
    pub parts: Vec<Part>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Part {
    pub text: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_modalities: Option<Vec<Modality>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_config: Option<SpeechConfig>,
}

/// Output modality requested from the model.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Modality {
    Text,
    Audio,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SpeechConfig {
    pub voice_config: VoiceConfig,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VoiceConfig {
    pub prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PrebuiltVoiceConfig {
    pub voice_name: String,
}

impl GenerateContentRequest {
    fn single_prompt(text: &str, generation_config: GenerationConfig) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: text.to_string(),
                }],
            }],
            generation_config: Some(generation_config),
        }
    }

    /// Builds an audio-only request spoken with a prebuilt voice.
    #[must_use]
    pub fn speech(text: &str, temperature: f32, voice_name: &str) -> Self {
        Self::single_prompt(
            text,
            GenerationConfig {
                temperature: Some(temperature),
                response_modalities: Some(vec![Modality::Audio]),
                speech_config: Some(SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: voice_name.to_string(),
                        },
                    },
                }),
                ..Default::default()
            },
        )
    }

    /// Builds a plain text-generation request.
    #[must_use]
    pub fn text(prompt: &str, temperature: f32, max_output_tokens: u32) -> Self {
        Self::single_prompt(
            prompt,
            GenerationConfig {
                temperature: Some(temperature),
                max_output_tokens: Some(max_output_tokens),
                ..Default::default()
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_speech_request_wire_format() {
        let request = GenerateContentRequest::speech("Say: hi", 1.0, "Puck");
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(
            value,
            json!({
                "contents": [{"parts": [{"text": "Say: hi"}]}],
                "generationConfig": {
                    "temperature": 1.0,
                    "responseModalities": ["AUDIO"],
                    "speechConfig": {
                        "voiceConfig": {
                            "prebuiltVoiceConfig": {"voiceName": "Puck"}
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn test_text_request_wire_format() {
        let request = GenerateContentRequest::text("Describe Kore", 0.5, 1024);
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["generationConfig"]["temperature"], 0.5);
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 1024);
        assert!(value["generationConfig"].get("responseModalities").is_none());
        assert!(value["generationConfig"].get("speechConfig").is_none());
    }

    #[test]
    fn test_generation_config_omitted_when_none() {
        let request = GenerateContentRequest {
            contents: vec![],
            generation_config: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("generationConfig").is_none());
    }
}
