use crate::errors::ApiStatus;
use serde::Deserialize;

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<ContentResponse>,
    pub finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ContentResponse {
    #[serde(default)]
    pub parts: Vec<PartResponse>,
    pub role: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PartResponse {
    pub text: Option<String>,
    pub inline_data: Option<InlineData>,
}

/// Binary payload returned inline, base64-encoded.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: Option<String>,
    pub data: Option<String>,
}

impl GenerateContentResponse {
    /// First part of the first candidate, if the response has one.
    #[must_use]
    pub fn first_part(&self) -> Option<&PartResponse> {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .and_then(|content| content.parts.first())
    }

    /// Text of the first part that carries any.
    #[must_use]
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .and_then(|content| content.parts.iter().find_map(|part| part.text.as_deref()))
    }
}

/// Error body returned by Google APIs on non-200 responses.
#[derive(Deserialize, Debug)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Deserialize, Debug)]
pub struct ErrorBody {
    pub code: Option<u16>,
    pub message: Option<String>,
    #[serde(default, deserialize_with = "deserialize_status")]
    pub status: Option<ApiStatus>,
    #[serde(default)]
    pub details: Vec<ErrorDetail>,
}

#[derive(Deserialize, Debug)]
pub struct ErrorDetail {
    pub reason: Option<String>,
}

fn deserialize_status<'de, D>(deserializer: D) -> Result<Option<ApiStatus>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.map(ApiStatus::from))
}
