/// Represents the API version to target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiVersion {
    V1Alpha,
    #[default]
    V1Beta,
}

impl ApiVersion {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V1Alpha => "v1alpha",
            Self::V1Beta => "v1beta",
        }
    }
}

// --- URL Construction ---
pub const BASE_URL_PREFIX: &str = "https://generativelanguage.googleapis.com";

/// Builds the `generateContent` URL for a model.
///
/// The API key travels as the `key` query parameter. Use [`redact_key`] before
/// writing the URL anywhere a human might read it.
#[must_use]
pub fn construct_url(base_url: &str, model_name: &str, api_key: &str, version: ApiVersion) -> String {
    format!(
        "{base}/{version_str}/models/{model_name}:generateContent?key={key}",
        base = base_url.trim_end_matches('/'),
        version_str = version.as_str(),
        key = urlencoding::encode(api_key),
    )
}

/// Replaces the value of the `key` query parameter with `***`.
#[must_use]
pub fn redact_key(url: &str) -> String {
    let Some((path, query)) = url.split_once('?') else {
        return url.to_string();
    };

    let redacted = query
        .split('&')
        .map(|pair| {
            if pair.starts_with("key=") {
                "key=***".to_string()
            } else {
                pair.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("&");

    format!("{path}?{redacted}")
}
