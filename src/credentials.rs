//! API key resolution and the persisted credential record.
//!
//! A key is looked up in this order: the key supplied with the request, the
//! `GEMINI_API_KEY` environment variable captured when the
//! [`Synthesizer`](crate::Synthesizer) was built, and finally the record in
//! the injected [`CredentialStore`].

use crate::errors::{StoreError, TtsError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, PoisonError};
use tracing::debug;

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Values people leave in `.env` templates. Compared case-insensitively after trimming.
const PLACEHOLDER_KEYS: &[&str] = &[
    "token_here",
    "place_token_here",
    "your_api_key",
    "api_key_here",
    "enter_your_key",
    "<api_key>",
];

const KEY_PREFIX: &str = "AIza";
const MIN_KEY_LEN: usize = 35;
const KEY_PREVIEW_CHARS: usize = 15;
const KEY_SUFFIX_CHARS: usize = 5;

// Letters and digits in the `char::is_alphanumeric` sense, plus `-` and `_`,
// with at least one letter or digit.
static PROJECT_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\p{Alphabetic}\p{N}_-]*[\p{Alphabetic}\p{N}][\p{Alphabetic}\p{N}_-]*$")
        .expect("project id pattern is valid")
});

/// The flat JSON record persisted between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    #[serde(rename = "GEMINI_API_KEY", default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub use_paid_tier: bool,
    #[serde(default)]
    pub billing_project_id: Option<String>,
}

/// Where the credential record lives.
///
/// Saving replaces the whole record; there is no locking, the last writer wins.
pub trait CredentialStore: Send + Sync + Debug {
    /// Reads the record. A store that has never been written loads as empty.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing storage exists but cannot be read.
    fn load(&self) -> Result<CredentialRecord, StoreError>;

    /// Overwrites the record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the record cannot be written.
    fn save(&self, record: &CredentialRecord) -> Result<(), StoreError>;
}

/// Record stored as pretty-printed JSON in a single file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/genai-tts/config.json`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoConfigDir`] if the platform has no config directory.
    pub fn default_location() -> Result<Self, StoreError> {
        let dir = dirs::config_dir().ok_or(StoreError::NoConfigDir)?;
        Ok(Self::new(dir.join("genai-tts").join("config.json")))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for JsonFileStore {
    fn load(&self) -> Result<CredentialRecord, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No credential file at {}", self.path.display());
                Ok(CredentialRecord::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, record: &CredentialRecord) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(record)?;
        std::fs::write(&self.path, json)?;
        debug!("Saved credential record to {}", self.path.display());
        Ok(())
    }
}

/// In-process store, for tests and embedders that manage keys themselves.
#[derive(Debug, Default)]
pub struct MemoryStore {
    record: Mutex<CredentialRecord>,
}

impl MemoryStore {
    #[must_use]
    pub fn new(record: CredentialRecord) -> Self {
        Self {
            record: Mutex::new(record),
        }
    }

    /// Store pre-loaded with a key.
    #[must_use]
    pub fn with_key(api_key: impl Into<String>) -> Self {
        Self::new(CredentialRecord {
            api_key: Some(api_key.into()),
            ..Default::default()
        })
    }

    /// Copy of the current record.
    #[must_use]
    pub fn snapshot(&self) -> CredentialRecord {
        self.record
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl CredentialStore for MemoryStore {
    fn load(&self) -> Result<CredentialRecord, StoreError> {
        Ok(self.snapshot())
    }

    fn save(&self, record: &CredentialRecord) -> Result<(), StoreError> {
        *self.record.lock().unwrap_or_else(PoisonError::into_inner) = record.clone();
        Ok(())
    }
}

/// Where a resolved key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Request,
    Environment,
    Store,
}

/// Returns `true` for template values such as `your_api_key`.
#[must_use]
pub fn is_placeholder(value: &str) -> bool {
    let normalized = value.trim().to_lowercase();
    PLACEHOLDER_KEYS.contains(&normalized.as_str())
}

/// Filters an environment value: blank and placeholder values count as absent.
#[must_use]
pub fn usable_env_key(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty() && !is_placeholder(v))
}

/// Picks the key by precedence: request, environment, store.
///
/// `stored` is only consulted when neither of the others is present.
pub fn resolve_api_key(
    request_key: Option<&str>,
    env_key: Option<&str>,
    stored: impl FnOnce() -> Option<String>,
) -> Option<(String, KeySource)> {
    if let Some(key) = request_key {
        return Some((key.to_string(), KeySource::Request));
    }
    if let Some(key) = env_key {
        return Some((key.to_string(), KeySource::Environment));
    }
    stored()
        .filter(|key| !key.trim().is_empty())
        .map(|key| (key, KeySource::Store))
}

/// Superficial shape check: `AIza` prefix and at least 35 characters.
///
/// # Errors
///
/// Returns [`TtsError::CredentialMalformed`] with a short preview of the key.
pub fn validate_key_format(key: &str) -> Result<(), TtsError> {
    let length = key.chars().count();
    if key.starts_with(KEY_PREFIX) && length >= MIN_KEY_LEN {
        Ok(())
    } else {
        Err(TtsError::CredentialMalformed {
            preview: key.chars().take(KEY_PREVIEW_CHARS).collect(),
            length,
        })
    }
}

/// Billing project ids may only contain letters, digits, `-` and `_`, and
/// need at least one letter or digit. Non-ASCII letters and digits count.
///
/// # Errors
///
/// Returns [`TtsError::BillingProjectMalformed`] otherwise.
pub fn validate_billing_project(project_id: &str) -> Result<(), TtsError> {
    if PROJECT_ID_PATTERN.is_match(project_id) {
        Ok(())
    } else {
        Err(TtsError::BillingProjectMalformed(project_id.to_string()))
    }
}

/// `first15...last5`, safe to log.
#[must_use]
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= KEY_PREVIEW_CHARS + KEY_SUFFIX_CHARS {
        let head: String = chars.iter().take(KEY_PREVIEW_CHARS.min(chars.len() / 2)).collect();
        return format!("{head}...");
    }
    let head: String = chars[..KEY_PREVIEW_CHARS].iter().collect();
    let tail: String = chars[chars.len() - KEY_SUFFIX_CHARS..].iter().collect();
    format!("{head}...{tail}")
}
