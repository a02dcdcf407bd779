//! Wire-level debugging via the `LOUD_WIRE` environment variable.
//!
//! When `LOUD_WIRE` is set to any value, prints the JSON of every
//! `generateContent` request and response to stderr with pretty formatting
//! and colors.
//!
//! ```bash
//! LOUD_WIRE=1 genai-tts "Say: hello"
//! ```
//!
//! Green `>>>` marks outgoing requests, red `<<<` incoming responses. URLs are
//! logged with the `key` parameter redacted, and the base64 PCM payload in
//! `inlineData.data` is cut to its first 100 characters.

use colored::Colorize;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Request ID counter for correlating requests with responses
static REQUEST_COUNTER: AtomicUsize = AtomicUsize::new(1);

static ENABLED: OnceLock<bool> = OnceLock::new();

/// Check if LOUD_WIRE debugging is enabled.
///
/// Cached after the first check; `LOUD_WIRE` must be set before the first request.
#[must_use]
pub fn is_enabled() -> bool {
    *ENABLED.get_or_init(|| std::env::var("LOUD_WIRE").is_ok())
}

/// Get the next request ID for correlation.
#[must_use]
pub fn next_request_id() -> usize {
    REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Fields holding base64 blobs.
const TRUNCATE_FIELDS: &[&str] = &["data"];

const TRUNCATE_THRESHOLD: usize = 100;

/// Walks the JSON tree and shortens long base64 fields in place.
fn truncate_long_fields(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, val) in map.iter_mut() {
                if TRUNCATE_FIELDS.contains(&key.as_str()) {
                    if let serde_json::Value::String(s) = val
                        && s.len() > TRUNCATE_THRESHOLD
                        && s.is_char_boundary(TRUNCATE_THRESHOLD)
                    {
                        let total = s.len();
                        s.truncate(TRUNCATE_THRESHOLD);
                        s.push_str(&format!("... ({total} chars)"));
                    }
                } else {
                    truncate_long_fields(val);
                }
            }
        }
        serde_json::Value::Array(arr) => {
            for item in arr.iter_mut() {
                truncate_long_fields(item);
            }
        }
        _ => {}
    }
}

fn timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

fn prefix(request_id: usize) -> String {
    format!(
        "{} {} {}",
        "[LOUD_WIRE]".bold(),
        timestamp().dimmed(),
        format!("[REQ#{}]", request_id).cyan()
    )
}

fn print_json_lines(prefix: &str, value: &serde_json::Value) {
    if let Ok(colored) = colored_json::to_colored_json_auto(value) {
        for line in colored.lines() {
            eprintln!("{prefix} {line}");
        }
    } else if let Ok(pretty) = serde_json::to_string_pretty(value) {
        for line in pretty.lines() {
            eprintln!("{prefix} {line}");
        }
    }
}

fn print_body(prefix: &str, label: colored::ColoredString, body: &str, limit: usize) {
    if let Ok(mut parsed) = serde_json::from_str::<serde_json::Value>(body) {
        truncate_long_fields(&mut parsed);
        eprintln!("{prefix} {label}:");
        print_json_lines(prefix, &parsed);
    } else {
        let truncated: String = body.chars().take(limit).collect();
        let ellipsis = if truncated.len() < body.len() { "..." } else { "" };
        eprintln!("{prefix} {label}: {truncated}{ellipsis}");
    }
}

/// Log an outgoing HTTP request. `url` must already be redacted.
pub fn log_request(request_id: usize, method: &str, url: &str, body: Option<&str>) {
    if !is_enabled() {
        return;
    }

    let prefix = prefix(request_id);
    eprintln!("{prefix} {} {method} {url}", ">>>".green().bold());

    if let Some(body) = body {
        print_body(&prefix, "Body".green(), body, 500);
    }
}

/// Log an incoming HTTP response status.
pub fn log_response_status(request_id: usize, status: u16) {
    if !is_enabled() {
        return;
    }

    let prefix = prefix(request_id);
    let status_text = if status < 300 {
        format!("{status} OK").green()
    } else {
        format!("{status} ERROR").red()
    };

    eprintln!("{prefix} {} {status_text}", "<<<".red().bold());
}

/// Log an incoming HTTP response body.
pub fn log_response_body(request_id: usize, body: &str) {
    if !is_enabled() {
        return;
    }

    print_body(&prefix(request_id), "Response".red(), body, 1000);
}
