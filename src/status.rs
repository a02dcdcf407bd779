//! Human-readable status strings returned alongside every buffer.

use crate::errors::BillingIssue;
use crate::pricing;
use crate::request::TtsModel;
use std::fmt::Write;

const BILLING_ERROR_PREVIEW: usize = 100;
const GENERIC_ERROR_PREVIEW: usize = 150;
const GUIDANCE_PREVIEW: usize = 150;

/// Why synthesis was replaced by the simulation fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationReason {
    /// Pro and Flash are both rate limited.
    BothModelsExhausted,
    /// The key was rejected; preview TTS models need allowlisted access.
    PreviewAccess,
}

impl SimulationReason {
    /// Phrase handed to the guidance model.
    #[must_use]
    pub const fn guidance_context(self) -> &'static str {
        match self {
            Self::BothModelsExhausted => "Both TTS models are temporarily out of quota",
            Self::PreviewAccess => "TTS preview models need special access",
        }
    }
}

/// First `max_chars` characters of `s`.
fn head(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

pub(crate) fn missing_credential() -> String {
    "❌ API key required. Please set GEMINI_API_KEY environment variable or pass an API key with the request."
        .to_string()
}

pub(crate) fn malformed_credential(preview: &str, length: usize) -> String {
    format!(
        "❌ Invalid API key format. Key should start with 'AIza' and be ~39 characters long.\n\
         Current key: {preview}... (length: {length})"
    )
}

pub(crate) fn malformed_billing_project(project_id: &str) -> String {
    format!(
        "❌ Invalid project ID format: {project_id}\n\
         💡 Project IDs should contain only letters, numbers, and hyphens\n\
         💡 Example: 'my-project-123' or 'project-name'\n\
         💡 Find your project ID in Google Cloud Console"
    )
}

/// Details of a successful synthesis used to build its status line.
#[derive(Debug)]
pub(crate) struct SuccessReport<'a> {
    pub model: TtsModel,
    pub voice_name: &'a str,
    pub prompt: &'a str,
    pub paid_tier: bool,
    pub samples: usize,
    pub show_voice_info: bool,
}

pub(crate) fn success(report: &SuccessReport<'_>) -> String {
    let tier = if report.paid_tier { "💰 Paid" } else { "🆓 Free" };
    let mut msg = format!(
        "✅ REST TTS Success: {} with {} voice\n🏪 Tier: {tier} | 📊 Generated {} samples at 24kHz",
        report.model, report.voice_name, report.samples
    );

    if report.show_voice_info
        && let Some(description) = crate::voices::voice_description(report.voice_name)
    {
        let _ = write!(msg, "\n🎭 Voice: {description}");
    }

    if report.paid_tier {
        let cost = pricing::actual(report.prompt, report.samples, report.model);
        let _ = write!(msg, "\n💵 Cost: ~${:.4}", cost.total_usd);
    }

    msg
}

pub(crate) fn fallback_success(voice_name: &str) -> String {
    format!(
        "⚠️ Fallback Success: Used Flash model (Pro was rate limited)\n\
         🎙️ Voice: {voice_name} (Flash quality)\n\
         💡 Consider upgrading to paid tier for consistent Pro access\n\
         💰 Paid Pro: {}\n\
         💰 Paid Flash: {}\n\
         📊 Generated audio at 24kHz",
        TtsModel::Pro.rates().summary(),
        TtsModel::Flash.rates().summary()
    )
}

pub(crate) fn paid_rate_limit(model: TtsModel, billing_project: Option<&str>, retry_delay_secs: u32) -> String {
    format!(
        "⚠️ Unexpected rate limit on paid tier: {model}\n\
         💰 Billing Project: {}\n\
         💡 Check billing project configuration and quotas\n\
         ⏰ Retry in {retry_delay_secs} seconds",
        billing_project.unwrap_or("default")
    )
}

pub(crate) fn free_quota_exceeded(model: TtsModel, retry_delay_secs: u32) -> String {
    format!(
        "🚫 {model} API quota exceeded (Free Tier)\n\
         💰 Upgrade to paid tier for higher quotas:\n  \
         • {} TTS: {}\n\
         ⏰ Try again in {retry_delay_secs} seconds",
        model.label(),
        model.rates().summary()
    )
}

pub(crate) fn billing_failure(
    issue: BillingIssue,
    paid_tier: bool,
    billing_project: Option<&str>,
    error_text: &str,
) -> String {
    let project = billing_project.unwrap_or("Not specified");
    let mut msg = if !paid_tier {
        "🚫 API Access Error (Free Tier)\n\
         💡 This might be resolved by:\n  \
         • Upgrading to paid tier\n  \
         • Checking API permissions\n  \
         • Verifying account status"
            .to_string()
    } else {
        match issue {
            BillingIssue::ProjectNotFound => format!(
                "🚫 Billing Project Error\n\
                 🏗️ Project ID: {project}\n\
                 ❌ Project not found or deleted\n\n\
                 🔧 Solutions:\n  \
                 • Verify project ID in Google Cloud Console\n  \
                 • Ensure project exists and is active\n  \
                 • Check if project was accidentally deleted\n  \
                 • Use project ID (not project name)\n\n\
                 💡 For free tier, leave billing project empty"
            ),
            BillingIssue::ProjectDenied => format!(
                "🚫 Project Access Denied\n\
                 🏗️ Project ID: {project}\n\
                 ❌ API key doesn't have access to this project\n\n\
                 🔧 Solutions:\n  \
                 • Ensure API key was created in this project\n  \
                 • Grant API key access to the project\n  \
                 • Check IAM permissions\n  \
                 • Try using the project where API key was created\n\n\
                 💡 For free tier, leave billing project empty"
            ),
            BillingIssue::Configuration => format!(
                "💳 Billing Configuration Error\n\
                 🏗️ Project: {project}\n\
                 🔧 Check:\n  \
                 • Billing is enabled on the project\n  \
                 • Gemini API is enabled in the project\n  \
                 • API key has access to the billing project\n  \
                 • Project ID is correct\n\
                 💡 Visit Google Cloud Console to verify billing settings"
            ),
        }
    };

    let _ = write!(
        msg,
        "\n🔧 Original error: {}...",
        head(error_text, BILLING_ERROR_PREVIEW)
    );
    msg
}

/// `model_label` is a model id, or `"both models"` after a failed fallback.
pub(crate) fn generic_failure(model_label: &str, error_text: &str, retry_delay_secs: u32) -> String {
    let mut msg = format!("❌ TTS failed: {model_label}\n");
    if error_text.contains("429") {
        let _ = writeln!(msg, "⏰ Rate limited - try again in {retry_delay_secs} seconds");
    }
    let _ = write!(msg, "🔧 Error: {}...", head(error_text, GENERIC_ERROR_PREVIEW));
    msg
}

pub(crate) fn simulated(reason: SimulationReason, voice_name: &str, guidance: &str) -> String {
    let guidance = head(guidance, GUIDANCE_PREVIEW);
    match reason {
        SimulationReason::BothModelsExhausted => format!(
            "🚫 Both TTS Models Exhausted - Voice Simulation Mode\n\
             🎭 Requested Voice: {voice_name} (characteristics preserved)\n\
             ⏰ Quotas renew: Per-minute (60s) | Daily (24h)\n\
             💡 Voice Instructions: {guidance}..."
        ),
        SimulationReason::PreviewAccess => format!(
            "⚠️ TTS Simulation Mode (Preview models need access)\n\
             🎭 Requested Voice: {voice_name}\n\
             📝 Voice Instructions: {guidance}..."
        ),
    }
}

pub(crate) fn system_failure(error_text: &str, voice_name: &str) -> String {
    format!(
        "❌ Complete system failure: {error_text}\n\
         🎭 Requested Voice: {voice_name} (preserved in message)"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_credential_preview() {
        let msg = malformed_credential("AIzaShort", 9);
        assert!(msg.starts_with("❌ Invalid API key format."));
        assert!(msg.ends_with("Current key: AIzaShort... (length: 9)"));
    }

    #[test]
    fn test_project_guidance_lines() {
        let msg = malformed_billing_project("bad project");
        assert_eq!(msg.lines().count(), 4);
        assert!(msg.contains("Invalid project ID format: bad project"));
    }

    #[test]
    fn test_success_free_tier() {
        let msg = success(&SuccessReport {
            model: TtsModel::Pro,
            voice_name: "Puck",
            prompt: "Say: hi",
            paid_tier: false,
            samples: 48_000,
            show_voice_info: true,
        });
        assert_eq!(
            msg,
            "✅ REST TTS Success: gemini-2.5-pro-preview-tts with Puck voice\n\
             🏪 Tier: 🆓 Free | 📊 Generated 48000 samples at 24kHz\n\
             🎭 Voice: Male • Upbeat and energetic"
        );
    }

    #[test]
    fn test_success_paid_tier_has_cost() {
        let msg = success(&SuccessReport {
            model: TtsModel::Flash,
            voice_name: "Unknown",
            prompt: "abcd",
            paid_tier: true,
            samples: 24_000,
            show_voice_info: true,
        });
        assert!(msg.contains("💰 Paid"));
        assert!(!msg.contains("🎭 Voice"));
        assert!(msg.ends_with("💵 Cost: ~$0.0100"));
    }

    #[test]
    fn test_fallback_success_pricing() {
        let msg = fallback_success("Kore");
        assert!(msg.contains("Kore (Flash quality)"));
        assert!(msg.contains("Paid Pro: $1.00 input + $20.00 output per 1M tokens"));
        assert!(msg.contains("Paid Flash: $0.50 input + $10.00 output per 1M tokens"));
    }

    #[test]
    fn test_paid_rate_limit_defaults_project() {
        let msg = paid_rate_limit(TtsModel::Pro, None, 45);
        assert!(msg.contains("Billing Project: default"));
        assert!(msg.ends_with("Retry in 45 seconds"));
    }

    #[test]
    fn test_free_quota_uses_model_pricing() {
        let pro = free_quota_exceeded(TtsModel::Pro, 30);
        assert!(pro.contains("• Pro TTS: $1.00 input"));
        let flash = free_quota_exceeded(TtsModel::Flash, 30);
        assert!(flash.contains("• Flash TTS: $0.50 input"));
        assert!(flash.ends_with("Try again in 30 seconds"));
    }

    #[test]
    fn test_billing_variants() {
        let err = "x".repeat(300);
        let not_found = billing_failure(BillingIssue::ProjectNotFound, true, Some("p1"), &err);
        assert!(not_found.starts_with("🚫 Billing Project Error"));
        assert!(not_found.contains("Project ID: p1"));

        let denied = billing_failure(BillingIssue::ProjectDenied, true, None, &err);
        assert!(denied.starts_with("🚫 Project Access Denied"));
        assert!(denied.contains("Project ID: Not specified"));

        let config = billing_failure(BillingIssue::Configuration, true, Some("p1"), &err);
        assert!(config.starts_with("💳 Billing Configuration Error"));

        let free = billing_failure(BillingIssue::ProjectNotFound, false, Some("p1"), &err);
        assert!(free.starts_with("🚫 API Access Error (Free Tier)"));

        for msg in [not_found, denied, config, free] {
            assert!(msg.ends_with(&format!("🔧 Original error: {}...", "x".repeat(100))));
        }
    }

    #[test]
    fn test_generic_failure_rate_hint() {
        let with_hint = generic_failure("both models", "Rate limit (429): slow down", 20);
        assert!(with_hint.starts_with("❌ TTS failed: both models\n"));
        assert!(with_hint.contains("⏰ Rate limited - try again in 20 seconds\n"));

        let without = generic_failure(TtsModel::Flash.as_str(), "boom", 20);
        assert_eq!(
            without,
            "❌ TTS failed: gemini-2.5-flash-preview-tts\n🔧 Error: boom..."
        );
    }

    #[test]
    fn test_preview_truncation_is_char_safe() {
        let err = "é".repeat(200);
        let msg = generic_failure("m", &err, 30);
        assert!(msg.ends_with(&format!("{}...", "é".repeat(150))));
    }

    #[test]
    fn test_simulated_headers() {
        let both = simulated(SimulationReason::BothModelsExhausted, "Puck", "Speak softly");
        assert!(both.starts_with("🚫 Both TTS Models Exhausted - Voice Simulation Mode"));
        assert!(both.contains("Quotas renew"));
        assert!(both.ends_with("💡 Voice Instructions: Speak softly..."));

        let preview = simulated(SimulationReason::PreviewAccess, "Puck", "Speak softly");
        assert!(preview.starts_with("⚠️ TTS Simulation Mode (Preview models need access)"));
    }

    #[test]
    fn test_system_failure_keeps_voice() {
        let msg = system_failure("network down", "Charon");
        assert!(msg.contains("Complete system failure: network down"));
        assert!(msg.contains("Charon (preserved in message)"));
    }
}
