//! Rough paid-tier cost estimates.
//!
//! Token counts are approximations: four characters per input token, and
//! 1000 output tokens per second of audio.

use crate::audio::SAMPLE_RATE;
use crate::request::TtsModel;

const CHARS_PER_INPUT_TOKEN: f64 = 4.0;
const OUTPUT_TOKENS_PER_SECOND: f64 = 1000.0;
const SECS_PER_WORD: f64 = 0.4;
const TOKENS_PER_RATE_UNIT: f64 = 1_000_000.0;

/// USD per one million tokens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenRates {
    pub input: f64,
    pub output: f64,
}

impl TtsModel {
    #[must_use]
    pub const fn rates(self) -> TokenRates {
        match self {
            Self::Pro => TokenRates {
                input: 1.00,
                output: 20.00,
            },
            Self::Flash => TokenRates {
                input: 0.50,
                output: 10.00,
            },
        }
    }
}

impl TokenRates {
    /// `"$1.00 input + $20.00 output per 1M tokens"`
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "${:.2} input + ${:.2} output per 1M tokens",
            self.input, self.output
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostEstimate {
    pub input_tokens: f64,
    pub output_tokens: f64,
    pub total_usd: f64,
}

impl CostEstimate {
    fn priced(input_tokens: f64, output_tokens: f64, model: TtsModel) -> Self {
        let rates = model.rates();
        let total_usd = input_tokens / TOKENS_PER_RATE_UNIT * rates.input
            + output_tokens / TOKENS_PER_RATE_UNIT * rates.output;
        Self {
            input_tokens,
            output_tokens,
            total_usd,
        }
    }
}

fn input_tokens(prompt: &str) -> f64 {
    prompt.chars().count() as f64 / CHARS_PER_INPUT_TOKEN
}

/// Estimate before synthesis, guessing audio length from the word count.
#[must_use]
pub fn estimate(prompt: &str, model: TtsModel) -> CostEstimate {
    let audio_secs = prompt.split_whitespace().count() as f64 * SECS_PER_WORD;
    CostEstimate::priced(input_tokens(prompt), audio_secs * OUTPUT_TOKENS_PER_SECOND, model)
}

/// Cost of a finished synthesis, from the number of samples produced.
#[must_use]
pub fn actual(prompt: &str, samples: usize, model: TtsModel) -> CostEstimate {
    let audio_secs = samples as f64 / f64::from(SAMPLE_RATE);
    CostEstimate::priced(input_tokens(prompt), audio_secs * OUTPUT_TOKENS_PER_SECOND, model)
}

/// One-line estimate for display.
#[must_use]
pub fn estimate_summary(prompt: &str, model: TtsModel, paid_tier: bool) -> String {
    if !paid_tier {
        return "Free tier - no charges".to_string();
    }

    let cost = estimate(prompt, model);
    format!(
        "Estimated cost: ~${:.4} (Input: {:.0} tokens, Output: {:.0} tokens)",
        cost.total_usd, cost.input_tokens, cost.output_tokens
    )
}
