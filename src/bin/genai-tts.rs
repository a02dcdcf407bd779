use anyhow::Context;
use clap::Parser;
use genai_tts::request::DEFAULT_PROMPT;
use genai_tts::voices::{self, DEFAULT_VOICE};
use genai_tts::{JsonFileStore, SpeechRequest, Synthesizer, TtsModel};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "genai-tts")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Gemini text-to-speech with tier-aware fallback")]
struct Args {
    /// Text to speak; style instructions such as "Say cheerfully:" are allowed
    #[arg(default_value = DEFAULT_PROMPT)]
    text: String,

    /// TTS model: pro, flash, or a full model id
    #[arg(long, default_value = "pro")]
    model: TtsModel,

    /// Voice label (e.g. "[F] Kore") or API voice name
    #[arg(long, default_value = DEFAULT_VOICE)]
    voice: String,

    #[arg(long, default_value_t = 1.0)]
    temperature: f32,

    /// API key; saved to the config file for later runs
    #[arg(long, value_name = "KEY")]
    api_key: Option<String>,

    #[arg(long)]
    paid_tier: bool,

    /// Google Cloud project to bill on the paid tier
    #[arg(long, value_name = "PROJECT_ID")]
    billing_project: Option<String>,

    /// Retry five times even on the free tier
    #[arg(long)]
    aggressive_retry: bool,

    /// Do not retry on Flash when Pro is rate limited
    #[arg(long)]
    no_flash_fallback: bool,

    /// Seconds suggested in rate-limit messages (10-120)
    #[arg(long, default_value_t = 30)]
    retry_delay: u32,

    #[arg(long)]
    show_voice_info: bool,

    /// Write the audio as a 32-bit float WAV file
    #[arg(long, short, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Credential file (defaults to the platform config directory)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the voice table and exit
    #[arg(long)]
    list_voices: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if args.list_voices {
        for voice in voices::VOICES {
            println!("{:<20} {}", voice.label, voice.characteristics());
        }
        return Ok(());
    }

    let store = match args.config {
        Some(path) => JsonFileStore::new(path),
        None => JsonFileStore::default_location().context("No config directory; pass --config")?,
    };
    info!("Credential file: {}", store.path().display());

    let synthesizer = Synthesizer::builder()
        .store(Arc::new(store))
        .build()
        .context("Failed to build synthesizer")?;

    let mut request = SpeechRequest::new(args.text)
        .with_model(args.model)
        .with_voice(args.voice)
        .with_temperature(args.temperature)
        .with_paid_tier(args.paid_tier)
        .with_aggressive_retry(args.aggressive_retry)
        .with_flash_fallback(!args.no_flash_fallback)
        .with_retry_delay_secs(args.retry_delay)
        .with_voice_info(args.show_voice_info);
    if let Some(key) = args.api_key {
        request = request.with_api_key(key);
    }
    if let Some(project) = args.billing_project {
        request = request.with_billing_project(project);
    }

    let outcome = synthesizer.generate(&request).await;
    println!("{}", outcome.status());

    if let Some(path) = args.output {
        outcome
            .audio()
            .write_wav(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!(
            "Wrote {:.2}s of audio to {}",
            outcome.audio().duration_secs(),
            path.display()
        );
    }

    Ok(())
}
