use crate::audio::{AudioBuffer, simulated_duration_secs};
use crate::credentials::{
    API_KEY_ENV, CredentialRecord, CredentialStore, JsonFileStore, KeySource, mask_key,
    resolve_api_key, usable_env_key, validate_billing_project, validate_key_format,
};
use crate::errors::{BillingContext, BillingIssue, FailureKind, TtsError};
use crate::outcome::SpeechOutcome;
use crate::pricing;
use crate::request::{GUIDANCE_MODEL_ID, RetryPolicy, SpeechRequest, TtsModel};
use crate::speech::{SpeechCall, guidance_prompt, request_guidance, synthesize_with_retry};
use crate::status::{self, SimulationReason, SuccessReport};
use genai_client::{HttpTransport, Transport};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Model label used in failure messages once the Flash fallback has also failed.
const BOTH_MODELS_LABEL: &str = "both models";

const PROMPT_PREVIEW_CHARS: usize = 100;
const PROJECT_PREVIEW_CHARS: usize = 20;

/// Turns [`SpeechRequest`]s into audio.
///
/// A `Synthesizer` holds no per-request state: the credential record is read
/// from its store on each call, and the environment key is captured once when
/// the synthesizer is built.
///
/// # Example
///
/// ```no_run
/// use genai_tts::{SpeechRequest, Synthesizer};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), genai_tts::TtsError> {
/// let synthesizer = Synthesizer::builder().build()?;
/// let outcome = synthesizer
///     .generate(&SpeechRequest::new("Say cheerfully: Have a wonderful day!"))
///     .await;
///
/// println!("{}", outcome.status());
/// # Ok(())
/// # }
/// ```
pub struct Synthesizer {
    transport: Arc<dyn Transport>,
    store: Arc<dyn CredentialStore>,
    env_key: Option<String>,
    guidance_model: String,
    base_backoff: Duration,
}

impl fmt::Debug for Synthesizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Synthesizer")
            .field("store", &self.store)
            .field("env_key", &self.env_key.as_deref().map(mask_key))
            .field("guidance_model", &self.guidance_model)
            .field("base_backoff", &self.base_backoff)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Synthesizer`].
///
/// # Example
///
/// ```
/// use genai_tts::{MemoryStore, Synthesizer};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let synthesizer = Synthesizer::builder()
///     .store(Arc::new(MemoryStore::default()))
///     .environment_key(None)
///     .base_backoff(Duration::from_millis(100))
///     .build()
///     .unwrap();
/// ```
#[derive(Default)]
pub struct SynthesizerBuilder {
    transport: Option<Arc<dyn Transport>>,
    base_url: Option<String>,
    connect_timeout: Option<Duration>,
    store: Option<Arc<dyn CredentialStore>>,
    env_key: Option<Option<String>>,
    guidance_model: Option<String>,
    base_backoff: Option<Duration>,
}

impl SynthesizerBuilder {
    /// Replaces the HTTP transport, e.g. with an in-memory fake.
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// API origin for the default HTTP transport. Ignored with [`transport`](Self::transport).
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Connection timeout for the default HTTP transport.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Where credentials are persisted. Defaults to [`JsonFileStore::default_location`].
    #[must_use]
    pub fn store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Uses this value instead of reading `GEMINI_API_KEY` at build time.
    ///
    /// Placeholder values are discarded the same way as environment values.
    #[must_use]
    pub fn environment_key(mut self, key: Option<String>) -> Self {
        self.env_key = Some(key);
        self
    }

    /// Text model asked for voice guidance during simulation.
    #[must_use]
    pub fn guidance_model(mut self, model: impl Into<String>) -> Self {
        self.guidance_model = Some(model.into());
        self
    }

    /// First retry delay; later retries double it.
    #[must_use]
    pub const fn base_backoff(mut self, base_backoff: Duration) -> Self {
        self.base_backoff = Some(base_backoff);
        self
    }

    /// Builds the synthesizer.
    ///
    /// # Errors
    ///
    /// Returns [`TtsError::ClientBuild`] if the HTTP client cannot be created,
    /// or [`TtsError::Store`] if no store was given and the platform has no
    /// config directory.
    pub fn build(self) -> Result<Synthesizer, TtsError> {
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => {
                let mut builder = HttpTransport::builder();
                if let Some(base_url) = self.base_url {
                    builder = builder.base_url(base_url);
                }
                if let Some(connect_timeout) = self.connect_timeout {
                    builder = builder.connect_timeout(connect_timeout);
                }
                Arc::new(builder.build()?)
            }
        };

        let store: Arc<dyn CredentialStore> = match self.store {
            Some(store) => store,
            None => Arc::new(JsonFileStore::default_location()?),
        };

        let env_key = self
            .env_key
            .unwrap_or_else(|| std::env::var(API_KEY_ENV).ok());

        Ok(Synthesizer {
            transport,
            store,
            env_key: usable_env_key(env_key),
            guidance_model: self
                .guidance_model
                .unwrap_or_else(|| GUIDANCE_MODEL_ID.to_string()),
            base_backoff: self.base_backoff.unwrap_or(RetryPolicy::DEFAULT_BASE_BACKOFF),
        })
    }
}

/// Steps of the fallback chain.
#[derive(Debug)]
enum Stage {
    /// Call a TTS model; `fallback` marks the Flash retry after a Pro rate limit.
    Attempt { model: TtsModel, fallback: bool },
    Simulate(SimulationReason),
    Finished(SpeechOutcome),
}

/// A request that passed credential and project validation.
struct Prepared<'a> {
    request: &'a SpeechRequest,
    api_key: String,
    policy: RetryPolicy,
}

impl Prepared<'_> {
    fn call(&self, model: TtsModel) -> SpeechCall<'_> {
        SpeechCall {
            model,
            api_key: &self.api_key,
            text: self.request.text(),
            voice_name: self.request.voice_name(),
            temperature: self.request.temperature(),
            billing: BillingContext {
                paid_tier: self.request.paid_tier(),
                project: self.billing_project(),
            },
            timeout: self.request.timeout(),
        }
    }

    /// Billing project, only meaningful on the paid tier.
    fn billing_project(&self) -> Option<&str> {
        self.request
            .billing_project()
            .filter(|_| self.request.paid_tier())
    }
}

impl Synthesizer {
    #[must_use]
    pub fn builder() -> SynthesizerBuilder {
        SynthesizerBuilder::default()
    }

    /// Synthesizer with the HTTP transport and the default credential file.
    ///
    /// # Errors
    ///
    /// See [`SynthesizerBuilder::build`].
    pub fn new() -> Result<Self, TtsError> {
        Self::builder().build()
    }

    /// Produces speech for `request`, or a placeholder and an explanation.
    ///
    /// Never fails: every error ends in silence or the simulation tone, with
    /// the reason in [`SpeechOutcome::status`]. A rate-limited Pro request on
    /// the free tier is retried once on Flash when the request allows it.
    pub async fn generate(&self, request: &SpeechRequest) -> SpeechOutcome {
        let prepared = match self.prepare(request) {
            Ok(prepared) => prepared,
            Err(outcome) => return outcome,
        };

        let mut stage = Stage::Attempt {
            model: request.model(),
            fallback: false,
        };

        loop {
            stage = match stage {
                Stage::Attempt { model, fallback } => self.attempt(&prepared, model, fallback).await,
                Stage::Simulate(reason) => Stage::Finished(self.simulate(&prepared, reason).await),
                Stage::Finished(outcome) => return outcome,
            };
        }
    }

    fn prepare<'a>(&self, request: &'a SpeechRequest) -> Result<Prepared<'a>, SpeechOutcome> {
        if let Some(key) = request.api_key_override() {
            self.persist_override(key, request);
        }

        let Some((api_key, source)) = resolve_api_key(
            request.api_key_override(),
            self.env_key.as_deref(),
            || self.stored_key(),
        ) else {
            warn!("No API key in request, environment or credential store");
            return Err(SpeechOutcome::placeholder(status::missing_credential()));
        };

        if let Err(TtsError::CredentialMalformed { preview, length }) = validate_key_format(&api_key) {
            warn!("Rejecting malformed API key {preview}... (length: {length})");
            return Err(SpeechOutcome::placeholder(status::malformed_credential(
                &preview, length,
            )));
        }

        if request.paid_tier()
            && let Some(project) = request.billing_project()
            && let Err(e) = validate_billing_project(project)
        {
            warn!("{e}");
            return Err(SpeechOutcome::placeholder(status::malformed_billing_project(
                project,
            )));
        }

        log_request(request, &api_key, source);

        let policy = request.retry_policy().with_base_backoff(self.base_backoff);
        Ok(Prepared {
            request,
            api_key,
            policy,
        })
    }

    fn persist_override(&self, key: &str, request: &SpeechRequest) {
        info!("Using provided API key: {}", mask_key(key));
        let record = CredentialRecord {
            api_key: Some(key.to_string()),
            use_paid_tier: request.paid_tier(),
            billing_project_id: request.billing_project().map(String::from),
        };
        if let Err(e) = self.store.save(&record) {
            warn!("Could not persist API key: {e}");
        }
    }

    fn stored_key(&self) -> Option<String> {
        match self.store.load() {
            Ok(record) => record.api_key,
            Err(e) => {
                warn!("Could not read credential store, treating it as empty: {e}");
                None
            }
        }
    }

    async fn attempt(&self, prepared: &Prepared<'_>, model: TtsModel, fallback: bool) -> Stage {
        let request = prepared.request;
        match synthesize_with_retry(self.transport.as_ref(), &prepared.call(model), prepared.policy)
            .await
        {
            Ok(audio) => {
                let status = if fallback {
                    status::fallback_success(request.voice_name())
                } else {
                    status::success(&SuccessReport {
                        model,
                        voice_name: request.voice_name(),
                        prompt: request.text(),
                        paid_tier: request.paid_tier(),
                        samples: audio.len(),
                        show_voice_info: request.show_voice_info(),
                    })
                };
                info!("{model} produced {} samples", audio.len());
                Stage::Finished(SpeechOutcome::synthesized(audio, status, model))
            }
            Err(error) => {
                warn!("{model} failed: {error}");
                route_failure(prepared, model, fallback, &error)
            }
        }
    }

    async fn simulate(&self, prepared: &Prepared<'_>, reason: SimulationReason) -> SpeechOutcome {
        let request = prepared.request;
        let voice_name = request.voice_name();
        info!("Falling back to voice simulation ({reason:?}) via {}", self.guidance_model);

        let prompt = guidance_prompt(voice_name, request.text(), request.temperature(), reason);
        match request_guidance(
            self.transport.as_ref(),
            &self.guidance_model,
            &prepared.api_key,
            &prompt,
            request.temperature(),
            request.timeout(),
        )
        .await
        {
            Ok(guidance) => {
                let tone = AudioBuffer::placeholder_tone(simulated_duration_secs(request.text()));
                SpeechOutcome::simulated(tone, status::simulated(reason, voice_name, &guidance))
            }
            Err(e) => {
                warn!("Guidance call failed: {e}");
                SpeechOutcome::placeholder(status::system_failure(&e.to_string(), voice_name))
            }
        }
    }
}

/// Picks the next stage after `model` failed with `error`.
fn route_failure(prepared: &Prepared<'_>, model: TtsModel, fallback: bool, error: &TtsError) -> Stage {
    let request = prepared.request;
    let retry_delay = request.retry_delay_secs();
    let kind = error.failure_kind();

    if fallback {
        return match kind {
            FailureKind::RateLimit => Stage::Simulate(SimulationReason::BothModelsExhausted),
            _ => finished(status::generic_failure(
                BOTH_MODELS_LABEL,
                &error.to_string(),
                retry_delay,
            )),
        };
    }

    match kind {
        FailureKind::RateLimit => {
            if request.paid_tier() {
                finished(status::paid_rate_limit(
                    model,
                    prepared.billing_project(),
                    retry_delay,
                ))
            } else if model == TtsModel::Flash {
                Stage::Simulate(SimulationReason::BothModelsExhausted)
            } else if request.flash_fallback() {
                info!("{model} rate limited, retrying once on {}", TtsModel::Flash);
                Stage::Attempt {
                    model: TtsModel::Flash,
                    fallback: true,
                }
            } else {
                finished(status::free_quota_exceeded(model, retry_delay))
            }
        }
        FailureKind::InvalidCredential => Stage::Simulate(SimulationReason::PreviewAccess),
        FailureKind::BillingPermission => {
            let issue = match error {
                TtsError::BillingPermissionDenied { issue, .. } => *issue,
                _ => BillingIssue::Configuration,
            };
            finished(status::billing_failure(
                issue,
                request.paid_tier(),
                prepared.billing_project(),
                &error.to_string(),
            ))
        }
        FailureKind::Generic => finished(status::generic_failure(
            model.as_str(),
            &error.to_string(),
            retry_delay,
        )),
    }
}

fn finished(status: String) -> Stage {
    Stage::Finished(SpeechOutcome::placeholder(status))
}

fn log_request(request: &SpeechRequest, api_key: &str, source: KeySource) {
    let prompt_preview: String = request.text().chars().take(PROMPT_PREVIEW_CHARS).collect();
    let tier = match (request.paid_tier(), request.billing_project()) {
        (true, Some(project)) => {
            let project: String = project.chars().take(PROJECT_PREVIEW_CHARS).collect();
            format!("Paid Tier (Project: {project}...)")
        }
        (true, None) => "Paid Tier".to_string(),
        (false, _) => "Free Tier".to_string(),
    };

    info!(
        "Generating TTS: model={}, voice={} -> {}, temperature={}",
        request.model(),
        request.voice(),
        request.voice_name(),
        request.temperature()
    );
    info!("Prompt: {prompt_preview}...");
    info!(
        "API key ({source:?}, partial): {} (length: {})",
        mask_key(api_key),
        api_key.chars().count()
    );
    info!(
        "Billing: {tier}; {}",
        pricing::estimate_summary(request.text(), request.model(), request.paid_tier())
    );
    if request.show_voice_info()
        && let Some(description) = crate::voices::voice_description(request.voice_name())
    {
        info!("Voice {}: {description}", request.voice());
    }
}
