use murmur_cache::AudioCache;
use murmur_config::{Config, DefaultProvider};
use murmur_quota::{DayUsage, QuotaLimits, RejectReason, Reservation, UsageLedger};

use crate::{
    error::{Result, TtsError},
    provider::{
        ProviderKind, SynthesisProvider, classify, google::GoogleProvider, polly::PollyProvider,
        streamlabs::StreamlabsProvider,
    },
    types::{CacheStatus, SpeechResponse, SynthesisRequest},
};

/// Gateway state: audio cache, usage ledger, and the provider set
///
/// Owned by the server for the process lifetime and shared across
/// request tasks behind an `Arc`; no component holds global state.
pub struct Gateway {
    cache: AudioCache,
    ledger: UsageLedger,
    default_provider: DefaultProvider,
    google: Option<Box<dyn SynthesisProvider>>,
    polly: Option<Box<dyn SynthesisProvider>>,
    streamlabs: Box<dyn SynthesisProvider>,
}

impl Gateway {
    /// Build the gateway from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the cache directory cannot be opened
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let cache = AudioCache::open(&config.cache.dir, config.cache.max_size_bytes)
            .await
            .map_err(|e| anyhow::anyhow!("failed to open audio cache: {e}"))?;

        let ledger = UsageLedger::open(
            &config.quota.ledger_path,
            QuotaLimits {
                daily_requests: config.quota.daily_request_limit,
                daily_chars: config.quota.daily_char_limit,
            },
        )
        .await;

        let google = config
            .tts
            .google
            .as_ref()
            .map(|google_config| {
                tracing::debug!("initializing Google TTS provider");
                Box::new(GoogleProvider::new(
                    google_config.api_key.clone(),
                    google_config.base_url.clone(),
                )) as Box<dyn SynthesisProvider>
            });

        let polly = match &config.tts.polly {
            Some(polly_config) => {
                tracing::debug!(region = polly_config.region, "initializing Polly provider");
                Some(Box::new(PollyProvider::new(polly_config.region.clone()).await) as Box<dyn SynthesisProvider>)
            }
            None => None,
        };

        let streamlabs =
            Box::new(StreamlabsProvider::new(config.tts.streamlabs.base_url.clone())) as Box<dyn SynthesisProvider>;

        Ok(Self::new(
            cache,
            ledger,
            config.tts.default_provider,
            google,
            polly,
            streamlabs,
        ))
    }

    fn new(
        cache: AudioCache,
        ledger: UsageLedger,
        default_provider: DefaultProvider,
        google: Option<Box<dyn SynthesisProvider>>,
        polly: Option<Box<dyn SynthesisProvider>>,
        streamlabs: Box<dyn SynthesisProvider>,
    ) -> Self {
        Self {
            cache,
            ledger,
            default_provider,
            google,
            polly,
            streamlabs,
        }
    }

    /// Serve a validated synthesis request
    ///
    /// Strictly sequential: cache lookup, quota reservation, provider
    /// dispatch, cache write-back. A hit consumes no quota. Two
    /// concurrent misses for the same pair may both pay the provider
    /// cost; the idempotent store makes the second write-back a no-op.
    pub async fn synthesize(&self, request: &SynthesisRequest) -> Result<SpeechResponse> {
        match self.cache.lookup(request.text(), request.voice_id()).await {
            Ok(Some(audio)) => {
                self.ledger.record_cache_hit().await;
                return Ok(SpeechResponse {
                    audio,
                    cache_status: CacheStatus::Hit,
                });
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "cache lookup failed, treating as miss");
            }
        }

        match self.ledger.reserve(request.char_count()).await {
            Reservation::Admitted => {}
            Reservation::Rejected(RejectReason::RequestsExceeded) => return Err(TtsError::DailyRequestsExceeded),
            Reservation::Rejected(RejectReason::CharsExceeded) => return Err(TtsError::DailyCharsExceeded),
        }

        let provider = self.provider_for(request.voice_id())?;

        tracing::debug!(
            provider = provider.name(),
            voice = request.voice_id(),
            chars = request.char_count(),
            "dispatching synthesis"
        );

        let audio = provider.synthesize(request).await?;

        // Write-back failure downgrades cache durability, never the response
        if let Err(e) = self.cache.store(request.text(), request.voice_id(), &audio).await {
            tracing::warn!(error = %e, "failed to cache synthesized audio");
        }

        Ok(SpeechResponse {
            audio,
            cache_status: CacheStatus::Miss,
        })
    }

    /// All day usage records, oldest first
    pub async fn usage_report(&self) -> Vec<DayUsage> {
        self.ledger.report().await
    }

    fn provider_for(&self, voice_id: &str) -> Result<&dyn SynthesisProvider> {
        match classify(voice_id, self.default_provider) {
            ProviderKind::Google => self.google.as_deref().ok_or_else(|| {
                TtsError::UpstreamRejected(format!("no neural provider configured for voice '{voice_id}'"))
            }),
            ProviderKind::Polly => self
                .polly
                .as_deref()
                .ok_or_else(|| TtsError::UpstreamRejected(format!("Polly is not configured for voice '{voice_id}'"))),
            ProviderKind::Streamlabs => Ok(self.streamlabs.as_ref()),
        }
    }
}
