pub mod google;
pub mod polly;
pub mod streamlabs;

use async_trait::async_trait;
use murmur_config::DefaultProvider;

use crate::{error::Result, types::SynthesisRequest};

/// Trait for speech synthesis backends
#[async_trait]
pub trait SynthesisProvider: Send + Sync {
    /// Synthesize text into MP3-encoded audio bytes
    ///
    /// One attempt per request; retries are a caller-level policy.
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>>;

    /// Provider name for logs
    fn name(&self) -> &'static str;
}

/// Which backend serves a given voice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Google Cloud TTS neural voices
    Google,
    /// AWS Polly
    Polly,
    /// Streamlabs relay
    Streamlabs,
}

/// Classify a voice identifier to a provider
///
/// Pure function of the voice and the configured default: voices that
/// follow the wavenet naming convention go to Google, everything else
/// to the configured default provider.
pub fn classify(voice_id: &str, default_provider: DefaultProvider) -> ProviderKind {
    if voice_id.to_ascii_lowercase().contains("wavenet") {
        ProviderKind::Google
    } else {
        match default_provider {
            DefaultProvider::Polly => ProviderKind::Polly,
            DefaultProvider::Streamlabs => ProviderKind::Streamlabs,
        }
    }
}
