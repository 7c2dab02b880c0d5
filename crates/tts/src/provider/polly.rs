use async_trait::async_trait;
use aws_sdk_polly::error::ProvideErrorMetadata;
use aws_sdk_polly::types::{Engine, OutputFormat, VoiceId};

use crate::{error::TtsError, types::SynthesisRequest};

use super::SynthesisProvider;

/// AWS Polly provider (standard engine, MP3 output)
pub struct PollyProvider {
    client: aws_sdk_polly::Client,
}

impl PollyProvider {
    /// Build a Polly client for the configured region
    ///
    /// Credentials come from the ambient AWS credential chain.
    pub async fn new(region: String) -> Self {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(region))
            .load()
            .await;

        Self {
            client: aws_sdk_polly::Client::new(&config),
        }
    }
}

#[async_trait]
impl SynthesisProvider for PollyProvider {
    async fn synthesize(&self, request: &SynthesisRequest) -> crate::error::Result<Vec<u8>> {
        tracing::debug!(
            voice = request.voice_id(),
            input_len = request.text().len(),
            "Polly request"
        );

        let output = self
            .client
            .synthesize_speech()
            .text(request.text())
            .output_format(OutputFormat::Mp3)
            .voice_id(VoiceId::from(request.voice_id()))
            .engine(Engine::Standard)
            .send()
            .await
            .map_err(|e| {
                // An unknown voice surfaces as a ValidationException
                if e.code() == Some("ValidationException") {
                    tracing::warn!(voice = request.voice_id(), "Polly rejected voice");
                    TtsError::UpstreamRejected(format!("Polly rejected voice '{}'", request.voice_id()))
                } else {
                    tracing::error!("Polly request failed: {}", aws_sdk_polly::error::DisplayErrorContext(&e));
                    TtsError::UpstreamUnavailable("Polly request failed.".to_string())
                }
            })?;

        let audio = output
            .audio_stream
            .collect()
            .await
            .map_err(|e| {
                tracing::error!("Failed to read Polly audio stream: {e}");
                TtsError::UpstreamUnavailable("Failed to read Polly audio stream.".to_string())
            })?
            .into_bytes()
            .to_vec();

        if audio.is_empty() {
            tracing::error!("Polly returned an empty audio stream");
            return Err(TtsError::UpstreamMalformed("Polly returned no audio stream.".to_string()));
        }

        tracing::debug!("Polly synthesis complete, {} bytes", audio.len());

        Ok(audio)
    }

    fn name(&self) -> &'static str {
        "polly"
    }
}
