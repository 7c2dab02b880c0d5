use async_trait::async_trait;
use base64::Engine as _;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};

use crate::{error::TtsError, http_client::http_client, types::SynthesisRequest};

use super::SynthesisProvider;

const DEFAULT_GOOGLE_API_URL: &str = "https://texttospeech.googleapis.com";

/// Google Cloud TTS provider for wavenet voices
pub struct GoogleProvider {
    client: Client,
    base_url: String,
    api_key: SecretString,
}

impl GoogleProvider {
    pub fn new(api_key: SecretString, base_url: Option<String>) -> Self {
        let client = http_client();
        let base_url = base_url.unwrap_or_else(|| DEFAULT_GOOGLE_API_URL.to_string());

        Self {
            client,
            base_url,
            api_key,
        }
    }
}

#[derive(serde::Serialize)]
struct GoogleRequest<'a> {
    input: GoogleInput<'a>,
    voice: GoogleVoice<'a>,
    #[serde(rename = "audioConfig")]
    audio_config: GoogleAudioConfig<'a>,
}

#[derive(serde::Serialize)]
struct GoogleInput<'a> {
    text: &'a str,
}

#[derive(serde::Serialize)]
struct GoogleVoice<'a> {
    #[serde(rename = "languageCode")]
    language_code: &'a str,
    name: &'a str,
}

#[derive(serde::Serialize)]
struct GoogleAudioConfig<'a> {
    #[serde(rename = "audioEncoding")]
    audio_encoding: &'a str,
}

#[derive(serde::Deserialize)]
struct GoogleResponse {
    #[serde(rename = "audioContent")]
    audio_content: Option<String>,
}

#[async_trait]
impl SynthesisProvider for GoogleProvider {
    async fn synthesize(&self, request: &SynthesisRequest) -> crate::error::Result<Vec<u8>> {
        let url = format!(
            "{}/v1/text:synthesize?key={}",
            self.base_url,
            self.api_key.expose_secret()
        );

        tracing::debug!(
            voice = request.voice_id(),
            input_len = request.text().len(),
            "Google TTS request"
        );

        let body = GoogleRequest {
            input: GoogleInput { text: request.text() },
            voice: GoogleVoice {
                language_code: "en-GB",
                name: request.voice_id(),
            },
            audio_config: GoogleAudioConfig { audio_encoding: "MP3" },
        };

        let response = self.client.post(&url).json(&body).send().await.map_err(|e| {
            tracing::error!("Google TTS request failed: {e}");
            TtsError::UpstreamUnavailable("Failed to reach Google TTS.".to_string())
        })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());

            tracing::error!("Google TTS API error ({status}): {error_text}");

            return Err(if status == http::StatusCode::BAD_REQUEST {
                TtsError::UpstreamRejected(error_text)
            } else {
                TtsError::UpstreamUnavailable(format!(
                    "Google TTS request failed with status {}.",
                    status.as_u16()
                ))
            });
        }

        let parsed: GoogleResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Google TTS response: {e}");
            TtsError::UpstreamMalformed("Unexpected Google TTS response format.".to_string())
        })?;

        let encoded = parsed.audio_content.ok_or_else(|| {
            tracing::error!("Google TTS response carried no audio content");
            TtsError::UpstreamMalformed("Google TTS returned no audio content.".to_string())
        })?;

        let audio = base64::engine::general_purpose::STANDARD.decode(encoded).map_err(|e| {
            tracing::error!("Failed to decode Google TTS audio content: {e}");
            TtsError::UpstreamMalformed("Google TTS returned undecodable audio content.".to_string())
        })?;

        tracing::debug!("Google TTS synthesis complete, {} bytes", audio.len());

        Ok(audio)
    }

    fn name(&self) -> &'static str {
        "google"
    }
}
