use async_trait::async_trait;
use reqwest::Client;

use crate::{error::TtsError, http_client::http_client, types::SynthesisRequest};

use super::SynthesisProvider;

const DEFAULT_STREAMLABS_URL: &str = "https://streamlabs.com";

/// Streamlabs relay provider
///
/// Two-step synthesis: submit the job to the speak endpoint, then
/// fetch the audio from the URL it returns.
pub struct StreamlabsProvider {
    client: Client,
    base_url: String,
}

impl StreamlabsProvider {
    pub fn new(base_url: Option<String>) -> Self {
        let client = http_client();
        let base_url = base_url.unwrap_or_else(|| DEFAULT_STREAMLABS_URL.to_string());

        Self { client, base_url }
    }
}

#[derive(serde::Deserialize)]
struct SpeakResponse {
    #[serde(default)]
    success: bool,
    speak_url: Option<String>,
    error: Option<String>,
}

#[derive(serde::Deserialize)]
struct AudioErrorBody {
    error: Option<String>,
}

#[async_trait]
impl SynthesisProvider for StreamlabsProvider {
    async fn synthesize(&self, request: &SynthesisRequest) -> crate::error::Result<Vec<u8>> {
        let url = format!("{}/polly/speak", self.base_url);

        tracing::debug!(
            voice = request.voice_id(),
            input_len = request.text().len(),
            "Streamlabs speak request"
        );

        let response = self
            .client
            .post(&url)
            .header(http::header::REFERER, self.base_url.clone())
            .form(&[("voice", request.voice_id()), ("text", request.text())])
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Streamlabs request failed: {e}");
                TtsError::UpstreamUnavailable("Failed to reach Streamlabs.".to_string())
            })?;

        let status = response.status();

        if status.as_u16() >= 400 {
            tracing::error!("Streamlabs speak endpoint returned {status}");
            return Err(TtsError::UpstreamUnavailable(format!(
                "Streamlabs request failed with status {}.",
                status.as_u16()
            )));
        }

        let parsed: SpeakResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Streamlabs speak response: {e}");
            TtsError::UpstreamMalformed("Unexpected Streamlabs response format.".to_string())
        })?;

        let speak_url = match (parsed.success, parsed.speak_url) {
            (true, Some(speak_url)) => speak_url,
            _ => {
                let message = parsed
                    .error
                    .unwrap_or_else(|| "Streamlabs did not return audio URL.".to_string());
                tracing::error!("Streamlabs speak job failed: {message}");
                return Err(TtsError::UpstreamUnavailable(message));
            }
        };

        let audio_response = self.client.get(&speak_url).send().await.map_err(|e| {
            tracing::error!("Streamlabs audio fetch failed: {e}");
            TtsError::UpstreamUnavailable("Failed to fetch Streamlabs audio output.".to_string())
        })?;

        let audio_status = audio_response.status();

        // The audio endpoint reports some failures as a 200 carrying a
        // JSON error body, so the content type has to be checked before
        // the bytes can be trusted as audio.
        let content_type = audio_response
            .headers()
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let audio = audio_response.bytes().await.map_err(|e| {
            tracing::error!("Failed to read Streamlabs audio body: {e}");
            TtsError::UpstreamUnavailable("Failed to fetch Streamlabs audio output.".to_string())
        })?;

        if audio_status.as_u16() >= 400 || audio.is_empty() {
            tracing::error!("Streamlabs audio fetch returned {audio_status} with {} bytes", audio.len());
            return Err(TtsError::UpstreamUnavailable(
                "Failed to fetch Streamlabs audio output.".to_string(),
            ));
        }

        if content_type.contains("application/json") {
            let message = serde_json::from_slice::<AudioErrorBody>(&audio)
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| "Streamlabs audio endpoint returned JSON.".to_string());
            tracing::error!("Streamlabs audio endpoint returned JSON: {message}");
            return Err(TtsError::UpstreamMalformed(message));
        }

        tracing::debug!("Streamlabs synthesis complete, {} bytes", audio.len());

        Ok(audio.to_vec())
    }

    fn name(&self) -> &'static str {
        "streamlabs"
    }
}
