#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod error;
mod gateway;
mod http_client;
mod provider;
mod types;

use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};

pub use error::{Result, TtsError};
pub use gateway::Gateway;
pub use provider::{ProviderKind, classify};
pub use types::{CacheStatus, SpeechQuery, SpeechResponse, SynthesisRequest};

/// Build the gateway from configuration
pub async fn build_gateway(config: &murmur_config::Config) -> anyhow::Result<Arc<Gateway>> {
    let gateway = Gateway::from_config(config)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize TTS gateway: {e}"))?;
    Ok(Arc::new(gateway))
}

/// Create the endpoint router for speech synthesis
pub fn endpoint_router() -> Router<Arc<Gateway>> {
    Router::new().route("/tts", get(synthesize))
}

/// Handle speech synthesis requests
async fn synthesize(
    State(gateway): State<Arc<Gateway>>,
    Query(query): Query<SpeechQuery>,
) -> Result<axum::response::Response> {
    let request = SynthesisRequest::from_query(query)?;

    tracing::debug!(
        voice = request.voice_id(),
        chars = request.char_count(),
        "speech handler called"
    );

    let response = gateway.synthesize(&request).await?;

    tracing::debug!(cache_status = response.cache_status.as_str(), "speech synthesis complete");

    Ok(response.into_response())
}
