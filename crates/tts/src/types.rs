use serde::Deserialize;

use crate::error::{Result, TtsError};

/// Raw query parameters of `GET /tts`
#[derive(Debug, Default, Deserialize)]
pub struct SpeechQuery {
    /// Text to synthesize
    pub text: Option<String>,
    /// Voice identifier, defaults to "Brian" when absent
    pub voice: Option<String>,
}

/// A synthesis request that passed validation
///
/// Immutable once constructed; both bounds are enforced before any
/// cache, quota, or provider work happens.
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    text: String,
    voice_id: String,
}

impl SynthesisRequest {
    /// Maximum text length in characters
    pub const MAX_TEXT_CHARS: usize = 300;
    /// Maximum voice identifier length in characters
    pub const MAX_VOICE_CHARS: usize = 50;
    /// Voice used when the query does not name one
    pub const DEFAULT_VOICE: &'static str = "Brian";

    /// Validate raw query parameters into a request
    ///
    /// # Errors
    ///
    /// Returns the matching validation error when text is missing or
    /// empty, or either field is over its character ceiling
    pub fn from_query(query: SpeechQuery) -> Result<Self> {
        let text = query.text.filter(|text| !text.is_empty()).ok_or(TtsError::MissingText)?;

        if text.chars().count() > Self::MAX_TEXT_CHARS {
            return Err(TtsError::TextTooLong);
        }

        let voice_id = query
            .voice
            .filter(|voice| !voice.is_empty())
            .unwrap_or_else(|| Self::DEFAULT_VOICE.to_owned());

        if voice_id.chars().count() > Self::MAX_VOICE_CHARS {
            return Err(TtsError::VoiceTooLong);
        }

        Ok(Self { text, voice_id })
    }

    /// Text to synthesize
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Voice identifier
    pub fn voice_id(&self) -> &str {
        &self.voice_id
    }

    /// Number of characters the request will count against quota
    pub fn char_count(&self) -> u64 {
        self.text.chars().count() as u64
    }
}

/// Whether a response was served from cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    /// Value of the `X-Cache-Status` response header
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Miss => "miss",
        }
    }
}

/// Synthesized audio ready to return to the client
#[derive(Debug)]
pub struct SpeechResponse {
    /// MP3-encoded audio bytes
    pub audio: Vec<u8>,
    /// Whether the audio came from the cache
    pub cache_status: CacheStatus,
}

impl SpeechResponse {
    /// Convert into an HTTP response with audio and cache headers
    pub fn into_response(self) -> axum::response::Response {
        axum::response::Response::builder()
            .header(http::header::CONTENT_TYPE, "audio/mpeg")
            .header("X-Cache-Status", self.cache_status.as_str())
            .body(axum::body::Body::from(self.audio))
            .unwrap_or_else(|_| {
                axum::response::Response::builder()
                    .status(http::StatusCode::INTERNAL_SERVER_ERROR)
                    .body(axum::body::Body::empty())
                    .unwrap()
            })
    }
}
