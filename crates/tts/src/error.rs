use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TtsError>;

/// Gateway errors with their client-facing HTTP mapping
///
/// Upstream variants are produced at the provider boundary with an
/// already-curated message; raw provider payloads and status codes
/// never reach the client through any other path.
#[derive(Debug, Error)]
pub enum TtsError {
    /// Request arrived without a usable text parameter
    #[error("missing 'text' query parameter")]
    MissingText,

    /// Text is over the 300 character ceiling
    #[error("text length exceeds the character limit")]
    TextTooLong,

    /// Voice identifier is over the 50 character ceiling
    #[error("voice ID length exceeds the character limit")]
    VoiceTooLong,

    /// Daily request ceiling reached
    #[error("daily request limit exceeded")]
    DailyRequestsExceeded,

    /// Daily character ceiling reached
    #[error("daily character limit exceeded")]
    DailyCharsExceeded,

    /// Provider rejected the voice or parameters
    #[error("upstream rejected request: {0}")]
    UpstreamRejected(String),

    /// Provider unreachable or answered with a failure status
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Provider answered with something that is not audio
    #[error("upstream response malformed: {0}")]
    UpstreamMalformed(String),

    /// Unexpected internal failure
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl TtsError {
    /// HTTP status code for this error
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingText | Self::TextTooLong | Self::VoiceTooLong | Self::UpstreamRejected(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::DailyRequestsExceeded | Self::DailyCharsExceeded => StatusCode::TOO_MANY_REQUESTS,
            Self::UpstreamUnavailable(_) | Self::UpstreamMalformed(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to expose to API consumers
    pub fn client_message(&self) -> String {
        match self {
            Self::MissingText => "Missing 'text' query parameter".to_owned(),
            Self::TextTooLong => "Text length exceeds 300 characters limit.".to_owned(),
            Self::VoiceTooLong => "Voice ID length exceeds 50 characters limit.".to_owned(),
            Self::DailyRequestsExceeded => "Daily request limit exceeded. Try again tomorrow.".to_owned(),
            Self::DailyCharsExceeded => "Daily character processing limit exceeded. Try again tomorrow.".to_owned(),
            Self::UpstreamRejected(_) => "Invalid voice ID or parameters.".to_owned(),
            Self::UpstreamUnavailable(message) | Self::UpstreamMalformed(message) => message.clone(),
            Self::Internal(_) => "Internal Server Error".to_owned(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for TtsError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = ErrorBody {
            error: self.client_message(),
        };

        (status, Json(body)).into_response()
    }
}
