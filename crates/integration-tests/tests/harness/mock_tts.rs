//! Mock upstream synthesis backends for integration tests
//!
//! One axum app plays both the Streamlabs relay (speak + audio fetch)
//! and the Google TTS REST endpoint, with scriptable failure modes.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, OnceLock};
use std::sync::atomic::{AtomicU32, Ordering};

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::{Form, Json, Router, routing};
use base64::Engine as _;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

/// Audio bytes the relay serves on success
pub const RELAY_AUDIO: &[u8] = b"relay-mp3-bytes";

/// Audio bytes the Google endpoint serves on success
pub const GOOGLE_AUDIO: &[u8] = b"google-mp3-bytes";

/// Scripted upstream behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Everything succeeds
    Ok,
    /// Synthesis endpoints answer 500
    Fails,
    /// The relay speak step succeeds but the audio fetch returns a
    /// JSON error body with a 200 status
    AudioReturnsJson,
    /// The Google endpoint answers 200 with no audio content
    NoAudioContent,
}

struct MockTtsState {
    behavior: Behavior,
    base_url: OnceLock<String>,
    speak_count: AtomicU32,
    google_count: AtomicU32,
    last_voice: Mutex<Option<String>>,
}

/// Mock upstream that returns predictable responses
pub struct MockTts {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockTtsState>,
}

impl MockTts {
    /// Start the mock server, returning immediately
    pub async fn start(behavior: Behavior) -> anyhow::Result<Self> {
        let state = Arc::new(MockTtsState {
            behavior,
            base_url: OnceLock::new(),
            speak_count: AtomicU32::new(0),
            google_count: AtomicU32::new(0),
            last_voice: Mutex::new(None),
        });

        let app = Router::new()
            .route("/polly/speak", routing::post(handle_speak))
            .route("/audio", routing::get(handle_audio))
            .route("/v1/text:synthesize", routing::post(handle_google))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        state
            .base_url
            .set(format!("http://{addr}"))
            .expect("base URL set exactly once");

        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL of the mock server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of relay speak submissions received
    pub fn speak_count(&self) -> u32 {
        self.state.speak_count.load(Ordering::SeqCst)
    }

    /// Number of Google synthesis calls received
    pub fn google_count(&self) -> u32 {
        self.state.google_count.load(Ordering::SeqCst)
    }

    /// Voice named by the most recent synthesis call
    pub fn last_voice(&self) -> Option<String> {
        self.state.last_voice.lock().unwrap().clone()
    }
}

impl Drop for MockTts {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[derive(Deserialize)]
struct SpeakForm {
    voice: String,
    #[allow(dead_code)]
    text: String,
}

async fn handle_speak(State(state): State<Arc<MockTtsState>>, Form(form): Form<SpeakForm>) -> impl IntoResponse {
    state.speak_count.fetch_add(1, Ordering::SeqCst);
    *state.last_voice.lock().unwrap() = Some(form.voice);

    match state.behavior {
        Behavior::Fails => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": "upstream exploded"})),
        )
            .into_response(),
        _ => {
            let base_url = state.base_url.get().expect("base URL set at startup");
            Json(serde_json::json!({
                "success": true,
                "speak_url": format!("{base_url}/audio"),
            }))
            .into_response()
        }
    }
}

async fn handle_audio(State(state): State<Arc<MockTtsState>>) -> impl IntoResponse {
    if state.behavior == Behavior::AudioReturnsJson {
        (
            [(header::CONTENT_TYPE, "application/json")],
            r#"{"error":"Voice not available right now."}"#,
        )
            .into_response()
    } else {
        ([(header::CONTENT_TYPE, "audio/mpeg")], RELAY_AUDIO).into_response()
    }
}

#[derive(Deserialize)]
struct GoogleRequest {
    voice: GoogleVoice,
}

#[derive(Deserialize)]
struct GoogleVoice {
    name: String,
}

async fn handle_google(
    State(state): State<Arc<MockTtsState>>,
    Json(request): Json<GoogleRequest>,
) -> impl IntoResponse {
    state.google_count.fetch_add(1, Ordering::SeqCst);
    *state.last_voice.lock().unwrap() = Some(request.voice.name);

    match state.behavior {
        Behavior::Fails => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": {"message": "backend error"}})),
        )
            .into_response(),
        Behavior::NoAudioContent => Json(serde_json::json!({})).into_response(),
        _ => {
            let encoded = base64::engine::general_purpose::STANDARD.encode(GOOGLE_AUDIO);
            Json(serde_json::json!({"audioContent": encoded})).into_response()
        }
    }
}
