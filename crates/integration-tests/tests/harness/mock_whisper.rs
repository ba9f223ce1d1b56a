//! Mock Whisper backend for integration tests
//!
//! Implements the OpenAI audio routes with canned Spanish/English output

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Json, Router, routing};
use tokio_util::sync::CancellationToken;

/// Text returned by the transcriptions route
pub const SPANISH_TEXT: &str = " hola mundo ";
/// Text returned by the translations route
pub const ENGLISH_TEXT: &str = " hello world ";

/// Mock Whisper server recording what it was asked
pub struct MockWhisper {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockWhisperState>,
}

#[derive(Default)]
struct MockWhisperState {
    transcription_count: AtomicU32,
    translation_count: AtomicU32,
    fail: AtomicBool,
    delay: Option<Duration>,
    /// `language` form field of the last request, if any
    last_language: Mutex<Option<String>>,
    last_audio_len: Mutex<usize>,
}

impl MockWhisper {
    /// Start the mock server, returning immediately
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_inner(MockWhisperState::default()).await
    }

    /// Start a mock server that answers every request with 500
    pub async fn start_failing() -> anyhow::Result<Self> {
        let state = MockWhisperState::default();
        state.fail.store(true, Ordering::Relaxed);
        Self::start_inner(state).await
    }

    /// Start a mock server that waits before answering
    pub async fn start_slow(delay: Duration) -> anyhow::Result<Self> {
        Self::start_inner(MockWhisperState {
            delay: Some(delay),
            ..MockWhisperState::default()
        })
        .await
    }

    async fn start_inner(state: MockWhisperState) -> anyhow::Result<Self> {
        let state = Arc::new(state);

        let app = Router::new()
            .route("/v1/audio/transcriptions", routing::post(handle_transcriptions))
            .route("/v1/audio/translations", routing::post(handle_translations))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
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

    /// Base URL for configuring the mock as the model backend
    ///
    /// Includes `/v1` since the backend appends `/audio/...`
    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Number of requests to the transcriptions route
    pub fn transcription_count(&self) -> u32 {
        self.state.transcription_count.load(Ordering::Relaxed)
    }

    /// Number of requests to the translations route
    pub fn translation_count(&self) -> u32 {
        self.state.translation_count.load(Ordering::Relaxed)
    }

    /// Language hint sent with the last request
    pub fn last_language(&self) -> Option<String> {
        self.state.last_language.lock().unwrap().clone()
    }

    /// Size of the last uploaded file
    pub fn last_audio_len(&self) -> usize {
        *self.state.last_audio_len.lock().unwrap()
    }
}

impl Drop for MockWhisper {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn record(state: &MockWhisperState, mut multipart: Multipart) {
    let mut language = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        match field.name().unwrap_or_default() {
            "file" => {
                let bytes = field.bytes().await.unwrap_or_default();
                *state.last_audio_len.lock().unwrap() = bytes.len();
            }
            "language" => language = field.text().await.ok(),
            _ => {}
        }
    }

    *state.last_language.lock().unwrap() = language;

    if let Some(delay) = state.delay {
        tokio::time::sleep(delay).await;
    }
}

fn reply(state: &MockWhisperState, task: &str, text: &str) -> axum::response::Response {
    if state.fail.load(Ordering::Relaxed) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": {"message": "mock whisper failure"}})),
        )
            .into_response();
    }

    Json(serde_json::json!({
        "task": task,
        "language": "spanish",
        "duration": 2.0,
        "text": text,
        "segments": [
            {"id": 0, "start": 0.0, "end": 1.0, "text": " hola "},
            {"id": 1, "start": 1.0, "end": 2.0, "text": " mundo"}
        ]
    }))
    .into_response()
}

async fn handle_transcriptions(
    State(state): State<Arc<MockWhisperState>>,
    multipart: Multipart,
) -> impl IntoResponse {
    state.transcription_count.fetch_add(1, Ordering::Relaxed);
    record(&state, multipart).await;
    reply(&state, "transcribe", SPANISH_TEXT)
}

async fn handle_translations(
    State(state): State<Arc<MockWhisperState>>,
    multipart: Multipart,
) -> impl IntoResponse {
    state.translation_count.fetch_add(1, Ordering::Relaxed);
    record(&state, multipart).await;
    reply(&state, "translate", ENGLISH_TEXT)
}
