//! Mock MyMemory translation API for integration tests

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Json, Router, routing};
use tokio_util::sync::CancellationToken;

/// Mock translator answering `GET /get`
///
/// Translations are rendered as `[<target>] <text>` so tests can tell them
/// apart from the original.
pub struct MockTranslator {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockTranslatorState>,
}

#[derive(Default)]
struct MockTranslatorState {
    fail: bool,
    /// `(q, langpair)` of every request
    calls: Mutex<Vec<(String, String)>>,
}

impl MockTranslator {
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_inner(false).await
    }

    /// Start a translator that answers every request with 500
    pub async fn start_failing() -> anyhow::Result<Self> {
        Self::start_inner(true).await
    }

    async fn start_inner(fail: bool) -> anyhow::Result<Self> {
        let state = Arc::new(MockTranslatorState {
            fail,
            ..MockTranslatorState::default()
        });

        let app = Router::new()
            .route("/get", routing::get(handle_get))
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

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// `(q, langpair)` of every request received
    pub fn calls(&self) -> Vec<(String, String)> {
        self.state.calls.lock().unwrap().clone()
    }
}

impl Drop for MockTranslator {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_get(
    State(state): State<Arc<MockTranslatorState>>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let text = params.get("q").cloned().unwrap_or_default();
    let langpair = params.get("langpair").cloned().unwrap_or_default();

    state.calls.lock().unwrap().push((text.clone(), langpair.clone()));

    if state.fail {
        return (StatusCode::INTERNAL_SERVER_ERROR, "mock translator failure").into_response();
    }

    let target = langpair.split('|').nth(1).unwrap_or_default();

    Json(serde_json::json!({
        "responseData": {"translatedText": format!("[{target}] {text}"), "match": 1},
        "responseStatus": 200,
        "responseDetails": ""
    }))
    .into_response()
}
