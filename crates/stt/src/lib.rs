#![allow(
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions
)]

mod audio;
mod error;
mod http_client;
pub mod model;
mod orchestrator;
pub mod policy;
mod request;
pub mod translation;
mod types;

use std::{sync::Arc, time::Duration};

use axum::{Json, Router, extract::State, routing::post};

pub use error::{ErrorResponse, Result, TranscriptionError};
pub use orchestrator::{Orchestrator, OrchestratorBuilder};
pub use types::{
    LanguageCode, ModelOptions, ModelResult, OutputLanguage, Segment, Task, TranscriptionRequest,
    TranscriptionResponse,
};
use request::ExtractTranscription;

/// Build the orchestrator from configuration
///
/// Loads the speech model once; failure is fatal to startup.
///
/// # Errors
///
/// Returns an error if the speech model backend cannot be constructed
pub fn build_orchestrator(config: &scribe_config::Config) -> anyhow::Result<Arc<Orchestrator>> {
    let model = model::load(&config.model).map_err(|e| anyhow::anyhow!("Failed to load speech model: {e}"))?;

    let orchestrator = Orchestrator::builder(model)
        .translator(translation::build(&config.translation))
        .max_concurrent_inferences(config.model.max_concurrent_inferences)
        .inference_timeout(config.model.inference_timeout_secs.map(Duration::from_secs))
        .default_language(config.model.default_language.as_deref().and_then(LanguageCode::parse))
        .build();

    Ok(Arc::new(orchestrator))
}

/// Create the endpoint router for transcription
pub fn endpoint_router() -> Router<Arc<Orchestrator>> {
    Router::new().route("/transcribe", post(transcribe))
}

/// Handle transcription requests
async fn transcribe(
    State(orchestrator): State<Arc<Orchestrator>>,
    ExtractTranscription(request): ExtractTranscription,
) -> Result<Json<TranscriptionResponse>> {
    let response = orchestrator.transcribe(request).await?;

    tracing::debug!(
        task = %response.task,
        translated = response.translated,
        chars = response.transcription.chars().count(),
        "transcription complete"
    );

    Ok(Json(response))
}
