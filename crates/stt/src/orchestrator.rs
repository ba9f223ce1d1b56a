//! Per-request transcription pipeline
//!
//! Upload → scoped temp file → speech model → optional secondary
//! translation → response. The orchestrator owns the only process-wide
//! state: the model handle, the translator handle and the inference
//! semaphore.

use std::{sync::Arc, time::Duration, time::Instant};

use scribe_telemetry::{Counter, Histogram, KeyValue, metrics};
use tokio::sync::Semaphore;

use crate::{
    audio::{ScopedAudioFile, extension_for},
    error::{Result, TranscriptionError},
    model::SpeechModel,
    policy::{TranslationPlan, plan_translation, resolve_task},
    translation::Translator,
    types::{
        LanguageCode, ModelOptions, ModelResult, Segment, Task, TranscriptionRequest, TranscriptionResponse,
    },
};

struct Metrics {
    requests: Counter<u64>,
    inference_duration: Histogram<f64>,
    translations: Counter<u64>,
    translation_fallbacks: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = scribe_telemetry::meter();

        Self {
            requests: meter
                .u64_counter(metrics::TRANSCRIPTION_REQUEST_COUNT)
                .with_description("Completed transcription requests")
                .build(),
            inference_duration: meter
                .f64_histogram(metrics::TRANSCRIPTION_INFERENCE_DURATION)
                .with_description("Time spent inside the speech model")
                .with_unit("s")
                .build(),
            translations: meter
                .u64_counter(metrics::TRANSLATION_REQUEST_COUNT)
                .with_description("Secondary translation attempts")
                .build(),
            translation_fallbacks: meter
                .u64_counter(metrics::TRANSLATION_FALLBACK_COUNT)
                .with_description("Translations that fell back to the untranslated text")
                .build(),
        }
    }
}

/// Runs transcription requests against a shared speech model
pub struct Orchestrator {
    model: Arc<dyn SpeechModel>,
    translator: Option<Arc<dyn Translator>>,
    inference_permits: Semaphore,
    inference_timeout: Option<Duration>,
    default_language: Option<LanguageCode>,
    metrics: Metrics,
}

/// Builder for [`Orchestrator`]
pub struct OrchestratorBuilder {
    model: Arc<dyn SpeechModel>,
    translator: Option<Arc<dyn Translator>>,
    max_concurrent_inferences: usize,
    inference_timeout: Option<Duration>,
    default_language: Option<LanguageCode>,
}

impl OrchestratorBuilder {
    pub fn new(model: Arc<dyn SpeechModel>) -> Self {
        Self {
            model,
            translator: None,
            max_concurrent_inferences: 1,
            inference_timeout: None,
            default_language: None,
        }
    }

    /// Enable secondary translation
    #[must_use]
    pub fn translator(mut self, translator: Option<Arc<dyn Translator>>) -> Self {
        self.translator = translator;
        self
    }

    /// Number of model invocations allowed to run at once (at least one)
    #[must_use]
    pub fn max_concurrent_inferences(mut self, permits: usize) -> Self {
        self.max_concurrent_inferences = permits.max(1);
        self
    }

    #[must_use]
    pub const fn inference_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.inference_timeout = timeout;
        self
    }

    /// Spoken language assumed when a request names none
    #[must_use]
    pub fn default_language(mut self, language: Option<LanguageCode>) -> Self {
        self.default_language = language;
        self
    }

    pub fn build(self) -> Orchestrator {
        Orchestrator {
            model: self.model,
            translator: self.translator,
            inference_permits: Semaphore::new(self.max_concurrent_inferences),
            inference_timeout: self.inference_timeout,
            default_language: self.default_language,
            metrics: Metrics::new(),
        }
    }
}

impl Orchestrator {
    pub fn builder(model: Arc<dyn SpeechModel>) -> OrchestratorBuilder {
        OrchestratorBuilder::new(model)
    }

    /// Transcribe one upload, translating the text when requested
    ///
    /// # Errors
    ///
    /// Fails when the temp file cannot be written or removed, or when the
    /// speech model fails or times out. Translation failures never fail
    /// the request.
    pub async fn transcribe(&self, request: TranscriptionRequest) -> Result<TranscriptionResponse> {
        let input = request.input_language.clone().or_else(|| self.default_language.clone());
        let task = resolve_task(request.task, input.as_ref(), &request.output_language);

        tracing::debug!(
            task = %task,
            input = input.as_ref().map_or("auto", LanguageCode::as_str),
            output = %request.output_language,
            bytes = request.audio.len(),
            "transcription request"
        );

        let result = self.process(request, input, task).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.error_type(),
        };
        self.metrics.requests.add(
            1,
            &[KeyValue::new("outcome", outcome), KeyValue::new("task", task.to_string())],
        );

        result
    }

    async fn process(
        &self,
        request: TranscriptionRequest,
        input: Option<LanguageCode>,
        task: Task,
    ) -> Result<TranscriptionResponse> {
        let extension = extension_for(request.filename.as_deref());
        let audio = ScopedAudioFile::write(request.audio, &extension).await?;

        let options = ModelOptions::new(task, input.clone());
        let result = self.infer(&audio, &options).await?;

        audio.remove()?;

        let ModelResult {
            text,
            detected_language,
            segments,
        } = result;

        let original = text.trim().to_string();
        let plan = plan_translation(task, input.as_ref(), detected_language.as_ref(), &request.output_language);
        let translation = self.translate(plan, &original).await;

        let segments = if request.timestamps {
            segments.map(|segments| {
                segments
                    .into_iter()
                    .map(|segment| Segment {
                        text: segment.text.trim().to_string(),
                        ..segment
                    })
                    .collect()
            })
        } else {
            None
        };

        let detected_language = detected_language.map(|code| code.to_string());

        Ok(match translation {
            Some(translated) => TranscriptionResponse {
                success: true,
                transcription: translated.clone(),
                original_text: Some(original),
                translated_text: Some(translated),
                translated: true,
                task,
                detected_language,
                segments,
            },
            None => TranscriptionResponse {
                success: true,
                transcription: original,
                original_text: None,
                translated_text: None,
                translated: false,
                task,
                detected_language,
                segments,
            },
        })
    }

    /// Run the model under the inference permit and optional timeout
    async fn infer(&self, audio: &ScopedAudioFile, options: &ModelOptions) -> Result<ModelResult> {
        let _permit = self
            .inference_permits
            .acquire()
            .await
            .map_err(|e| TranscriptionError::Model(format!("inference queue closed: {e}")))?;

        let start = Instant::now();
        let inference = self.model.transcribe(audio.path(), options);

        let result = match self.inference_timeout {
            Some(limit) => tokio::time::timeout(limit, inference)
                .await
                .unwrap_or(Err(TranscriptionError::ModelTimeout(limit))),
            None => inference.await,
        };

        metrics::record_duration(
            &self.metrics.inference_duration,
            start,
            &[
                KeyValue::new("backend", self.model.name().to_string()),
                KeyValue::new("task", options.task.to_string()),
            ],
        );

        if let Err(e) = &result {
            tracing::error!(backend = self.model.name(), "speech model failed: {e}");
        }

        result
    }

    /// Execute a translation plan; `None` keeps the native text
    async fn translate(&self, plan: TranslationPlan, text: &str) -> Option<String> {
        let (source, target) = match plan {
            TranslationPlan::Keep => return None,
            TranslationPlan::UnknownSource { target } => {
                tracing::warn!(%target, "spoken language unknown, skipping translation");
                return None;
            }
            TranslationPlan::Translate { source, target } => (source, target),
        };

        if text.is_empty() {
            tracing::debug!("empty transcript, skipping translation");
            return None;
        }

        let Some(translator) = &self.translator else {
            tracing::debug!(%source, %target, "translation disabled, keeping native text");
            return None;
        };

        let attributes = [
            KeyValue::new("provider", translator.name().to_string()),
            KeyValue::new("langpair", format!("{source}|{target}")),
        ];
        self.metrics.translations.add(1, &attributes);

        match translator.translate(text, &source, &target).await {
            Ok(translated) => Some(translated),
            Err(e) => {
                tracing::warn!(provider = translator.name(), %source, %target, "translation failed, keeping original text: {e}");
                self.metrics.translation_fallbacks.add(1, &attributes);
                None
            }
        }
    }
}
