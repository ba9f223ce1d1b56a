//! Metric names and recording helpers

use std::time::Instant;

use opentelemetry::metrics::Histogram;

/// Record the time elapsed since `start` in seconds
pub fn record_duration(histogram: &Histogram<f64>, start: Instant, attributes: &[opentelemetry::KeyValue]) {
    histogram.record(start.elapsed().as_secs_f64(), attributes);
}

/// Completed `/transcribe` requests, tagged with `outcome` and `task`
pub const TRANSCRIPTION_REQUEST_COUNT: &str = "transcription.request.count";
/// Wall-clock time spent inside the speech model
pub const TRANSCRIPTION_INFERENCE_DURATION: &str = "transcription.inference.duration";
/// Secondary translation attempts
pub const TRANSLATION_REQUEST_COUNT: &str = "translation.request.count";
/// Secondary translations that degraded to the untranslated text
pub const TRANSLATION_FALLBACK_COUNT: &str = "translation.fallback.count";
