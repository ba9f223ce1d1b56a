//! Language and task selection
//!
//! The speech model only translates into English, so every other target
//! language needs a secondary translation pass over the native output.

use crate::types::{LanguageCode, OutputLanguage, Task};

/// Pick the native task for a request
///
/// An explicit task always wins. Otherwise the model translates natively
/// exactly when English output is requested from non-English input.
pub fn resolve_task(explicit: Option<Task>, input: Option<&LanguageCode>, output: &OutputLanguage) -> Task {
    if let Some(task) = explicit {
        return task;
    }

    match output.language() {
        Some(target) if target.is_english() && input != Some(target) => Task::Translate,
        _ => Task::Transcribe,
    }
}

/// What to do with the native model output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationPlan {
    /// The native output already is in the requested language
    Keep,
    /// Run a secondary translation
    Translate { source: LanguageCode, target: LanguageCode },
    /// A translation is wanted but the spoken language is unknown
    UnknownSource { target: LanguageCode },
}

/// Decide whether the native output needs a secondary translation
///
/// The native output is English after a `translate` task, and otherwise in
/// the spoken language: the requested input language, or the one the model
/// detected. A translation is planned whenever the target differs from it.
pub fn plan_translation(
    task: Task,
    input: Option<&LanguageCode>,
    detected: Option<&LanguageCode>,
    output: &OutputLanguage,
) -> TranslationPlan {
    let Some(target) = output.language() else {
        return TranslationPlan::Keep;
    };

    if input == Some(target) {
        return TranslationPlan::Keep;
    }

    let native = match task {
        Task::Translate => Some(LanguageCode::english()),
        Task::Transcribe => input.or(detected).cloned(),
    };

    match native {
        Some(source) if source == *target => TranslationPlan::Keep,
        Some(source) => TranslationPlan::Translate {
            source,
            target: target.clone(),
        },
        None => TranslationPlan::UnknownSource { target: target.clone() },
    }
}
