use std::fmt;

use axum::body::Bytes;
use serde::{Deserialize, Serialize};

/// Native recognition modes of the speech model
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Task {
    /// Recognize speech in the spoken language
    #[default]
    Transcribe,
    /// Recognize speech and translate it to English
    Translate,
}

impl Task {
    /// Parse a form value, coercing anything unrecognized to [`Task::Transcribe`]
    pub fn coerce(value: &str) -> Self {
        value.trim().parse().unwrap_or_default()
    }
}

/// Normalized language code such as `es` or `en`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageCode(String);

/// Language names Whisper reports in `verbose_json`, with their codes
const MODEL_LANGUAGE_NAMES: &[(&str, &str)] = &[
    ("afrikaans", "af"),
    ("albanian", "sq"),
    ("amharic", "am"),
    ("arabic", "ar"),
    ("armenian", "hy"),
    ("assamese", "as"),
    ("azerbaijani", "az"),
    ("bashkir", "ba"),
    ("basque", "eu"),
    ("belarusian", "be"),
    ("bengali", "bn"),
    ("bosnian", "bs"),
    ("breton", "br"),
    ("bulgarian", "bg"),
    ("cantonese", "yue"),
    ("catalan", "ca"),
    ("chinese", "zh"),
    ("croatian", "hr"),
    ("czech", "cs"),
    ("danish", "da"),
    ("dutch", "nl"),
    ("english", "en"),
    ("estonian", "et"),
    ("faroese", "fo"),
    ("finnish", "fi"),
    ("french", "fr"),
    ("galician", "gl"),
    ("georgian", "ka"),
    ("german", "de"),
    ("greek", "el"),
    ("gujarati", "gu"),
    ("haitian creole", "ht"),
    ("hausa", "ha"),
    ("hawaiian", "haw"),
    ("hebrew", "he"),
    ("hindi", "hi"),
    ("hungarian", "hu"),
    ("icelandic", "is"),
    ("indonesian", "id"),
    ("italian", "it"),
    ("japanese", "ja"),
    ("javanese", "jv"),
    ("kannada", "kn"),
    ("kazakh", "kk"),
    ("khmer", "km"),
    ("korean", "ko"),
    ("lao", "lo"),
    ("latin", "la"),
    ("latvian", "lv"),
    ("lingala", "ln"),
    ("lithuanian", "lt"),
    ("luxembourgish", "lb"),
    ("macedonian", "mk"),
    ("malagasy", "mg"),
    ("malay", "ms"),
    ("malayalam", "ml"),
    ("maltese", "mt"),
    ("maori", "mi"),
    ("marathi", "mr"),
    ("mongolian", "mn"),
    ("myanmar", "my"),
    ("nepali", "ne"),
    ("norwegian", "no"),
    ("nynorsk", "nn"),
    ("occitan", "oc"),
    ("pashto", "ps"),
    ("persian", "fa"),
    ("polish", "pl"),
    ("portuguese", "pt"),
    ("punjabi", "pa"),
    ("romanian", "ro"),
    ("russian", "ru"),
    ("sanskrit", "sa"),
    ("serbian", "sr"),
    ("shona", "sn"),
    ("sindhi", "sd"),
    ("sinhala", "si"),
    ("slovak", "sk"),
    ("slovenian", "sl"),
    ("somali", "so"),
    ("spanish", "es"),
    ("sundanese", "su"),
    ("swahili", "sw"),
    ("swedish", "sv"),
    ("tagalog", "tl"),
    ("tajik", "tg"),
    ("tamil", "ta"),
    ("tatar", "tt"),
    ("telugu", "te"),
    ("thai", "th"),
    ("tibetan", "bo"),
    ("turkish", "tr"),
    ("turkmen", "tk"),
    ("ukrainian", "uk"),
    ("urdu", "ur"),
    ("uzbek", "uz"),
    ("vietnamese", "vi"),
    ("welsh", "cy"),
    ("yiddish", "yi"),
    ("yoruba", "yo"),
    // Alternate names Whisper accepts for the same languages
    ("burmese", "my"),
    ("castilian", "es"),
    ("flemish", "nl"),
    ("haitian", "ht"),
    ("letzeburgesch", "lb"),
    ("mandarin", "zh"),
    ("moldavian", "ro"),
    ("moldovan", "ro"),
    ("panjabi", "pa"),
    ("pushto", "ps"),
    ("sinhalese", "si"),
    ("valencian", "ca"),
];

/// Whisper's nonstandard Javanese code
const WHISPER_JAVANESE: &str = "jw";

impl LanguageCode {
    /// Trim and lower-case `raw`; `None` when blank
    pub fn parse(raw: &str) -> Option<Self> {
        let code = raw.trim().to_ascii_lowercase();
        (!code.is_empty()).then_some(Self(code))
    }

    /// Normalize a language label reported by a speech model
    ///
    /// Accepts plain codes as well as Whisper's English names
    /// (`"spanish"` → `es`). Unknown names yield `None` so they are never
    /// mistaken for a code.
    pub fn from_model_label(label: &str) -> Option<Self> {
        let label = Self::parse(label)?;

        if label.0 == WHISPER_JAVANESE {
            return Some(Self("jv".to_string()));
        }

        if let Some((_, code)) = MODEL_LANGUAGE_NAMES.iter().find(|(name, _)| *name == label.0) {
            return Some(Self((*code).to_string()));
        }

        let looks_like_code = (2..=3).contains(&label.0.len()) && label.0.chars().all(|c| c.is_ascii_lowercase());
        looks_like_code.then_some(label)
    }

    pub fn english() -> Self {
        Self("en".to_string())
    }

    pub fn is_english(&self) -> bool {
        self.0 == "en"
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Requested output language
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputLanguage {
    /// Keep whatever language the model produced
    #[default]
    Same,
    /// Deliver the text in this language
    Language(LanguageCode),
}

impl OutputLanguage {
    /// Parse a form value; absent, blank, and `same` all mean [`OutputLanguage::Same`]
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.and_then(LanguageCode::parse) {
            Some(code) if code.as_str() != "same" => Self::Language(code),
            _ => Self::Same,
        }
    }

    pub const fn language(&self) -> Option<&LanguageCode> {
        match self {
            Self::Same => None,
            Self::Language(code) => Some(code),
        }
    }
}

impl fmt::Display for OutputLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Same => f.write_str("same"),
            Self::Language(code) => code.fmt(f),
        }
    }
}

/// One transcription job, normalized from the upload form
#[derive(Debug, Clone)]
pub struct TranscriptionRequest {
    /// Raw audio payload
    pub audio: Bytes,
    /// Uploaded filename, used to pick the temp file extension
    pub filename: Option<String>,
    /// Spoken language; `None` lets the model auto-detect
    pub input_language: Option<LanguageCode>,
    pub output_language: OutputLanguage,
    /// Explicit native task; derived from the languages when `None`
    pub task: Option<Task>,
    /// Return time-aligned segments
    pub timestamps: bool,
}

impl TranscriptionRequest {
    pub fn new(audio: impl Into<Bytes>) -> Self {
        Self {
            audio: audio.into(),
            filename: None,
            input_language: None,
            output_language: OutputLanguage::Same,
            task: None,
            timestamps: false,
        }
    }

    #[must_use]
    pub fn with_input_language(mut self, code: &str) -> Self {
        self.input_language = LanguageCode::parse(code);
        self
    }

    #[must_use]
    pub fn with_output_language(mut self, raw: &str) -> Self {
        self.output_language = OutputLanguage::parse(Some(raw));
        self
    }

    #[must_use]
    pub const fn with_task(mut self, task: Task) -> Self {
        self.task = Some(task);
        self
    }

    #[must_use]
    pub const fn with_timestamps(mut self) -> Self {
        self.timestamps = true;
        self
    }
}

/// Options handed to the speech model for one inference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelOptions {
    pub task: Task,
    /// Language hint; omitted for auto-detection
    pub language: Option<LanguageCode>,
    /// Always `false`: full precision is used for CPU compatibility
    pub half_precision: bool,
    /// Always `false`: no progress output from the model
    pub verbose: bool,
}

impl ModelOptions {
    pub const fn new(task: Task, language: Option<LanguageCode>) -> Self {
        Self {
            task,
            language,
            half_precision: false,
            verbose: false,
        }
    }
}

/// Time-aligned transcript fragment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start offset in seconds
    pub start: f64,
    /// End offset in seconds
    pub end: f64,
    pub text: String,
}

/// Raw output of the speech model
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelResult {
    pub text: String,
    pub detected_language: Option<LanguageCode>,
    pub segments: Option<Vec<Segment>>,
}

/// Successful `/transcribe` body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionResponse {
    pub success: bool,
    /// Final text, translated when a secondary translation ran
    pub transcription: String,
    /// Model text before translation; only present when translated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,
    /// Translated text; only present when translated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated_text: Option<String>,
    pub translated: bool,
    /// Native task the model ran
    pub task: Task,
    #[serde(rename = "detected_language", default, skip_serializing_if = "Option::is_none")]
    pub detected_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segments: Option<Vec<Segment>>,
}
