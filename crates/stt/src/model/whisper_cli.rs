use std::{
    path::{Path, PathBuf},
    process::Stdio,
    time::Duration,
};

use async_trait::async_trait;
use scribe_config::WhisperCliConfig;

use crate::{
    error::TranscriptionError,
    types::{LanguageCode, ModelOptions, ModelResult, Segment, Task},
};

use super::SpeechModel;

/// Lines of stderr kept when the binary fails
const STDERR_TAIL_LINES: usize = 5;

/// whisper.cpp driven through its `whisper-cli` binary
pub(crate) struct WhisperCliModel {
    binary: PathBuf,
    model_path: PathBuf,
    threads: u16,
}

impl WhisperCliModel {
    /// Verify the binary and model file are present
    pub fn new(config: &WhisperCliConfig) -> crate::error::Result<Self> {
        if !config.binary.is_file() {
            return Err(TranscriptionError::Config(format!(
                "whisper-cli binary not found at {}",
                config.binary.display()
            )));
        }

        if !config.model_path.is_file() {
            return Err(TranscriptionError::Config(format!(
                "whisper model not found at {}",
                config.model_path.display()
            )));
        }

        Ok(Self {
            binary: config.binary.clone(),
            model_path: config.model_path.clone(),
            threads: config.threads,
        })
    }
}

#[derive(serde::Deserialize)]
struct CliOutput {
    #[serde(default)]
    result: Option<CliResult>,
    #[serde(default)]
    transcription: Vec<CliSegment>,
}

#[derive(serde::Deserialize)]
struct CliResult {
    #[serde(default)]
    language: Option<String>,
}

#[derive(serde::Deserialize)]
struct CliSegment {
    offsets: CliOffsets,
    text: String,
}

/// Segment bounds in milliseconds
#[derive(serde::Deserialize)]
struct CliOffsets {
    from: u64,
    to: u64,
}

/// Convert the `-oj` JSON document into a model result
///
/// whisper.cpp can split a multi-byte character across segments and write
/// invalid UTF-8, so the document is decoded lossily first.
fn parse_output(raw: &[u8]) -> crate::error::Result<ModelResult> {
    let raw = String::from_utf8_lossy(raw);
    let output: CliOutput = serde_json::from_str(&raw)
        .map_err(|e| TranscriptionError::Model(format!("unreadable whisper-cli output: {e}")))?;

    let text = output.transcription.iter().map(|s| s.text.as_str()).collect::<String>();

    let segments = output
        .transcription
        .into_iter()
        .map(|s| Segment {
            start: Duration::from_millis(s.offsets.from).as_secs_f64(),
            end: Duration::from_millis(s.offsets.to).as_secs_f64(),
            text: s.text,
        })
        .collect();

    Ok(ModelResult {
        text,
        detected_language: output
            .result
            .and_then(|r| r.language)
            .as_deref()
            .and_then(LanguageCode::from_model_label),
        segments: Some(segments),
    })
}

fn stderr_tail(stderr: &[u8]) -> String {
    let stderr = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = stderr.lines().filter(|line| !line.trim().is_empty()).collect();
    lines[lines.len().saturating_sub(STDERR_TAIL_LINES)..].join("\n")
}

#[async_trait]
impl SpeechModel for WhisperCliModel {
    async fn transcribe(&self, audio: &Path, options: &ModelOptions) -> crate::error::Result<ModelResult> {
        let output_dir = tempfile::tempdir()?;
        let output_base = output_dir.path().join("out");

        let mut command = tokio::process::Command::new(&self.binary);
        command
            .arg("-m")
            .arg(&self.model_path)
            .arg("-f")
            .arg(audio)
            .arg("-t")
            .arg(self.threads.to_string())
            .arg("-l")
            .arg(options.language.as_ref().map_or("auto", LanguageCode::as_str))
            .arg("-oj")
            .arg("-of")
            .arg(&output_base)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        if options.task == Task::Translate {
            command.arg("-tr");
        }

        if !options.verbose {
            command.arg("-np");
        }

        tracing::debug!(binary = %self.binary.display(), task = %options.task, "running whisper-cli");

        let output = command.output().await.map_err(|e| {
            TranscriptionError::Model(format!("failed to run {}: {e}", self.binary.display()))
        })?;

        if !output.status.success() {
            let tail = stderr_tail(&output.stderr);
            tracing::error!("whisper-cli exited with {}: {tail}", output.status);
            return Err(TranscriptionError::Model(format!("whisper-cli exited with {}: {tail}", output.status)));
        }

        let json = tokio::fs::read(output_base.with_extension("json")).await?;

        parse_output(&json)
    }

    fn name(&self) -> &str {
        "whisper_cli"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_output() {
        let raw = br#"{
            "systeminfo": "AVX = 1",
            "model": {"type": "medium"},
            "params": {"model": "ggml-medium.bin", "language": "auto", "translate": false},
            "result": {"language": "es"},
            "transcription": [
                {
                    "timestamps": {"from": "00:00:00,000", "to": "00:00:01,500"},
                    "offsets": {"from": 0, "to": 1500},
                    "text": " hola"
                },
                {
                    "timestamps": {"from": "00:00:01,500", "to": "00:00:02,250"},
                    "offsets": {"from": 1500, "to": 2250},
                    "text": " mundo"
                }
            ]
        }"#;

        let result = parse_output(raw).unwrap();

        assert_eq!(result.text, " hola mundo");
        assert_eq!(result.detected_language, LanguageCode::parse("es"));

        let segments = result.segments.unwrap();
        assert_eq!(segments.len(), 2);
        assert!((segments[0].end - 1.5).abs() < f64::EPSILON);
        assert!((segments[1].end - 2.25).abs() < f64::EPSILON);
        assert_eq!(segments[1].text, " mundo");
    }

    #[test]
    fn empty_transcription_yields_empty_text() {
        let result = parse_output(br#"{"transcription": []}"#).unwrap();

        assert_eq!(result.text, "");
        assert!(result.detected_language.is_none());
        assert_eq!(result.segments, Some(Vec::new()));
    }

    #[test]
    fn split_multibyte_text_is_decoded_lossily() {
        // First segment ends halfway through a three-byte character
        let mut raw = br#"{"result": {"language": "ja"}, "transcription": [{"offsets": {"from": 0, "to": 800}, "text": ""#.to_vec();
        raw.extend_from_slice(&[0xe3, 0x81]);
        raw.extend_from_slice(br#""}, {"offsets": {"from": 800, "to": 1600}, "text": ""#);
        raw.extend_from_slice("\u{3093}".as_bytes());
        raw.extend_from_slice(br#""}]}"#);

        let result = parse_output(&raw).unwrap();

        assert_eq!(result.detected_language, LanguageCode::parse("ja"));
        assert!(result.text.contains('\u{FFFD}'));
        assert!(result.text.ends_with('\u{3093}'));
        assert_eq!(result.segments.unwrap().len(), 2);
    }

    #[test]
    fn garbage_output_is_a_model_failure() {
        let error = parse_output(b"not json").unwrap_err();
        assert!(matches!(error, TranscriptionError::Model(_)));
    }

    #[test]
    fn stderr_tail_keeps_last_lines() {
        let stderr = b"line1\nline2\n\nline3\nline4\nline5\nline6\nline7\n";
        assert_eq!(stderr_tail(stderr), "line3\nline4\nline5\nline6\nline7");
    }

    #[test]
    fn missing_binary_fails_at_startup() {
        let model_file = tempfile::NamedTempFile::new().unwrap();

        let result = WhisperCliModel::new(&WhisperCliConfig {
            binary: PathBuf::from("/nonexistent/whisper-cli"),
            model_path: model_file.path().to_path_buf(),
            threads: 4,
        });

        assert!(matches!(result, Err(TranscriptionError::Config(message)) if message.contains("whisper-cli")));
    }

    #[test]
    fn missing_model_fails_at_startup() {
        let binary = tempfile::NamedTempFile::new().unwrap();

        let result = WhisperCliModel::new(&WhisperCliConfig {
            binary: binary.path().to_path_buf(),
            model_path: PathBuf::from("/nonexistent/ggml-medium.bin"),
            threads: 4,
        });

        assert!(matches!(result, Err(TranscriptionError::Config(message)) if message.contains("model")));
    }

    #[cfg(unix)]
    mod cli {
        use std::path::{Path, PathBuf};

        use super::*;

        const OUTPUT_JSON: &str = r#"{"result": {"language": "es"}, "transcription": [{"offsets": {"from": 0, "to": 1000}, "text": " hola mundo"}]}"#;

        /// Write an executable `whisper-cli` stand-in running `body`
        fn fake_binary(dir: &Path, body: &str) -> PathBuf {
            use std::os::unix::fs::PermissionsExt;

            let path = dir.join("whisper-cli");
            std::fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        /// Binary that records its arguments and writes `<-of>.json`
        fn recording_binary(dir: &Path) -> (PathBuf, PathBuf) {
            let args_file = dir.join("args.txt");
            let body = r#"printf '%s\n' "$@" > "ARGS_FILE"
while [ $# -gt 0 ]; do
  if [ "$1" = "-of" ]; then out="$2"; fi
  shift
done
cat > "$out.json" <<'JSON'
OUTPUT_JSON
JSON
"#
            .replace("ARGS_FILE", &args_file.display().to_string())
            .replace("OUTPUT_JSON", OUTPUT_JSON);

            (fake_binary(dir, &body), args_file)
        }

        fn model(binary: PathBuf, model_path: &Path) -> WhisperCliModel {
            WhisperCliModel::new(&WhisperCliConfig {
                binary,
                model_path: model_path.to_path_buf(),
                threads: 2,
            })
            .unwrap()
        }

        fn recorded_args(args_file: &Path) -> Vec<String> {
            std::fs::read_to_string(args_file)
                .unwrap()
                .lines()
                .map(str::to_string)
                .collect()
        }

        #[tokio::test]
        async fn transcribe_passes_language_and_reads_json() {
            let dir = tempfile::tempdir().unwrap();
            let (binary, args_file) = recording_binary(dir.path());
            let model_file = tempfile::NamedTempFile::new().unwrap();
            let audio = tempfile::Builder::new().suffix(".wav").tempfile().unwrap();

            let result = model(binary, model_file.path())
                .transcribe(audio.path(), &ModelOptions::new(Task::Transcribe, LanguageCode::parse("es")))
                .await
                .unwrap();

            assert_eq!(result.text, " hola mundo");
            assert_eq!(result.detected_language, LanguageCode::parse("es"));

            let args = recorded_args(&args_file);
            let expected_head = [
                "-m".to_string(),
                model_file.path().display().to_string(),
                "-f".to_string(),
                audio.path().display().to_string(),
                "-t".to_string(),
                "2".to_string(),
                "-l".to_string(),
                "es".to_string(),
                "-oj".to_string(),
                "-of".to_string(),
            ];
            assert_eq!(args[..10], expected_head);
            assert!(args[10].ends_with("/out"));
            assert_eq!(args[11..], ["-np"]);
        }

        #[tokio::test]
        async fn translate_auto_detects_and_adds_flag() {
            let dir = tempfile::tempdir().unwrap();
            let (binary, args_file) = recording_binary(dir.path());
            let model_file = tempfile::NamedTempFile::new().unwrap();
            let audio = tempfile::Builder::new().suffix(".wav").tempfile().unwrap();

            model(binary, model_file.path())
                .transcribe(audio.path(), &ModelOptions::new(Task::Translate, None))
                .await
                .unwrap();

            let args = recorded_args(&args_file);
            assert_eq!(args[6..8], ["-l", "auto"]);
            assert_eq!(args[11..], ["-tr", "-np"]);
        }

        #[tokio::test]
        async fn failing_exit_carries_stderr() {
            let dir = tempfile::tempdir().unwrap();
            let binary = fake_binary(
                dir.path(),
                "echo 'whisper_init_from_file: loading model' >&2\necho 'error: failed to read audio file' >&2\nexit 3\n",
            );
            let model_file = tempfile::NamedTempFile::new().unwrap();
            let audio = tempfile::Builder::new().suffix(".wav").tempfile().unwrap();

            let error = model(binary, model_file.path())
                .transcribe(audio.path(), &ModelOptions::new(Task::Transcribe, None))
                .await
                .unwrap_err();

            assert!(
                matches!(error, TranscriptionError::Model(ref message) if message.contains("failed to read audio file")),
                "{error}"
            );
        }

        #[tokio::test]
        async fn missing_json_output_is_an_io_error() {
            let dir = tempfile::tempdir().unwrap();
            let binary = fake_binary(dir.path(), "exit 0\n");
            let model_file = tempfile::NamedTempFile::new().unwrap();
            let audio = tempfile::Builder::new().suffix(".wav").tempfile().unwrap();

            let error = model(binary, model_file.path())
                .transcribe(audio.path(), &ModelOptions::new(Task::Transcribe, None))
                .await
                .unwrap_err();

            assert!(matches!(error, TranscriptionError::Io(_)));
        }
    }
}
