use std::{
    io::{self, Write},
    path::Path,
};

use axum::body::Bytes;
use tempfile::NamedTempFile;

const DEFAULT_EXTENSION: &str = "wav";

/// Uploaded audio written to a private temp file
///
/// The file is deleted when this value is dropped, so every early return
/// releases it. [`ScopedAudioFile::remove`] deletes it explicitly and
/// reports failures.
#[derive(Debug)]
pub(crate) struct ScopedAudioFile {
    file: NamedTempFile,
}

impl ScopedAudioFile {
    /// Persist `audio` to a fresh temp file ending in `.{extension}`
    pub async fn write(audio: Bytes, extension: &str) -> io::Result<Self> {
        let suffix = format!(".{extension}");

        tokio::task::spawn_blocking(move || {
            let mut file = tempfile::Builder::new().prefix("scribe-").suffix(&suffix).tempfile()?;
            file.write_all(&audio)?;
            file.flush()?;

            tracing::debug!(path = %file.path().display(), bytes = audio.len(), "audio written");

            Ok::<_, io::Error>(Self { file })
        })
        .await
        .map_err(io::Error::other)?
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Delete the file now
    pub fn remove(self) -> io::Result<()> {
        self.file.close()
    }
}

/// Extension for the temp file, taken from the uploaded filename when sane
pub(crate) fn extension_for(filename: Option<&str>) -> String {
    filename
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| (1..=5).contains(&ext.len()) && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map_or_else(|| DEFAULT_EXTENSION.to_string(), str::to_ascii_lowercase)
}
