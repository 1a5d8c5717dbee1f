use crate::error::AppResult;
use crate::infrastructure::camb::AudioStream;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Scoped temp audio file: owns a unique path under the OS temp dir and
/// removes the file when dropped, so request-scoped audio never outlives
/// the request regardless of which exit path was taken.
pub struct TempAudio {
    path: PathBuf,
}

impl TempAudio {
    pub fn new(extension: &str) -> Self {
        let path = std::env::temp_dir().join(format!("voiceclip-{}.{}", Uuid::new_v4(), extension));
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drain a chunked audio stream into the file. The whole stream is
    /// consumed before returning, releasing the underlying connection.
    pub async fn fill_from_stream(&self, mut stream: AudioStream) -> AppResult<u64> {
        let mut file = tokio::fs::File::create(&self.path).await?;
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        tracing::debug!(
            path = %self.path.display(),
            bytes = written,
            "Audio stream drained to temp file"
        );
        Ok(written)
    }
}

impl Drop for TempAudio {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to remove temp audio file"
                );
            }
        }
    }
}
