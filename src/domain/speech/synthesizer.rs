use super::error::{GenerationError, SpeechApiError};
use super::model::{AudioFile, SpeechModel, Voice};
use crate::infrastructure::repositories::SpeechRepository;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Linear backoff unit: attempt `n` is followed by a `base_delay * n` sleep
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

/// Synthesizes one chunk of text into one audio file, retrying transient failures
pub struct Synthesizer {
    speech_repo: Arc<dyn SpeechRepository>,
    retry: RetryPolicy,
}

impl Synthesizer {
    pub fn new(speech_repo: Arc<dyn SpeechRepository>, retry: RetryPolicy) -> Self {
        Self { speech_repo, retry }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub async fn synthesize(
        &self,
        text: &str,
        destination: &Path,
        model: SpeechModel,
        voice: Voice,
    ) -> Result<AudioFile, GenerationError> {
        let max_attempts = self.retry.max_attempts.max(1);

        tracing::debug!(
            text_length = text.chars().count(),
            destination = %destination.display(),
            "Synthesizing chunk"
        );

        let mut attempt = 1;
        loop {
            tracing::debug!(attempt, max_attempts, "Sending request to speech API");

            let err = match self
                .speech_repo
                .stream_speech(text, model, voice, destination)
                .await
            {
                Ok(size_bytes) => {
                    return Ok(AudioFile {
                        path: destination.to_path_buf(),
                        size_bytes,
                    })
                }
                Err(SpeechApiError::Remote(err))
                    if err.kind.is_retryable() && attempt < max_attempts =>
                {
                    err
                }
                Err(err) => {
                    discard_partial(destination).await;
                    let err = GenerationError::from(err);
                    tracing::error!(attempt, max_attempts, error = %err, "Chunk synthesis failed");
                    return Err(err);
                }
            };

            let delay = self.retry.delay_after(attempt);
            tracing::warn!(
                attempt,
                max_attempts,
                kind = %err.kind,
                error = %err.message,
                delay_ms = delay.as_millis(),
                "Transient speech API failure, retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

/// A failed attempt may have left a partial body behind
async fn discard_partial(destination: &Path) {
    match tokio::fs::remove_file(destination).await {
        Ok(()) => tracing::debug!(path = %destination.display(), "Removed partial audio file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %destination.display(), error = %e, "Failed to remove partial audio file"),
    }
}
