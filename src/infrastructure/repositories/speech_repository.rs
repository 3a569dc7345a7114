use crate::domain::speech::{SpeechApiError, SpeechModel, Voice};
use async_trait::async_trait;
use std::path::Path;

/// Repository for remote speech synthesis calls.
/// Abstracts the underlying TTS provider so the pipeline can be driven by fakes.
///
/// Implementations perform exactly one remote request per call and never
/// retry; retry policy belongs to the synthesizer.
#[async_trait]
pub trait SpeechRepository: Send + Sync {
    /// Synthesize `text` and stream the audio body into `destination`
    ///
    /// Returns the number of bytes written (MP3 format)
    ///
    /// # Errors
    /// `SpeechApiError::Remote` carries the provider failure classification,
    /// `SpeechApiError::Io` a local write failure. On error the content of
    /// `destination` is unspecified.
    async fn stream_speech(
        &self,
        text: &str,
        model: SpeechModel,
        voice: Voice,
        destination: &Path,
    ) -> Result<u64, SpeechApiError>;
}
