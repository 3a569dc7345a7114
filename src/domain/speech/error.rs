use crate::error::AppError;
use crate::infrastructure::pdf::PdfError;
use std::fmt;
use std::path::PathBuf;

/// Failure classes reported by the remote speech API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisErrorKind {
    Timeout,
    RateLimited,
    Authentication,
    ConnectionReset,
    Unknown,
}

impl SynthesisErrorKind {
    /// Whether another attempt can plausibly succeed
    pub fn is_retryable(self) -> bool {
        match self {
            SynthesisErrorKind::Timeout
            | SynthesisErrorKind::RateLimited
            | SynthesisErrorKind::ConnectionReset => true,
            SynthesisErrorKind::Authentication | SynthesisErrorKind::Unknown => false,
        }
    }
}

impl fmt::Display for SynthesisErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SynthesisErrorKind::Timeout => "timeout",
            SynthesisErrorKind::RateLimited => "rate limited",
            SynthesisErrorKind::Authentication => "authentication",
            SynthesisErrorKind::ConnectionReset => "connection reset",
            SynthesisErrorKind::Unknown => "api",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind} error: {message}")]
pub struct SynthesisError {
    pub kind: SynthesisErrorKind,
    pub message: String,
}

impl SynthesisError {
    pub fn new(kind: SynthesisErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Result of a single remote call as seen by the synthesizer
#[derive(Debug, thiserror::Error)]
pub enum SpeechApiError {
    #[error(transparent)]
    Remote(#[from] SynthesisError),
    #[error("failed to write audio: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum StitchError {
    #[error("no audio files to stitch")]
    Empty,
    #[error("failed to decode {path}: {message}")]
    Decode { path: PathBuf, message: String },
    #[error("{path} does not match the first segment ({message})")]
    Incompatible { path: PathBuf, message: String },
    #[error("failed to write stitched audio: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("invalid parameter: {0}")]
    Validation(String),
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Stitch(#[from] StitchError),
}

impl From<SpeechApiError> for GenerationError {
    fn from(err: SpeechApiError) -> Self {
        match err {
            SpeechApiError::Remote(e) => GenerationError::Synthesis(e),
            SpeechApiError::Io(e) => GenerationError::Io(e),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SpeechServiceError {
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("text too long: {0}")]
    TooLong(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    Disabled(String),
    #[error(transparent)]
    Pdf(#[from] PdfError),
    #[error("dependency error: {0}")]
    Dependency(String),
    #[error("Error generating speech: {0}")]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<SpeechServiceError> for AppError {
    fn from(err: SpeechServiceError) -> Self {
        match err {
            SpeechServiceError::Invalid(msg) => AppError::BadRequest(msg),
            SpeechServiceError::TooLong(msg) => AppError::PayloadTooLarge(msg),
            SpeechServiceError::NotFound(msg) => AppError::NotFound(msg),
            SpeechServiceError::Disabled(msg) => AppError::Forbidden(msg),
            SpeechServiceError::Pdf(e) => AppError::BadRequest(e.to_string()),
            SpeechServiceError::Dependency(msg) => AppError::Internal(msg),
            SpeechServiceError::Generation(GenerationError::Validation(msg)) => {
                AppError::BadRequest(msg)
            }
            SpeechServiceError::Generation(GenerationError::Synthesis(e))
                if e.kind == SynthesisErrorKind::RateLimited =>
            {
                AppError::RateLimitExceeded(format!("Error generating speech: {}", e))
            }
            err @ SpeechServiceError::Generation(_) => AppError::ExternalService(err.to_string()),
            SpeechServiceError::Other(e) => AppError::Internal(e.to_string()),
        }
    }
}
