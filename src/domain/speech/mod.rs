pub mod chunker;
pub mod cost;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod service;
pub mod stitcher;
pub mod synthesizer;

#[cfg(test)]
pub(crate) mod test_support;

pub use chunker::{Chunker, OversizedWord};
pub use cost::estimate_cost;
pub use error::{
    GenerationError, SpeechApiError, SpeechServiceError, StitchError, SynthesisError,
    SynthesisErrorKind,
};
pub use model::{AudioFile, GenerationOutcome, GenerationRequest, SpeechModel, Voice};
pub use pipeline::SpeechPipeline;
pub use service::{SpeechService, SpeechServiceApi, SpeechSettings};
pub use synthesizer::{RetryPolicy, Synthesizer};

use crate::domain::history::SourceType;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Text and/or PDF handed to the service by the HTTP layer
#[derive(Debug, Default)]
pub struct SpeechInput {
    pub text: Option<String>,
    pub pdf: Option<PdfUpload>,
    pub voice: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug)]
pub struct PdfUpload {
    pub bytes: Vec<u8>,
    pub filename: Option<String>,
}

/// Request for POST /api/generate (JSON variant)
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub text: Option<String>,
    pub pdf_base64: Option<String>,
    pub filename: Option<String>,
    pub voice: Option<String>,
    pub model: Option<String>,
}

/// Request for POST /api/preview-cost
#[derive(Debug, Serialize, Deserialize)]
pub struct PreviewCostRequest {
    pub text: String,
    pub model: Option<String>,
}

/// Response for POST /api/preview and /api/preview-cost
#[derive(Debug, Serialize, Deserialize)]
pub struct PreviewResponse {
    pub text_length: usize,
    pub num_chunks: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub estimated_cost: Decimal,
    pub model: SpeechModel,
}

/// Response for POST /api/generate
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub success: bool,
    pub file_id: String,
    pub filename: String,
    pub text_length: usize,
    pub num_chunks: usize,
    pub processing_time_secs: f64,
    pub source_type: SourceType,
    pub original_filename: String,
    pub file_size: u64,
    pub url: String,
}

/// Response for GET /api/generations/:filename
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationDetails {
    pub filename: String,
    pub file_id: String,
    pub url: String,
    pub text: Option<String>,
    pub text_truncated: bool,
    pub voice: Option<Voice>,
    pub model: Option<SpeechModel>,
    pub file_size: Option<u64>,
    pub file_size_formatted: Option<String>,
    pub source_type: Option<SourceType>,
    pub original_filename: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Plain-text attachment for GET /download-text/:filename
#[derive(Debug, Clone)]
pub struct TextDownload {
    pub filename: String,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VoiceSampleResult {
    pub voice: Voice,
    pub file: String,
    pub status: String,
}

/// Response for POST /api/voice-samples
#[derive(Debug, Serialize, Deserialize)]
pub struct VoiceSamplesResponse {
    pub samples: Vec<VoiceSampleResult>,
}
