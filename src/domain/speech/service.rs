use super::error::{GenerationError, SpeechServiceError};
use super::model::{GenerationRequest, SpeechModel, Voice};
use super::pipeline::SpeechPipeline;
use super::{
    cost, GenerationDetails, GenerationResponse, PdfUpload, PreviewResponse, SpeechInput,
    TextDownload, VoiceSampleResult, VoiceSamplesResponse,
};
use crate::domain::history::{
    file_stem, format_file_size, is_safe_filename, HistoryEntry, SourceType,
};
use crate::infrastructure::config::Config;
use crate::infrastructure::pdf;
use crate::infrastructure::repositories::HistoryRepository;
use async_trait::async_trait;
use moka::future::Cache;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

const TEXT_INPUT_NAME: &str = "API text input";
const PDF_INPUT_NAME: &str = "API PDF upload";

/// Knobs the service reads from the configuration
#[derive(Debug, Clone)]
pub struct SpeechSettings {
    pub output_dir: PathBuf,
    pub samples_dir: PathBuf,
    pub max_text_length: usize,
    pub history_preview_length: usize,
    pub allow_sample_generation: bool,
    pub text_cache_ttl: Duration,
}

impl From<&Config> for SpeechSettings {
    fn from(config: &Config) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            samples_dir: config.samples_dir.clone(),
            max_text_length: config.max_text_length,
            history_preview_length: config.history_preview_length,
            allow_sample_generation: config.allow_sample_generation,
            text_cache_ttl: config.text_cache_ttl(),
        }
    }
}

/// Text gathered from the request sources
struct ResolvedText {
    text: String,
    source_type: SourceType,
    original_filename: String,
}

pub struct SpeechService {
    pipeline: Arc<SpeechPipeline>,
    history_repo: Arc<HistoryRepository>,
    settings: SpeechSettings,
    /// Full source text of recent generations, keyed by audio filename
    text_cache: Cache<String, String>,
}

impl SpeechService {
    pub fn new(
        pipeline: Arc<SpeechPipeline>,
        history_repo: Arc<HistoryRepository>,
        settings: SpeechSettings,
    ) -> Self {
        let text_cache = Cache::builder()
            .max_capacity(100)
            .time_to_idle(settings.text_cache_ttl)
            .build();

        Self {
            pipeline,
            history_repo,
            settings,
            text_cache,
        }
    }

    pub fn settings(&self) -> &SpeechSettings {
        &self.settings
    }

    async fn resolve_text(&self, input: SpeechInput) -> Result<ResolvedText, SpeechServiceError> {
        let text = input.text.unwrap_or_default().trim().to_string();

        let resolved = match input.pdf {
            Some(PdfUpload { bytes, filename }) => {
                let pdf_text = tokio::task::spawn_blocking(move || pdf::extract_text(&bytes))
                    .await
                    .map_err(|e| SpeechServiceError::Other(e.into()))??;

                tracing::info!(
                    pdf_text_length = pdf_text.chars().count(),
                    form_text_length = text.chars().count(),
                    "Extracted text from PDF upload"
                );

                let combined = match (text.is_empty(), pdf_text.is_empty()) {
                    (true, _) => pdf_text,
                    (false, true) => text,
                    (false, false) => format!("{}\n\n{}", text, pdf_text),
                };
                ResolvedText {
                    text: combined,
                    source_type: SourceType::Pdf,
                    original_filename: filename
                        .filter(|name| !name.trim().is_empty())
                        .unwrap_or_else(|| PDF_INPUT_NAME.to_string()),
                }
            }
            None if text.is_empty() => {
                return Err(SpeechServiceError::Invalid(
                    "Either text or PDF data is required".to_string(),
                ))
            }
            None => ResolvedText {
                text,
                source_type: SourceType::Text,
                original_filename: TEXT_INPUT_NAME.to_string(),
            },
        };

        if resolved.text.trim().is_empty() {
            return Err(SpeechServiceError::Invalid(
                "No text could be extracted from the provided sources".to_string(),
            ));
        }

        Ok(resolved)
    }

    fn safe_filename(filename: &str) -> Result<(), SpeechServiceError> {
        if is_safe_filename(filename) {
            Ok(())
        } else {
            Err(SpeechServiceError::Invalid(format!(
                "Invalid filename: {}",
                filename
            )))
        }
    }

    async fn record_history(&self, entry: HistoryEntry) {
        let filename = entry.filename.clone();
        if let Err(e) = self.history_repo.append(entry).await {
            tracing::error!(filename = %filename, error = %e, "Failed to record generation in history");
        }
    }
}

fn parse_option<T>(value: Option<&str>) -> Result<T, GenerationError>
where
    T: FromStr<Err = GenerationError> + Default,
{
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(raw) => raw.parse(),
        None => Ok(T::default()),
    }
}

#[async_trait]
pub trait SpeechServiceApi: Send + Sync {
    /// Generate an MP3 from text and/or PDF input
    ///
    /// The audio lands in the output directory under a fresh UUID, the
    /// generation is recorded in the history and the full text is cached
    /// for later display and download.
    async fn generate(&self, input: SpeechInput) -> Result<GenerationResponse, SpeechServiceError>;

    /// Length, chunk count and estimated cost without calling the API
    async fn preview(&self, input: SpeechInput) -> Result<PreviewResponse, SpeechServiceError>;

    /// Metadata and text of a past generation
    async fn generation_details(
        &self,
        filename: &str,
    ) -> Result<GenerationDetails, SpeechServiceError>;

    /// Source text of a generation as a downloadable file
    async fn text_download(&self, filename: &str) -> Result<TextDownload, SpeechServiceError>;

    /// Synthesize the introduction line of every voice into the samples directory
    async fn generate_voice_samples(&self) -> Result<VoiceSamplesResponse, SpeechServiceError>;
}

#[async_trait]
impl SpeechServiceApi for SpeechService {
    async fn generate(&self, input: SpeechInput) -> Result<GenerationResponse, SpeechServiceError> {
        let voice: Voice = parse_option(input.voice.as_deref())?;
        let model: SpeechModel = parse_option(input.model.as_deref())?;
        let resolved = self.resolve_text(input).await?;

        let text_length = resolved.text.chars().count();
        if text_length > self.settings.max_text_length {
            return Err(SpeechServiceError::TooLong(format!(
                "Text exceeds maximum length of {} characters ({} given)",
                self.settings.max_text_length, text_length
            )));
        }

        tokio::fs::create_dir_all(&self.settings.output_dir)
            .await
            .map_err(GenerationError::from)?;

        let file_id = Uuid::new_v4().to_string();
        let filename = format!("{}.mp3", file_id);

        tracing::info!(
            filename = %filename,
            text_length,
            source_type = %resolved.source_type,
            voice = %voice,
            model = %model,
            "Generating speech"
        );

        let outcome = self
            .pipeline
            .generate(GenerationRequest {
                text: resolved.text.clone(),
                destination: self.settings.output_dir.join(&filename),
                model,
                voice,
            })
            .await?;

        self.record_history(HistoryEntry::new(
            &resolved.text,
            self.settings.history_preview_length,
            voice,
            model,
            filename.clone(),
            outcome.size_bytes,
            resolved.source_type,
            resolved.original_filename.clone(),
        ))
        .await;
        self.text_cache.insert(filename.clone(), resolved.text).await;

        Ok(GenerationResponse {
            success: true,
            url: format!("/get-audio/{}", filename),
            file_id,
            filename,
            text_length,
            num_chunks: outcome.chunk_count,
            processing_time_secs: outcome.elapsed.as_secs_f64(),
            source_type: resolved.source_type,
            original_filename: resolved.original_filename,
            file_size: outcome.size_bytes,
        })
    }

    async fn preview(&self, input: SpeechInput) -> Result<PreviewResponse, SpeechServiceError> {
        let model: SpeechModel = parse_option(input.model.as_deref())?;
        let resolved = self.resolve_text(input).await?;

        let text_length = resolved.text.chars().count();
        let num_chunks = self.pipeline.chunker().split(&resolved.text).len();

        Ok(PreviewResponse {
            text_length,
            num_chunks,
            estimated_cost: cost::estimate_cost(text_length, model),
            model,
        })
    }

    async fn generation_details(
        &self,
        filename: &str,
    ) -> Result<GenerationDetails, SpeechServiceError> {
        Self::safe_filename(filename)?;

        let entry = self
            .history_repo
            .find(filename)
            .await
            .map_err(|e| SpeechServiceError::Dependency(e.to_string()))?;
        let file_exists = tokio::fs::try_exists(self.settings.output_dir.join(filename))
            .await
            .unwrap_or(false);

        if entry.is_none() && !file_exists {
            return Err(SpeechServiceError::NotFound(format!(
                "File not found: {}",
                filename
            )));
        }

        let (text, text_truncated) = match self.text_cache.get(filename).await {
            Some(full) => (Some(full), false),
            None => match &entry {
                Some(entry) => (Some(entry.text.clone()), entry.is_truncated()),
                None => (None, false),
            },
        };

        Ok(GenerationDetails {
            filename: filename.to_string(),
            file_id: file_stem(filename).to_string(),
            url: format!("/get-audio/{}", filename),
            text,
            text_truncated,
            voice: entry.as_ref().map(|e| e.voice),
            model: entry.as_ref().map(|e| e.model),
            file_size: entry.as_ref().map(|e| e.file_size),
            file_size_formatted: entry.as_ref().map(|e| format_file_size(e.file_size)),
            source_type: entry.as_ref().map(|e| e.source_type),
            original_filename: entry.as_ref().map(|e| e.original_filename.clone()),
            created_at: entry.as_ref().map(|e| e.timestamp),
        })
    }

    async fn text_download(&self, filename: &str) -> Result<TextDownload, SpeechServiceError> {
        Self::safe_filename(filename)?;

        let entry = self
            .history_repo
            .find(filename)
            .await
            .map_err(|e| SpeechServiceError::Dependency(e.to_string()))?;

        let content = match (self.text_cache.get(filename).await, &entry) {
            (Some(full), _) => full,
            (None, Some(entry)) if entry.is_truncated() => {
                tracing::warn!(filename = %filename, "Only a truncated preview is available for download");
                format!(
                    "Note: This text is truncated to {} characters as the full original text was not saved.\n\n{}",
                    self.settings.history_preview_length, entry.text
                )
            }
            (None, Some(entry)) => entry.text.clone(),
            (None, None) => {
                return Err(SpeechServiceError::NotFound(format!(
                    "Text not found for {}",
                    filename
                )))
            }
        };

        let title = entry
            .as_ref()
            .map(|e| download_title(&e.original_filename))
            .unwrap_or_else(|| "text".to_string());

        tracing::info!(
            filename = %filename,
            text_length = content.chars().count(),
            "Preparing text download"
        );

        Ok(TextDownload {
            filename: format!("{}_{}.txt", title, file_stem(filename)),
            content,
        })
    }

    async fn generate_voice_samples(&self) -> Result<VoiceSamplesResponse, SpeechServiceError> {
        if !self.settings.allow_sample_generation {
            return Err(SpeechServiceError::Disabled(
                "Sample generation is disabled.".to_string(),
            ));
        }

        tokio::fs::create_dir_all(&self.settings.samples_dir)
            .await
            .map_err(GenerationError::from)?;

        let mut samples = Vec::with_capacity(Voice::ALL.len());
        for voice in Voice::ALL {
            let file = format!("{}.mp3", voice);
            let destination = self.settings.samples_dir.join(&file);
            let status = match self
                .pipeline
                .synthesizer()
                .synthesize(voice.introduction(), &destination, SpeechModel::Hd, voice)
                .await
            {
                Ok(_) => {
                    tracing::info!(voice = %voice, "Generated voice sample");
                    "generated".to_string()
                }
                Err(e) => {
                    tracing::error!(voice = %voice, error = %e, "Failed to generate voice sample");
                    format!("error: {}", e)
                }
            };
            samples.push(VoiceSampleResult {
                voice,
                file,
                status,
            });
        }

        Ok(VoiceSamplesResponse { samples })
    }
}

/// Title part of a text download name, derived from the uploaded file name
fn download_title(original_filename: &str) -> String {
    let title = original_filename.replace(' ', "_");
    match title.len().checked_sub(4) {
        Some(cut) if title.is_char_boundary(cut) && title[cut..].eq_ignore_ascii_case(".pdf") => {
            title[..cut].to_string()
        }
        _ => title,
    }
}
