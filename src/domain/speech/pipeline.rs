use super::chunker::Chunker;
use super::error::GenerationError;
use super::model::{AudioFile, GenerationOutcome, GenerationRequest};
use super::stitcher::stitch;
use super::synthesizer::Synthesizer;
use futures::{StreamExt, TryStreamExt};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::TempPath;

/// Chunker → Synthesizer × N → Stitcher
pub struct SpeechPipeline {
    chunker: Chunker,
    synthesizer: Synthesizer,
    chunk_concurrency: usize,
}

impl SpeechPipeline {
    pub fn new(chunker: Chunker, synthesizer: Synthesizer) -> Self {
        Self {
            chunker,
            synthesizer,
            chunk_concurrency: 1,
        }
    }

    /// Number of chunk requests kept in flight; results are still joined in chunk order
    pub fn with_chunk_concurrency(mut self, chunk_concurrency: usize) -> Self {
        self.chunk_concurrency = chunk_concurrency.max(1);
        self
    }

    pub fn chunker(&self) -> &Chunker {
        &self.chunker
    }

    pub fn synthesizer(&self) -> &Synthesizer {
        &self.synthesizer
    }

    pub async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationOutcome, GenerationError> {
        let start_time = Instant::now();
        validate(&request)?;

        let chunks = self.chunker.split(&request.text);
        tracing::info!(
            text_length = request.text.chars().count(),
            chunk_count = chunks.len(),
            max_chunk_chars = self.chunker.max_chars(),
            model = %request.model,
            voice = %request.voice,
            "Text split into chunks"
        );

        let size_bytes = if let [single] = chunks.as_slice() {
            self.synthesizer
                .synthesize(single, &request.destination, request.model, request.voice)
                .await?
                .size_bytes
        } else {
            self.generate_chunked(&chunks, &request).await?
        };

        let outcome = GenerationOutcome {
            path: request.destination,
            size_bytes,
            chunk_count: chunks.len(),
            elapsed: start_time.elapsed(),
        };

        tracing::info!(
            chunk_count = outcome.chunk_count,
            size_bytes = outcome.size_bytes,
            latency_ms = outcome.elapsed.as_millis(),
            path = %outcome.path.display(),
            "Speech generated"
        );

        Ok(outcome)
    }

    async fn generate_chunked(
        &self,
        chunks: &[String],
        request: &GenerationRequest,
    ) -> Result<u64, GenerationError> {
        // Next to the destination so the stitched file never crosses filesystems
        let work_dir = request
            .destination
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut temp_files = Vec::with_capacity(chunks.len());
        for _ in chunks {
            let temp = tempfile::Builder::new()
                .prefix("chunk-")
                .suffix(".mp3")
                .tempfile_in(work_dir)?;
            temp_files.push(temp.into_temp_path());
        }

        let result = self.synthesize_and_stitch(chunks, &temp_files, request).await;
        if let Err(err) = &result {
            tracing::error!(
                error = %err,
                temp_files = temp_files.len(),
                "Chunked generation failed, removing temporary files"
            );
            discard(temp_files);
        }

        result
    }

    async fn synthesize_and_stitch(
        &self,
        chunks: &[String],
        temp_files: &[TempPath],
        request: &GenerationRequest,
    ) -> Result<u64, GenerationError> {
        let total = chunks.len();
        let synthesizer = &self.synthesizer;
        let (model, voice) = (request.model, request.voice);

        let jobs: Vec<(usize, String, PathBuf)> = chunks
            .iter()
            .zip(temp_files)
            .enumerate()
            .map(|(index, (chunk, temp))| (index, chunk.clone(), temp.to_path_buf()))
            .collect();

        let segments: Vec<AudioFile> = futures::stream::iter(jobs)
            .map(|(index, chunk, temp)| async move {
                tracing::info!(
                    chunk = index + 1,
                    total,
                    chunk_length = chunk.chars().count(),
                    "Processing chunk"
                );
                synthesizer.synthesize(&chunk, &temp, model, voice).await
            })
            .buffered(self.chunk_concurrency)
            .try_collect()
            .await?;

        tracing::info!(segments = segments.len(), "Stitching audio files together");

        let paths: Vec<PathBuf> = segments.into_iter().map(|s| s.path).collect();
        let destination = request.destination.clone();
        let stitched = tokio::task::spawn_blocking(move || stitch(&paths, &destination))
            .await
            .map_err(|e| GenerationError::Io(std::io::Error::other(e)))?;

        Ok(stitched?)
    }
}

fn validate(request: &GenerationRequest) -> Result<(), GenerationError> {
    if request.text.trim().is_empty() {
        return Err(GenerationError::Validation(
            "Input text cannot be empty".to_string(),
        ));
    }
    if request.destination.as_os_str().is_empty() {
        return Err(GenerationError::Validation(
            "Speech file path must be specified".to_string(),
        ));
    }
    Ok(())
}

fn discard(temp_files: Vec<TempPath>) {
    for temp in temp_files {
        let path = temp.to_path_buf();
        if let Err(e) = temp.close() {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %path.display(), error = %e, "Failed to remove temporary file");
            }
        }
    }
}
