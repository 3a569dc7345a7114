use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
};
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::{
    domain::{
        history::{HistoryService, HistoryServiceApi},
        speech::{SpeechService, SpeechServiceApi},
    },
    error::{AppError, AppResult},
};

pub struct AudioController {
    history_service: Arc<HistoryService>,
    speech_service: Arc<SpeechService>,
}

impl AudioController {
    pub fn new(history_service: Arc<HistoryService>, speech_service: Arc<SpeechService>) -> Self {
        Self {
            history_service,
            speech_service,
        }
    }

    /// GET /get-audio/:filename - Play a generated file inline
    pub async fn get_audio(
        State(controller): State<Arc<AudioController>>,
        Path(filename): Path<String>,
    ) -> AppResult<(StatusCode, HeaderMap, Body)> {
        controller.serve_audio(&filename, "inline").await
    }

    /// GET /download/:filename - Download a generated file
    pub async fn download(
        State(controller): State<Arc<AudioController>>,
        Path(filename): Path<String>,
    ) -> AppResult<(StatusCode, HeaderMap, Body)> {
        controller.serve_audio(&filename, "attachment").await
    }

    /// GET /download-text/:filename - Download the text a file was generated from
    pub async fn download_text(
        State(controller): State<Arc<AudioController>>,
        Path(filename): Path<String>,
    ) -> AppResult<(StatusCode, HeaderMap, Body)> {
        let download = controller.speech_service.text_download(&filename).await?;

        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        headers.insert(
            header::CONTENT_DISPOSITION,
            content_disposition("attachment", &download.filename)?,
        );

        Ok((StatusCode::OK, headers, Body::from(download.content)))
    }

    async fn serve_audio(
        &self,
        filename: &str,
        disposition: &str,
    ) -> AppResult<(StatusCode, HeaderMap, Body)> {
        let path = self.history_service.audio_path(filename).await?;
        let read_error =
            |e: std::io::Error| AppError::Internal(format!("Failed to read {}: {}", filename, e));
        let file = tokio::fs::File::open(&path).await.map_err(read_error)?;
        let size_bytes = file.metadata().await.map_err(read_error)?.len();

        tracing::debug!(filename = %filename, size_bytes, "Serving audio");

        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("audio/mpeg"));
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(size_bytes));
        headers.insert(
            header::CONTENT_DISPOSITION,
            content_disposition(disposition, filename)?,
        );

        Ok((
            StatusCode::OK,
            headers,
            Body::from_stream(ReaderStream::new(file)),
        ))
    }
}

/// `Content-Disposition` value with the name reduced to header-safe ASCII
fn content_disposition(disposition: &str, filename: &str) -> AppResult<HeaderValue> {
    let safe: String = filename
        .chars()
        .map(|c| {
            if c == ' ' || (c.is_ascii_graphic() && c != '"' && c != '\\') {
                c
            } else {
                '_'
            }
        })
        .collect();

    HeaderValue::from_str(&format!("{}; filename=\"{}\"", disposition, safe))
        .map_err(|e| AppError::Internal(format!("Invalid header value: {}", e)))
}
