use super::speech_repository::SpeechRepository;
use crate::domain::speech::{
    SpeechApiError, SpeechModel, SynthesisError, SynthesisErrorKind, Voice,
};
use async_openai::types::{CreateSpeechRequest, SpeechResponseFormat};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::StatusCode;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI TTS implementation of the speech repository.
///
/// The SDK client buffers the whole body, so requests are sent with reqwest
/// and the MP3 body is streamed straight to disk.
pub struct OpenAiSpeechRepository {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
    #[serde(default)]
    code: Option<String>,
}

impl OpenAiSpeechRepository {
    pub fn new(
        api_key: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn speech_url(&self) -> String {
        format!("{}/audio/speech", self.base_url)
    }
}

#[async_trait]
impl SpeechRepository for OpenAiSpeechRepository {
    async fn stream_speech(
        &self,
        text: &str,
        model: SpeechModel,
        voice: Voice,
        destination: &Path,
    ) -> Result<u64, SpeechApiError> {
        let start_time = std::time::Instant::now();

        tracing::info!(
            model = %model,
            voice = %voice,
            text_length = text.len(),
            text_preview = %text.chars().take(100).collect::<String>(),
            "Calling OpenAI TTS API"
        );

        let request = CreateSpeechRequest {
            model: model.to_openai(),
            input: text.to_string(),
            voice: voice.to_openai(),
            response_format: Some(SpeechResponseFormat::Mp3),
            speed: None, // Defaults to 1.0
        };

        let response = self
            .http
            .post(self.speech_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = classify_status(status, &body);
            tracing::error!(
                status = status.as_u16(),
                kind = %err.kind,
                error = %err.message,
                model = %model,
                voice = %voice,
                "OpenAI TTS API call failed"
            );
            return Err(err.into());
        }

        tracing::debug!(destination = %destination.display(), "Streaming response to file");

        let mut file = tokio::fs::File::create(destination).await?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(transport_error)?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        tracing::info!(
            provider = "openai",
            model = %model,
            voice = %voice,
            latency_ms = start_time.elapsed().as_millis(),
            audio_size_bytes = written,
            "OpenAI TTS audio saved"
        );

        Ok(written)
    }
}

fn transport_error(err: reqwest::Error) -> SpeechApiError {
    SynthesisError::new(classify_transport_error(&err), err.to_string()).into()
}

/// Classify a non-2xx API response
fn classify_status(status: StatusCode, body: &str) -> SynthesisError {
    let detail = serde_json::from_str::<ApiErrorBody>(body).ok().map(|b| b.error);
    let message = match &detail {
        Some(detail) => detail.message.clone(),
        None if body.is_empty() => status.to_string(),
        None => body.chars().take(500).collect(),
    };
    let code = detail.and_then(|d| d.code);

    let kind = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SynthesisErrorKind::Authentication,
        // Quota exhaustion is reported as 429 but never clears by waiting
        StatusCode::TOO_MANY_REQUESTS if code.as_deref() == Some("insufficient_quota") => {
            SynthesisErrorKind::Unknown
        }
        StatusCode::TOO_MANY_REQUESTS => SynthesisErrorKind::RateLimited,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => SynthesisErrorKind::Timeout,
        _ => SynthesisErrorKind::Unknown,
    };

    SynthesisError::new(kind, message)
}

/// Classify a failure that happened below HTTP (connect, read, timeout)
fn classify_transport_error(err: &reqwest::Error) -> SynthesisErrorKind {
    if err.is_timeout() {
        return SynthesisErrorKind::Timeout;
    }
    if err.is_connect() {
        return SynthesisErrorKind::ConnectionReset;
    }

    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            match io.kind() {
                std::io::ErrorKind::TimedOut => return SynthesisErrorKind::Timeout,
                std::io::ErrorKind::ConnectionReset
                | std::io::ErrorKind::ConnectionAborted
                | std::io::ErrorKind::BrokenPipe
                | std::io::ErrorKind::UnexpectedEof => {
                    return SynthesisErrorKind::ConnectionReset
                }
                _ => {}
            }
        }
        let message = cause.to_string().to_lowercase();
        if message.contains("peer closed connection") || message.contains("connection closed") {
            return SynthesisErrorKind::ConnectionReset;
        }
        source = cause.source();
    }

    SynthesisErrorKind::Unknown
}
