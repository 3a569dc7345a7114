use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Path, Request, State},
    http::{header, StatusCode},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::sync::Arc;

use crate::{
    domain::speech::{
        GenerateRequest, GenerationDetails, GenerationResponse, PdfUpload, PreviewCostRequest,
        PreviewResponse, SpeechInput, SpeechService, SpeechServiceApi, VoiceSamplesResponse,
    },
    error::{AppError, AppResult},
};

/// Speech input from either a JSON body or a multipart form
pub struct SpeechForm(pub SpeechInput);

#[async_trait]
impl<S> FromRequest<S> for SpeechForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| rejection(e.status(), e.body_text()))?;
            return read_multipart(multipart).await.map(SpeechForm);
        }

        let Json(body) = Json::<GenerateRequest>::from_request(req, state)
            .await
            .map_err(|e| rejection(e.status(), e.body_text()))?;
        from_json(body).map(SpeechForm)
    }
}

fn rejection(status: StatusCode, message: String) -> AppError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(message)
    } else {
        AppError::BadRequest(message)
    }
}

fn from_json(body: GenerateRequest) -> AppResult<SpeechInput> {
    let pdf = match body.pdf_base64.as_deref().map(str::trim) {
        Some(encoded) if !encoded.is_empty() => {
            let bytes = STANDARD
                .decode(encoded)
                .map_err(|e| AppError::BadRequest(format!("Invalid PDF data: {}", e)))?;
            Some(PdfUpload {
                bytes,
                filename: body.filename,
            })
        }
        _ => None,
    };

    Ok(SpeechInput {
        text: body.text,
        pdf,
        voice: body.voice,
        model: body.model,
    })
}

async fn read_multipart(mut multipart: Multipart) -> AppResult<SpeechInput> {
    let mut input = SpeechInput::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| rejection(e.status(), e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "pdf_file" => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .filter(|f| !f.is_empty());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| rejection(e.status(), e.body_text()))?;
                // Browsers send an empty part when no file was chosen
                let Some(filename) = filename else { continue };
                if bytes.is_empty() {
                    continue;
                }
                if !filename.to_lowercase().ends_with(".pdf") {
                    return Err(AppError::BadRequest(
                        "Invalid file type. Please upload a PDF file.".to_string(),
                    ));
                }
                input.pdf = Some(PdfUpload {
                    bytes: bytes.to_vec(),
                    filename: Some(filename),
                });
            }
            "text" | "voice" | "model" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| rejection(e.status(), e.body_text()))?;
                match name.as_str() {
                    "text" => input.text = Some(value),
                    "voice" => input.voice = Some(value),
                    _ => input.model = Some(value),
                }
            }
            other => tracing::debug!(field = %other, "Ignoring unknown form field"),
        }
    }

    Ok(input)
}

pub struct SpeechController {
    speech_service: Arc<SpeechService>,
}

impl SpeechController {
    pub fn new(speech_service: Arc<SpeechService>) -> Self {
        Self { speech_service }
    }

    /// POST /api/generate - Generate speech from text and/or a PDF
    pub async fn generate(
        State(controller): State<Arc<SpeechController>>,
        SpeechForm(input): SpeechForm,
    ) -> AppResult<(StatusCode, Json<GenerationResponse>)> {
        let response = controller.speech_service.generate(input).await?;
        Ok((StatusCode::OK, Json(response)))
    }

    /// POST /api/preview - Length, chunks and cost of form input
    pub async fn preview(
        State(controller): State<Arc<SpeechController>>,
        SpeechForm(input): SpeechForm,
    ) -> AppResult<Json<PreviewResponse>> {
        let response = controller.speech_service.preview(input).await?;
        Ok(Json(response))
    }

    /// POST /api/preview-cost - Length, chunks and cost of JSON text
    pub async fn preview_cost(
        State(controller): State<Arc<SpeechController>>,
        Json(request): Json<PreviewCostRequest>,
    ) -> AppResult<Json<PreviewResponse>> {
        let input = SpeechInput {
            text: Some(request.text),
            model: request.model,
            ..Default::default()
        };
        let response = controller.speech_service.preview(input).await?;
        Ok(Json(response))
    }

    /// GET /api/generations/:filename - Metadata and text of a generation
    pub async fn generation_details(
        State(controller): State<Arc<SpeechController>>,
        Path(filename): Path<String>,
    ) -> AppResult<Json<GenerationDetails>> {
        let details = controller
            .speech_service
            .generation_details(&filename)
            .await?;
        Ok(Json(details))
    }

    /// POST /api/voice-samples - Regenerate the sample clip of every voice
    pub async fn voice_samples(
        State(controller): State<Arc<SpeechController>>,
    ) -> AppResult<Json<VoiceSamplesResponse>> {
        let response = controller.speech_service.generate_voice_samples().await?;
        Ok(Json(response))
    }
}
