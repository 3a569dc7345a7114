pub mod controllers;
pub mod domain;
pub mod error;
pub mod infrastructure;

use axum::Router;
use std::sync::Arc;

use controllers::{
    audio::AudioController, health::Readiness, history::HistoryController,
    speech::SpeechController,
};
use domain::history::HistoryService;
use domain::speech::{Chunker, RetryPolicy, SpeechPipeline, SpeechService, SpeechSettings, Synthesizer};
use infrastructure::config::Config;
use infrastructure::http::{create_app, Controllers};
use infrastructure::repositories::{HistoryRepository, SpeechRepository};

/// Chunker and synthesizer configured from `config`
pub fn build_pipeline(config: &Config, speech_repo: Arc<dyn SpeechRepository>) -> SpeechPipeline {
    let retry = RetryPolicy {
        max_attempts: config.tts_max_retries,
        base_delay: config.retry_delay(),
    };
    SpeechPipeline::new(
        Chunker::new(config.max_chunk_chars),
        Synthesizer::new(speech_repo, retry),
    )
    .with_chunk_concurrency(config.tts_chunk_concurrency)
}

/// Wire repositories, services and controllers into the application router
pub async fn build_app(
    config: Arc<Config>,
    speech_repo: Arc<dyn SpeechRepository>,
) -> anyhow::Result<Router> {
    // 1. Repositories
    tokio::fs::create_dir_all(&config.output_dir).await?;
    let history_repo = Arc::new(HistoryRepository::new(&config.history_file));
    history_repo.initialize().await?;

    // 2. Services
    let pipeline = Arc::new(build_pipeline(&config, speech_repo));
    let speech_service = Arc::new(SpeechService::new(
        pipeline,
        history_repo.clone(),
        SpeechSettings::from(config.as_ref()),
    ));
    let history_service = Arc::new(HistoryService::new(
        history_repo.clone(),
        config.output_dir.clone(),
    ));

    // 3. Controllers
    let controllers = Controllers {
        readiness: Arc::new(Readiness {
            config: config.clone(),
            history_repo,
        }),
        speech: Arc::new(SpeechController::new(speech_service.clone())),
        history: Arc::new(HistoryController::new(history_service.clone())),
        audio: Arc::new(AudioController::new(history_service, speech_service)),
    };

    Ok(create_app(&config, controllers))
}
