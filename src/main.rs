use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tts_studio::infrastructure::config::{Config, LogFormat};
use tts_studio::infrastructure::http::start_http_server;
use tts_studio::infrastructure::repositories::OpenAiSpeechRepository;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        "Starting TTS Studio on {}:{}",
        config.host,
        config.port
    );
    tracing::info!(
        output_dir = %config.output_dir.display(),
        history_file = %config.history_file.display(),
        max_text_length = config.max_text_length,
        max_chunk_chars = config.max_chunk_chars,
        max_retries = config.tts_max_retries,
        chunk_concurrency = config.tts_chunk_concurrency,
        "Configuration loaded"
    );

    let speech_repo = Arc::new(OpenAiSpeechRepository::new(
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
        config.request_timeout(),
    )?);
    tracing::info!(base_url = %config.openai_base_url, "OpenAI speech client initialized");

    let config = Arc::new(config);
    let app = tts_studio::build_app(config.clone(), speech_repo).await?;

    start_http_server(config, app).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tts_studio=debug,tower_http=debug".into());

    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
