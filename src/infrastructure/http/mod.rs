pub mod request_id;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::controllers::{
    audio::AudioController,
    health::{self, Readiness},
    history::HistoryController,
    speech::SpeechController,
};
use crate::infrastructure::config::Config;

pub use request_id::{request_id_middleware, RequestId, X_REQUEST_ID};

/// Controllers served by the router
pub struct Controllers {
    pub readiness: Arc<Readiness>,
    pub speech: Arc<SpeechController>,
    pub history: Arc<HistoryController>,
    pub audio: Arc<AudioController>,
}

/// Build the application router with all routes and layers
pub fn create_app(config: &Config, controllers: Controllers) -> Router {
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .route("/api/health", get(health::api_health))
        .route("/api/check-environment", get(health::check_environment))
        .with_state(controllers.readiness);

    let speech_routes = Router::new()
        .route("/api/generate", post(SpeechController::generate))
        .route("/api/preview", post(SpeechController::preview))
        .route("/api/preview-cost", post(SpeechController::preview_cost))
        .route(
            "/api/generations/:filename",
            get(SpeechController::generation_details),
        )
        .route("/api/voice-samples", post(SpeechController::voice_samples))
        .with_state(controllers.speech);

    let history_routes = Router::new()
        .route(
            "/api/history",
            get(HistoryController::list).delete(HistoryController::clear),
        )
        .route("/api/history/:filename", delete(HistoryController::delete))
        .with_state(controllers.history);

    let audio_routes = Router::new()
        .route("/get-audio/:filename", get(AudioController::get_audio))
        .route("/download/:filename", get(AudioController::download))
        .route("/download-text/:filename", get(AudioController::download_text))
        .with_state(controllers.audio);

    Router::new()
        .merge(health_routes)
        .merge(speech_routes)
        .merge(history_routes)
        .merge(audio_routes)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes()))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server and serve `app` until shutdown
pub async fn start_http_server(
    config: Arc<Config>,
    app: Router,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
