use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;

use crate::infrastructure::config::Config;
use crate::infrastructure::repositories::HistoryRepository;

/// What the readiness probe inspects
pub struct Readiness {
    pub config: Arc<Config>,
    pub history_repo: Arc<HistoryRepository>,
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub async fn health_ready(State(readiness): State<Arc<Readiness>>) -> impl IntoResponse {
    let output_dir = tokio::fs::metadata(&readiness.config.output_dir)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);
    let history = readiness.history_repo.list().await.is_ok();

    let body = json!({
        "status": if output_dir && history { "ready" } else { "not_ready" },
        "output_dir": if output_dir { "available" } else { "missing" },
        "history": if history { "available" } else { "unavailable" },
    });

    if output_dir && history {
        (StatusCode::OK, Json(body))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(body))
    }
}

/// GET /api/health
pub async fn api_health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// GET /api/check-environment - which settings are present, never their values
pub async fn check_environment(State(readiness): State<Arc<Readiness>>) -> impl IntoResponse {
    let config = &readiness.config;
    Json(json!({
        "openai_api_key_set": !config.openai_api_key.is_empty(),
        "docker_env": std::env::var("DOCKER_ENV").is_ok(),
        "sample_generation_enabled": config.allow_sample_generation,
        "environment": if config.is_development() { "development" } else { "production" },
    }))
}
