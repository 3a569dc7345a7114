use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::infrastructure::repositories::openai_speech_repository::DEFAULT_BASE_URL;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub log_format: LogFormat,
    // OpenAI
    pub openai_api_key: String,
    pub openai_base_url: String,
    // Storage
    pub output_dir: PathBuf,
    pub history_file: PathBuf,
    pub samples_dir: PathBuf,
    // Limits
    pub max_text_length: usize,
    pub max_upload_size_mb: usize,
    pub max_chunk_chars: usize,
    pub history_preview_length: usize,
    // Synthesis
    pub tts_max_retries: u32,
    pub tts_retry_delay_secs: u64,
    pub tts_request_timeout_secs: u64,
    pub tts_chunk_concurrency: usize,
    pub text_cache_ttl_minutes: u64,
    pub allow_sample_generation: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Box<dyn std::error::Error>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let default_host = if lookup("DOCKER_ENV").is_some() {
            "0.0.0.0"
        } else {
            "127.0.0.1"
        };
        let output_dir = PathBuf::from(var("OUTPUT_DIR", "output"));
        let history_file = lookup("HISTORY_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| output_dir.join("history.json"));

        let config = Config {
            host: var("HOST", default_host),
            port: parse(&lookup, "PORT", 5000)?,
            environment: match var("ENVIRONMENT", "development").as_str() {
                "production" => Environment::Production,
                _ => Environment::Development,
            },
            log_format: match var("LOG_FORMAT", "pretty").as_str() {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            openai_api_key: lookup("OPENAI_API_KEY")
                .filter(|key| !key.trim().is_empty())
                .ok_or("OPENAI_API_KEY must be set")?,
            openai_base_url: var("OPENAI_BASE_URL", DEFAULT_BASE_URL),
            output_dir,
            history_file,
            samples_dir: PathBuf::from(var("SAMPLES_DIR", "static/audio/samples")),
            max_text_length: parse(&lookup, "MAX_TEXT_LENGTH", 1_000_000)?,
            max_upload_size_mb: parse(&lookup, "MAX_UPLOAD_SIZE_MB", 150)?,
            max_chunk_chars: parse(&lookup, "MAX_CHUNK_CHARS", 3000)?,
            history_preview_length: parse(&lookup, "HISTORY_PREVIEW_LENGTH", 1000)?,
            tts_max_retries: parse(&lookup, "TTS_MAX_RETRIES", 3)?,
            tts_retry_delay_secs: parse(&lookup, "TTS_RETRY_DELAY_SECS", 2)?,
            tts_request_timeout_secs: parse(&lookup, "TTS_REQUEST_TIMEOUT_SECS", 120)?,
            tts_chunk_concurrency: parse(&lookup, "TTS_CHUNK_CONCURRENCY", 1)?,
            text_cache_ttl_minutes: parse(&lookup, "TEXT_CACHE_TTL_MINUTES", 30)?,
            allow_sample_generation: var("ALLOW_SAMPLE_GENERATION", "false").to_lowercase()
                == "true",
        };

        if config.max_chunk_chars == 0 {
            return Err("MAX_CHUNK_CHARS must be greater than zero".into());
        }

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_size_mb * 1024 * 1024
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.tts_retry_delay_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.tts_request_timeout_secs)
    }

    pub fn text_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.text_cache_ttl_minutes * 60)
    }
}

fn parse<F, T>(lookup: &F, key: &str, default: T) -> Result<T, Box<dyn std::error::Error>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| format!("invalid {}={:?}: {}", key, raw, e).into()),
        None => Ok(default),
    }
}
