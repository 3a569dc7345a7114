use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("history file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("history serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("invalid filename: {0}")]
    InvalidFilename(String),
    #[error("audio file not found: {0}")]
    NotFound(String),
}

impl From<HistoryError> for AppError {
    fn from(err: HistoryError) -> Self {
        match err {
            HistoryError::InvalidFilename(name) => {
                AppError::BadRequest(format!("Invalid filename: {}", name))
            }
            HistoryError::NotFound(name) => AppError::NotFound(name),
            other => AppError::Internal(other.to_string()),
        }
    }
}
