use super::error::HistoryError;
use super::model::{is_safe_filename, HistoryItemResponse};
use super::{ClearHistoryResponse, DeleteGenerationResponse};
use crate::infrastructure::repositories::HistoryRepository;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct HistoryService {
    history_repo: Arc<HistoryRepository>,
    output_dir: PathBuf,
}

impl HistoryService {
    pub fn new(history_repo: Arc<HistoryRepository>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            history_repo,
            output_dir: output_dir.into(),
        }
    }

    fn output_path(&self, filename: &str) -> Result<PathBuf, HistoryError> {
        if !is_safe_filename(filename) {
            return Err(HistoryError::InvalidFilename(filename.to_string()));
        }
        Ok(self.output_dir.join(filename))
    }
}

#[async_trait]
pub trait HistoryServiceApi: Send + Sync {
    /// Past generations, newest first
    async fn list(&self) -> Result<Vec<HistoryItemResponse>, HistoryError>;

    /// Remove one generation's audio file and history entry
    async fn delete(&self, filename: &str) -> Result<DeleteGenerationResponse, HistoryError>;

    /// Remove every recorded audio file and empty the history
    async fn clear(&self) -> Result<ClearHistoryResponse, HistoryError>;

    /// Path of an existing generated audio file
    async fn audio_path(&self, filename: &str) -> Result<PathBuf, HistoryError>;
}

#[async_trait]
impl HistoryServiceApi for HistoryService {
    async fn list(&self) -> Result<Vec<HistoryItemResponse>, HistoryError> {
        let entries = self.history_repo.list().await?;
        Ok(entries.into_iter().map(HistoryItemResponse::from).collect())
    }

    async fn delete(&self, filename: &str) -> Result<DeleteGenerationResponse, HistoryError> {
        let path = self.output_path(filename)?;

        let file_deleted = remove_if_exists(&path).await?;
        let entry_removed = self.history_repo.remove(filename).await?;

        if !file_deleted && !entry_removed {
            return Err(HistoryError::NotFound(filename.to_string()));
        }

        tracing::info!(
            filename = %filename,
            file_deleted,
            entry_removed,
            "Generation deleted"
        );

        Ok(DeleteGenerationResponse {
            success: true,
            filename: filename.to_string(),
            file_deleted,
        })
    }

    async fn clear(&self) -> Result<ClearHistoryResponse, HistoryError> {
        let entries = self.history_repo.clear().await?;

        let mut files_deleted = 0;
        for entry in &entries {
            let Ok(path) = self.output_path(&entry.filename) else {
                tracing::warn!(filename = %entry.filename, "Skipping unsafe filename in history");
                continue;
            };
            match remove_if_exists(&path).await {
                Ok(true) => files_deleted += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to delete audio file")
                }
            }
        }

        tracing::info!(
            entries_removed = entries.len(),
            files_deleted,
            "History cleared"
        );

        Ok(ClearHistoryResponse {
            success: true,
            entries_removed: entries.len(),
            files_deleted,
        })
    }

    async fn audio_path(&self, filename: &str) -> Result<PathBuf, HistoryError> {
        let path = self.output_path(filename)?;
        if !tokio::fs::try_exists(&path).await? {
            return Err(HistoryError::NotFound(format!("File not found: {}", filename)));
        }
        Ok(path)
    }
}

async fn remove_if_exists(path: &Path) -> Result<bool, HistoryError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}
