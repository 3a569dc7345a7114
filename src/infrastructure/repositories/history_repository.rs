use crate::domain::history::{HistoryEntry, HistoryError};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Generation history kept as a JSON array on disk
pub struct HistoryRepository {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl HistoryRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the parent directory and an empty history file if missing
    pub async fn initialize(&self) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        if !tokio::fs::try_exists(&self.path).await? {
            tokio::fs::write(&self.path, b"[]").await?;
            tracing::info!(path = %self.path.display(), "Created empty history file");
        }
        Ok(())
    }

    pub async fn append(&self, entry: HistoryEntry) -> Result<(), HistoryError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load().await;
        entries.push(entry);
        self.save(&entries).await
    }

    /// All entries, newest first
    pub async fn list(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        let mut entries = self.load().await;
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(entries)
    }

    pub async fn find(&self, filename: &str) -> Result<Option<HistoryEntry>, HistoryError> {
        Ok(self
            .load()
            .await
            .into_iter()
            .find(|entry| entry.filename == filename))
    }

    /// Returns whether an entry was removed
    pub async fn remove(&self, filename: &str) -> Result<bool, HistoryError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load().await;
        let before = entries.len();
        entries.retain(|entry| entry.filename != filename);
        if entries.len() == before {
            return Ok(false);
        }
        self.save(&entries).await?;
        Ok(true)
    }

    /// Empties the history and returns what it held
    pub async fn clear(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        let _guard = self.write_lock.lock().await;
        let entries = self.load().await;
        self.save(&[]).await?;
        Ok(entries)
    }

    async fn load(&self) -> Vec<HistoryEntry> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read history");
                return Vec::new();
            }
        };

        match serde_json::from_slice(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "History file is corrupt, treating as empty");
                Vec::new()
            }
        }
    }

    async fn save(&self, entries: &[HistoryEntry]) -> Result<(), HistoryError> {
        let json = serde_json::to_vec_pretty(entries)?;
        let staging = self.path.with_extension("json.tmp");
        tokio::fs::write(&staging, json).await?;
        tokio::fs::rename(&staging, &self.path).await?;
        Ok(())
    }
}
