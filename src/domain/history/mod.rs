pub mod error;
pub mod model;
pub mod service;

pub use error::HistoryError;
pub use model::{
    file_stem, format_file_size, is_safe_filename, preview, HistoryEntry, HistoryItemResponse,
    SourceType,
};
pub use service::{HistoryService, HistoryServiceApi};
use serde::{Deserialize, Serialize};

/// Response for DELETE /api/history/:filename
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteGenerationResponse {
    pub success: bool,
    pub filename: String,
    pub file_deleted: bool,
}

/// Response for DELETE /api/history
#[derive(Debug, Serialize, Deserialize)]
pub struct ClearHistoryResponse {
    pub success: bool,
    pub entries_removed: usize,
    pub files_deleted: usize,
}
