use crate::domain::speech::{SpeechModel, Voice};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the generated text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SourceType {
    #[default]
    Text,
    #[serde(rename = "PDF")]
    Pdf,
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceType::Text => f.write_str("Text"),
            SourceType::Pdf => f.write_str("PDF"),
        }
    }
}

pub const TRUNCATION_MARKER: &str = "...";

/// One generation recorded in the history file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    /// Preview of the source text, suffixed with `...` when truncated
    pub text: String,
    pub voice: Voice,
    pub model: SpeechModel,
    pub filename: String,
    pub file_size: u64,
    #[serde(default)]
    pub source_type: SourceType,
    pub original_filename: String,
}

impl HistoryEntry {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        text: &str,
        preview_length: usize,
        voice: Voice,
        model: SpeechModel,
        filename: String,
        file_size: u64,
        source_type: SourceType,
        original_filename: String,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            text: preview(text, preview_length),
            voice,
            model,
            filename,
            file_size,
            source_type,
            original_filename,
        }
    }

    pub fn is_truncated(&self) -> bool {
        self.text.ends_with(TRUNCATION_MARKER)
    }

    /// The filename without its extension
    pub fn file_id(&self) -> &str {
        file_stem(&self.filename)
    }
}

/// Response item for GET /api/history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryItemResponse {
    #[serde(flatten)]
    pub entry: HistoryEntry,
    pub file_id: String,
    pub file_size_formatted: String,
}

impl From<HistoryEntry> for HistoryItemResponse {
    fn from(entry: HistoryEntry) -> Self {
        Self {
            file_id: entry.file_id().to_string(),
            file_size_formatted: format_file_size(entry.file_size),
            entry,
        }
    }
}

/// First `length` characters of `text`, marked when cut
pub fn preview(text: &str, length: usize) -> String {
    match text.char_indices().nth(length) {
        Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}

pub fn file_stem(filename: &str) -> &str {
    filename
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .filter(|stem| !stem.is_empty())
        .unwrap_or(filename)
}

/// Accept only bare file names that stay inside the output directory
pub fn is_safe_filename(filename: &str) -> bool {
    !filename.is_empty()
        && !filename.starts_with('.')
        && !filename.contains('/')
        && !filename.contains('\\')
        && !filename.contains("..")
}

/// Human readable size using decimal units ("1 Byte", "12.3 kB", "4.5 MB")
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["kB", "MB", "GB", "TB", "PB"];

    if bytes == 1 {
        return "1 Byte".to_string();
    }
    if bytes < 1000 {
        return format!("{} Bytes", bytes);
    }

    let mut value = bytes as f64 / 1000.0;
    let mut unit = 0;
    while value >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}
