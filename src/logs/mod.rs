//! Log ingestion: severity detection, entries, and file tailing

pub mod severity;
pub mod tailer;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use severity::Severity;
pub use tailer::LogTailer;

/// A single classified log line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Capture time, not the time written in the line
    pub timestamp: DateTime<Utc>,

    /// File name of the source
    pub file: String,

    pub full_path: PathBuf,

    pub message: String,

    pub level: Severity,
}

impl LogEntry {
    pub fn new(path: &Path, message: impl Into<String>) -> Self {
        let message = message.into();
        let file = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Self {
            timestamp: Utc::now(),
            file,
            full_path: path.to_path_buf(),
            level: Severity::classify(&message),
            message,
        }
    }
}
