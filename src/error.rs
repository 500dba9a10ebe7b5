//! Error types for the collection engine
//!
//! None of these are fatal: callers log them and carry on.

use std::fmt;
use std::path::PathBuf;

/// Result type alias for collector operations
pub type CollectorResult<T> = Result<T, CollectorError>;

/// Errors that can occur while collecting logs or metrics
#[derive(Debug)]
pub enum CollectorError {
    /// Reading a tailed file failed
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Tailed file content is not valid UTF-8
    Encoding { path: PathBuf },

    /// Registering a file-system watch failed
    Watch {
        path: PathBuf,
        source: notify::Error,
    },

    /// Not a single host query succeeded
    HostUnavailable(String),

    /// The metrics sampler is not running
    SamplerStopped,
}

impl fmt::Display for CollectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectorError::Io { path, source } => {
                write!(f, "I/O error on {}: {}", path.display(), source)
            }
            CollectorError::Encoding { path } => {
                write!(f, "{} contains invalid UTF-8", path.display())
            }
            CollectorError::Watch { path, source } => {
                write!(f, "failed to watch {}: {}", path.display(), source)
            }
            CollectorError::HostUnavailable(msg) => {
                write!(f, "could not collect host metrics: {}", msg)
            }
            CollectorError::SamplerStopped => write!(f, "metrics sampler is not running"),
        }
    }
}

impl std::error::Error for CollectorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CollectorError::Io { source, .. } => Some(source),
            CollectorError::Watch { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl CollectorError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CollectorError::Io {
            path: path.into(),
            source,
        }
    }
}
