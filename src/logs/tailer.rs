//! Incremental tailing of append-only log files
//!
//! The tailer keeps one byte offset per file. Every change notification reads
//! whatever was appended since that offset, hands each non-blank line to the
//! log store, and only then moves the offset forward. Notifications may be
//! duplicated or coalesced by the watcher; an unchanged file simply yields
//! nothing.
//!
//! A file that got smaller than its offset was truncated or rotated, so it is
//! re-read from the beginning. Offsets of deleted or renamed-away files are
//! dropped, so the map only holds files that still exist.

use std::collections::HashMap;
use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, trace};

use crate::error::{CollectorError, CollectorResult};
use crate::storage::BoundedLogStore;

/// Number of trailing lines ingested from a pre-existing file at startup
pub const SEED_LINES: usize = 10;

const LOG_EXTENSION: &str = "log";

/// Lines read from one file plus the offset just past them
#[derive(Debug)]
struct Chunk {
    lines: Vec<String>,
    end: u64,
}

#[derive(Debug)]
pub struct LogTailer {
    store: Arc<BoundedLogStore>,

    /// Absolute path -> bytes consumed so far.
    /// Held for the whole read-and-append so two notifications for the
    /// same file never interleave.
    offsets: Mutex<HashMap<PathBuf, u64>>,
}

impl LogTailer {
    pub fn new(store: Arc<BoundedLogStore>) -> Self {
        Self {
            store,
            offsets: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_log_file(path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == LOG_EXTENSION)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, u64>> {
        self.offsets.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Last consumed offset of `path`, if the file is tracked
    pub fn offset(&self, path: &Path) -> Option<u64> {
        self.lock().get(path).copied()
    }

    pub fn tracked_files(&self) -> usize {
        self.lock().len()
    }

    /// Stop tracking `path`. Returns whether it was tracked.
    pub fn forget(&self, path: &Path) -> bool {
        let forgotten = self.lock().remove(path).is_some();
        if forgotten {
            debug!("stopped tracking {}", path.display());
        }
        forgotten
    }

    /// Carry the offset of a renamed file over to its new name. A file renamed
    /// to a non-log name is no longer tracked.
    pub fn rename(&self, from: &Path, to: &Path) {
        let mut offsets = self.lock();
        let Some(offset) = offsets.remove(from) else {
            return;
        };

        if Self::is_log_file(to) {
            debug!("{} renamed to {}", from.display(), to.display());
            offsets.insert(to.to_path_buf(), offset);
        }
    }

    /// Ingest whatever was appended to `path` since the last call.
    ///
    /// Returns the number of lines delivered to the store. Read failures are
    /// logged and leave the offset untouched, so the next notification retries
    /// from the same position. A path that no longer exists is forgotten.
    pub fn on_file_changed(&self, path: &Path) -> usize {
        if !Self::is_log_file(path) || path.is_dir() {
            trace!("ignoring change on {}", path.display());
            return 0;
        }

        let mut offsets = self.lock();
        let offset = offsets.get(path).copied().unwrap_or(0);

        match read_from(path, offset) {
            Ok(Some(chunk)) => {
                for line in &chunk.lines {
                    self.store.append(path, line);
                }
                debug!(
                    "read {} new line(s) from {} (offset {offset} -> {})",
                    chunk.lines.len(),
                    path.display(),
                    chunk.end
                );
                offsets.insert(path.to_path_buf(), chunk.end);
                chunk.lines.len()
            }
            Ok(None) => {
                trace!("{} unchanged at offset {offset}", path.display());
                0
            }
            Err(CollectorError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                if offsets.remove(path).is_some() {
                    debug!("{} no longer exists, stopped tracking", path.display());
                }
                0
            }
            Err(e) => {
                error!("error processing log file {}: {e}", path.display());
                0
            }
        }
    }

    /// Ingest the last `lines` lines of a pre-existing file and start tracking
    /// it at its current end. Files that are already tracked are left alone.
    pub fn seed(&self, path: &Path, lines: usize) -> usize {
        if !Self::is_log_file(path) || path.is_dir() {
            return 0;
        }

        let mut offsets = self.lock();
        if offsets.contains_key(path) {
            trace!("{} already tracked, not seeding", path.display());
            return 0;
        }

        match read_from(path, 0) {
            Ok(Some(chunk)) => {
                let skip = chunk.lines.len().saturating_sub(lines);
                let seeded = &chunk.lines[skip..];
                for line in seeded {
                    self.store.append(path, line);
                }
                debug!(
                    "seeded {} line(s) from {} ({} bytes)",
                    seeded.len(),
                    path.display(),
                    chunk.end
                );
                offsets.insert(path.to_path_buf(), chunk.end);
                seeded.len()
            }
            Ok(None) => {
                offsets.insert(path.to_path_buf(), 0);
                0
            }
            Err(e) => {
                error!("error loading {}: {e}", path.display());
                0
            }
        }
    }
}

/// Read everything in `path` past `offset`.
///
/// `None` means the file has exactly `offset` bytes. A file shorter than
/// `offset` is read from the start.
fn read_from(path: &Path, offset: u64) -> CollectorResult<Option<Chunk>> {
    let mut file = File::open(path).map_err(|e| CollectorError::io(path, e))?;
    let size = file
        .metadata()
        .map_err(|e| CollectorError::io(path, e))?
        .len();

    if size == offset {
        return Ok(None);
    }

    let start = if size < offset {
        debug!(
            "{} shrank from {offset} to {size} bytes, reading from start",
            path.display()
        );
        0
    } else {
        offset
    };

    file.seek(SeekFrom::Start(start))
        .map_err(|e| CollectorError::io(path, e))?;

    let mut buf = Vec::with_capacity((size - start) as usize);
    file.take(size - start)
        .read_to_end(&mut buf)
        .map_err(|e| CollectorError::io(path, e))?;

    let end = start + buf.len() as u64;
    let text = String::from_utf8(buf).map_err(|_| CollectorError::Encoding {
        path: path.to_path_buf(),
    })?;

    let lines = text
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect();

    Ok(Some(Chunk { lines, end }))
}
