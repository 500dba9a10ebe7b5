//! Bounded, thread-safe store of classified log entries
//!
//! The ring and the cumulative counters live behind one mutex so a reader
//! can never see an entry without its count (or the other way round).
//! Counters are never decremented on eviction: they describe everything
//! ingested since startup, not what the ring currently holds.

use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::logs::{LogEntry, Severity};

use super::ring::Ring;

/// Cumulative ingestion counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogStats {
    pub total_entries: u64,
    pub error_count: u64,
    pub warning_count: u64,
    pub info_count: u64,
    pub debug_count: u64,
    pub unknown_count: u64,
}

impl LogStats {
    fn record(&mut self, level: Severity) {
        self.total_entries += 1;
        *self.count_mut(level) += 1;
    }

    fn count_mut(&mut self, level: Severity) -> &mut u64 {
        match level {
            Severity::Error => &mut self.error_count,
            Severity::Warning => &mut self.warning_count,
            Severity::Info => &mut self.info_count,
            Severity::Debug => &mut self.debug_count,
            Severity::Unknown => &mut self.unknown_count,
        }
    }

    pub fn count(&self, level: Severity) -> u64 {
        match level {
            Severity::Error => self.error_count,
            Severity::Warning => self.warning_count,
            Severity::Info => self.info_count,
            Severity::Debug => self.debug_count,
            Severity::Unknown => self.unknown_count,
        }
    }
}

#[derive(Debug)]
struct Inner {
    entries: Ring<LogEntry>,
    stats: LogStats,
}

#[derive(Debug)]
pub struct BoundedLogStore {
    inner: Mutex<Inner>,
}

impl BoundedLogStore {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: Ring::new(capacity),
                stats: LogStats::default(),
            }),
        }
    }

    // A panic while holding the lock cannot leave the ring and counters
    // half-updated, so a poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Classify `line` and store it, returning the detected severity
    pub fn append(&self, path: &Path, line: &str) -> Severity {
        let entry = LogEntry::new(path, line);
        let level = entry.level;

        {
            let mut inner = self.lock();
            inner.entries.push(entry);
            inner.stats.record(level);
        }

        trace!("[{level}] {}: {line}", path.display());
        level
    }

    /// The `limit` most recent entries (optionally of one level), oldest first
    pub fn recent(&self, limit: Option<usize>, level: Option<Severity>) -> Vec<LogEntry> {
        self.lock()
            .entries
            .tail_where(limit, |entry| level.is_none_or(|level| entry.level == level))
    }

    pub fn stats(&self) -> LogStats {
        self.lock().stats
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.lock().entries.capacity()
    }
}
