//! Bounded, thread-safe history of metric snapshots

use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::trace;

use crate::MetricSnapshot;

use super::ring::Ring;

#[derive(Debug)]
pub struct BoundedMetricsStore {
    samples: Mutex<Ring<MetricSnapshot>>,
}

impl BoundedMetricsStore {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            samples: Mutex::new(Ring::new(capacity)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Ring<MetricSnapshot>> {
        self.samples.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn append(&self, snapshot: MetricSnapshot) {
        let evicted = self.lock().push(snapshot);
        if let Some(evicted) = evicted {
            trace!("evicted snapshot from {}", evicted.timestamp);
        }
    }

    /// The `limit` most recent snapshots (or all), oldest first
    pub fn history(&self, limit: Option<usize>) -> Vec<MetricSnapshot> {
        self.lock().tail_where(limit, |_| true)
    }

    pub fn latest(&self) -> Option<MetricSnapshot> {
        self.lock().back().cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.lock().capacity()
    }
}
