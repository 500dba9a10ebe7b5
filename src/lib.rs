pub mod actors;
#[cfg(feature = "api")]
pub mod api;
pub mod collector;
pub mod config;
pub mod error;
pub mod host;
pub mod logs;
pub mod storage;
pub mod util;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use collector::Collector;
pub use error::{CollectorError, CollectorResult};
pub use logs::{LogEntry, Severity};

/// One immutable point-in-time reading of the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    pub timestamp: DateTime<Utc>,
    pub cpu: CpuMetrics,
    pub memory: MemoryMetrics,
    pub disk: DiskMetrics,
    pub processes: usize,
    pub network: NetworkMetrics,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CpuMetrics {
    pub percent: f32,
    /// Logical core count
    pub count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryMetrics {
    pub percent: f32,
    pub used_gb: f64,
    pub total_gb: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DiskMetrics {
    pub percent: f32,
    pub used_gb: f64,
    pub total_gb: f64,
}

/// Cumulative interface counters, summed over all interfaces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkMetrics {
    pub bytes_sent: u64,
    pub bytes_recv: u64,
    pub packets_sent: u64,
    pub packets_recv: u64,
}
