//! In-memory bounded stores
//!
//! Both stores are fixed-capacity FIFO rings guarded by a single mutex each.
//! Writers (the tailer and the sampler) append; any number of readers take
//! copies. Nothing is persisted: all data is lost on restart.
//!
//! - [`BoundedLogStore`]: classified log lines plus cumulative per-level counters
//! - [`BoundedMetricsStore`]: metric snapshot history

pub mod logs;
pub mod metrics;
pub mod ring;

pub use logs::{BoundedLogStore, LogStats};
pub use metrics::BoundedMetricsStore;
pub use ring::Ring;
