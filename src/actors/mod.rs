//! Actor-based background workers
//!
//! Each actor runs as an independent tokio task and is controlled through an
//! mpsc command channel; request/response goes over oneshot channels.
//!
//! ```text
//!   SamplerHandle ──commands──▶ SamplerActor ──append──▶ BoundedMetricsStore
//!                                    ▲
//!                                    └── interval ticks
//! ```
//!
//! The log side has no actor: the file watcher calls the tailer directly on
//! its own thread, and both sides only meet the readers through the stores.

pub mod messages;
pub mod sampler;
