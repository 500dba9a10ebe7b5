//! Collector facade
//!
//! Owns the two stores, the tailer, the sampler and one file watcher per
//! monitored directory. Everything the API layer and the binary need goes
//! through here; the facade itself only wires things together and delegates.
//!
//! ```text
//!   notify watcher ──▶ LogTailer ──▶ BoundedLogStore ◀──┐
//!                                                      ├── readers (API)
//!   SamplerActor ─────────────────▶ BoundedMetricsStore ◀┘
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::actors::sampler::MetricsSampler;
use crate::config::Config;
use crate::error::{CollectorError, CollectorResult};
use crate::host::{HostProbe, SysinfoProbe, collect_snapshot};
use crate::logs::tailer::SEED_LINES;
use crate::logs::{LogEntry, LogTailer, Severity};
use crate::storage::{BoundedLogStore, BoundedMetricsStore, LogStats};
use crate::MetricSnapshot;

pub struct Collector {
    config: Config,
    probe: Arc<dyn HostProbe>,
    log_store: Arc<BoundedLogStore>,
    metrics_store: Arc<BoundedMetricsStore>,
    tailer: Arc<LogTailer>,
    sampler: MetricsSampler,

    /// One subscription per monitored directory; dropping one ends it
    watchers: Mutex<Vec<RecommendedWatcher>>,

    running: AtomicBool,
}

impl Collector {
    pub fn new(config: Config) -> Self {
        Self::with_probe(config, Arc::new(SysinfoProbe::new()))
    }

    pub fn with_probe(config: Config, probe: Arc<dyn HostProbe>) -> Self {
        let log_store = Arc::new(BoundedLogStore::new(config.logging.max_entries));
        let metrics_store = Arc::new(BoundedMetricsStore::new(config.metrics.max_samples));
        let tailer = Arc::new(LogTailer::new(log_store.clone()));
        let sampler = MetricsSampler::new(probe.clone(), metrics_store.clone());

        Self {
            config,
            probe,
            log_store,
            metrics_store,
            tailer,
            sampler,
            watchers: Mutex::new(Vec::new()),
            running: AtomicBool::new(false),
        }
    }

    /// Start sampling, seed the store with the tail of each existing log
    /// file, then watch every configured directory.
    ///
    /// Seeding happens before any watcher exists, so a file being written
    /// during startup still only contributes its tail. Lines appended between
    /// the seed and the watch are picked up by one catch-up pass.
    #[instrument(skip(self))]
    pub async fn start(&self, metrics_interval: Duration) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("collector already running");
            return;
        }

        info!("starting log & metrics collector");
        self.sampler.start(metrics_interval).await;

        let directories = self.prepare_directories();

        let tailer = self.tailer.clone();
        let seed_dirs = directories.clone();
        let files = run_blocking(move || seed_directories(&tailer, &seed_dirs))
            .await
            .unwrap_or_default();

        self.watch_directories(&directories);

        let tailer = self.tailer.clone();
        let caught_up = run_blocking(move || {
            files
                .iter()
                .map(|path| tailer.on_file_changed(path))
                .sum::<usize>()
        })
        .await
        .unwrap_or_default();
        if caught_up > 0 {
            debug!("caught up on {caught_up} line(s) written during startup");
        }

        info!("all monitoring systems active");
    }

    /// Stop sampling and drop all watchers. Safe to call at any time.
    #[instrument(skip(self))]
    pub async fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            info!("stopping monitoring systems");
        }

        self.sampler.stop().await;

        let watchers = std::mem::take(
            &mut *self.watchers.lock().unwrap_or_else(PoisonError::into_inner),
        );
        if !watchers.is_empty() {
            debug!("dropping {} directory watcher(s)", watchers.len());
        }
    }

    /// Create missing directories and resolve each to its canonical path.
    /// Watcher events carry absolute paths; offsets must use the same keys.
    fn prepare_directories(&self) -> Vec<PathBuf> {
        let mut directories = Vec::new();

        for dir in &self.config.logging.directories {
            if !dir.exists() {
                warn!("log directory not found: {}", dir.display());
                if let Err(e) = fs::create_dir_all(dir) {
                    error!("failed to create log directory {}: {e}", dir.display());
                    continue;
                }
                info!("created log directory: {}", dir.display());
            }

            directories.push(fs::canonicalize(dir).unwrap_or_else(|_| dir.clone()));
        }

        directories
    }

    fn watch_directories(&self, directories: &[PathBuf]) {
        let mut watchers = self.watchers.lock().unwrap_or_else(PoisonError::into_inner);

        for dir in directories {
            match self.watch(dir) {
                Ok(watcher) => {
                    info!("monitoring log directory: {}", dir.display());
                    watchers.push(watcher);
                }
                Err(e) => error!("{e}"),
            }
        }
    }

    fn watch(&self, dir: &Path) -> CollectorResult<RecommendedWatcher> {
        let tailer = self.tailer.clone();
        let watch_error = |source: notify::Error| CollectorError::Watch {
            path: dir.to_path_buf(),
            source,
        };

        let mut watcher =
            notify::recommended_watcher(move |result: notify::Result<Event>| match result {
                Ok(event) => dispatch(&tailer, &event),
                Err(e) => warn!("file watch error: {e}"),
            })
            .map_err(watch_error)?;

        watcher
            .watch(dir, RecursiveMode::Recursive)
            .map_err(watch_error)?;

        Ok(watcher)
    }

    /// A fresh snapshot, independent of the sampler
    pub async fn current_metrics(&self) -> CollectorResult<MetricSnapshot> {
        collect_snapshot(self.probe.as_ref()).await
    }

    /// Trigger an immediate sample on the running sampler
    pub async fn sample_now(&self) -> CollectorResult<()> {
        self.sampler.sample_now().await
    }

    pub fn metrics_history(&self, limit: Option<usize>) -> Vec<MetricSnapshot> {
        self.metrics_store.history(limit)
    }

    pub fn recent_logs(&self, limit: Option<usize>, level: Option<Severity>) -> Vec<LogEntry> {
        self.log_store.recent(limit, level)
    }

    pub fn log_stats(&self) -> LogStats {
        self.log_store.stats()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tailer(&self) -> &Arc<LogTailer> {
        &self.tailer
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn is_sampling(&self) -> bool {
        self.sampler.is_running()
    }

    pub fn status(&self) -> CollectorStatus {
        let running = self.is_running();

        CollectorStatus {
            status: if running {
                RunState::Running
            } else {
                RunState::Stopped
            },
            timestamp: Utc::now(),
            components: ComponentStatus {
                metrics_collector: SamplerStatus {
                    active: self.is_sampling(),
                    samples_collected: self.metrics_store.len(),
                    max_samples: self.metrics_store.capacity(),
                },
                log_monitor: LogMonitorStatus {
                    active: running,
                    entries_collected: self.log_store.len(),
                    max_entries: self.log_store.capacity(),
                    monitored_directories: self.config.logging.directories.clone(),
                    tracked_files: self.tailer.tracked_files(),
                },
            },
            configuration: ConfigurationSummary {
                metrics_interval: self.config.metrics.collection_interval_seconds.get(),
                api_host: self.config.api.host.to_string(),
                api_port: self.config.api.port,
            },
        }
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            samples_collected: self.metrics_store.len(),
            latest: self.metrics_store.latest(),
            log_stats: self.log_stats(),
        }
    }
}

/// Run file I/O off the async workers
async fn run_blocking<T, F>(task: F) -> Option<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .inspect_err(|e| error!("log bootstrap task failed: {e}"))
        .ok()
}

/// Seed every `.log` file directly inside `directories` and return all of
/// them, including files that were already tracked.
fn seed_directories(tailer: &LogTailer, directories: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for dir in directories {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                error!("failed to list {}: {e}", dir.display());
                continue;
            }
        };

        let logs: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && LogTailer::is_log_file(path))
            .collect();

        let seeded: usize = logs.iter().map(|path| tailer.seed(path, SEED_LINES)).sum();
        debug!("loaded {seeded} existing line(s) from {}", dir.display());

        files.extend(logs);
    }

    files
}

/// Route one watcher event to the tailer
fn dispatch(tailer: &LogTailer, event: &Event) {
    match event.kind {
        EventKind::Remove(_) | EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            for path in &event.paths {
                tailer.forget(path);
            }
        }

        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            if let [from, to] = event.paths.as_slice() {
                tailer.rename(from, to);
                tailer.on_file_changed(to);
            }
        }

        EventKind::Create(_) | EventKind::Modify(_) => {
            for path in &event.paths {
                tailer.on_file_changed(path);
            }
        }

        _ => {}
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Running,
    Stopped,
}

/// Aggregated health and configuration overview
#[derive(Debug, Clone, Serialize)]
pub struct CollectorStatus {
    pub status: RunState,
    pub timestamp: DateTime<Utc>,
    pub components: ComponentStatus,
    pub configuration: ConfigurationSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComponentStatus {
    pub metrics_collector: SamplerStatus,
    pub log_monitor: LogMonitorStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct SamplerStatus {
    pub active: bool,
    pub samples_collected: usize,
    pub max_samples: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogMonitorStatus {
    pub active: bool,
    pub entries_collected: usize,
    pub max_entries: usize,
    pub monitored_directories: Vec<PathBuf>,
    pub tracked_files: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigurationSummary {
    /// Seconds between samples
    pub metrics_interval: u64,
    pub api_host: String,
    pub api_port: u16,
}

/// End-of-session report
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub samples_collected: usize,
    pub latest: Option<MetricSnapshot>,
    pub log_stats: LogStats,
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "collected {} metric samples", self.samples_collected)?;
        if let Some(latest) = &self.latest {
            writeln!(
                f,
                "final CPU: {}% | memory: {}% | disk: {}%",
                latest.cpu.percent, latest.memory.percent, latest.disk.percent
            )?;
        }
        let stats = &self.log_stats;
        write!(
            f,
            "log entries: {} total, {} errors, {} warnings, {} info",
            stats.total_entries, stats.error_count, stats.warning_count, stats.info_count
        )
    }
}
