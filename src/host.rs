//! Host metric queries
//!
//! [`HostProbe`] is the seam between the sampler and the operating system.
//! Every query can fail on its own; [`collect_snapshot`] turns a failed query
//! into a zeroed sub-metric and only gives up when nothing could be read.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{Context, bail};
use async_trait::async_trait;
use chrono::Utc;
use sysinfo::{Disks, MINIMUM_CPU_UPDATE_INTERVAL, Networks, ProcessesToUpdate, System};
use tracing::{trace, warn};

use crate::error::{CollectorError, CollectorResult};
use crate::{CpuMetrics, DiskMetrics, MemoryMetrics, MetricSnapshot, NetworkMetrics};

const BYTES_PER_GB: f64 = 1_073_741_824.0;

/// Point-in-time queries against the host
#[async_trait]
pub trait HostProbe: Send + Sync {
    /// CPU utilisation over a short sampling window
    async fn cpu(&self) -> anyhow::Result<CpuMetrics>;

    fn memory(&self) -> anyhow::Result<MemoryMetrics>;

    /// Usage of the volume holding the system root
    fn disk(&self) -> anyhow::Result<DiskMetrics>;

    fn process_count(&self) -> anyhow::Result<usize>;

    fn network(&self) -> anyhow::Result<NetworkMetrics>;
}

/// Gather one snapshot, degrading each failed query to zero.
///
/// Fails only if every single query failed.
pub async fn collect_snapshot(probe: &dyn HostProbe) -> CollectorResult<MetricSnapshot> {
    let mut failed = Vec::new();

    let cpu = degrade("cpu", probe.cpu().await, &mut failed);
    let memory = degrade("memory", probe.memory(), &mut failed);
    let disk = degrade("disk", probe.disk(), &mut failed);
    let processes = degrade("processes", probe.process_count(), &mut failed);
    let network = degrade("network", probe.network(), &mut failed);

    if failed.len() == 5 {
        return Err(CollectorError::HostUnavailable(format!(
            "every query failed ({})",
            failed.join(", ")
        )));
    }

    Ok(MetricSnapshot {
        timestamp: Utc::now(),
        cpu,
        memory,
        disk,
        processes,
        network,
    })
}

fn degrade<T: Default>(
    metric: &'static str,
    result: anyhow::Result<T>,
    failed: &mut Vec<&'static str>,
) -> T {
    result.unwrap_or_else(|e| {
        warn!("{metric} metrics unavailable, reporting zero: {e:#}");
        failed.push(metric);
        T::default()
    })
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn gigabytes(bytes: u64) -> f64 {
    round_to(bytes as f64 / BYTES_PER_GB, 2)
}

fn percent(part: u64, total: u64) -> f32 {
    round_to(part as f64 / total as f64 * 100.0, 1) as f32
}

fn system_root() -> &'static Path {
    if cfg!(windows) {
        Path::new("C:\\")
    } else {
        Path::new("/")
    }
}

/// [`HostProbe`] backed by the `sysinfo` crate
pub struct SysinfoProbe {
    system: Mutex<System>,
    /// Held for a whole two-refresh CPU window so windows never interleave
    cpu_window: tokio::sync::Mutex<()>,
}

impl SysinfoProbe {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
            cpu_window: tokio::sync::Mutex::new(()),
        }
    }

    fn system(&self) -> MutexGuard<'_, System> {
        self.system.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SysinfoProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HostProbe for SysinfoProbe {
    async fn cpu(&self) -> anyhow::Result<CpuMetrics> {
        let _window = self.cpu_window.lock().await;

        // usage is the delta between two refreshes
        self.system().refresh_cpu_usage();
        tokio::time::sleep(MINIMUM_CPU_UPDATE_INTERVAL).await;

        let mut sys = self.system();
        sys.refresh_cpu_usage();

        let count = sys.cpus().len();
        if count == 0 {
            bail!("no CPUs reported");
        }

        let usage = sys.global_cpu_usage();
        trace!("cpu usage {usage} over {count} cores");

        Ok(CpuMetrics {
            percent: round_to(usage as f64, 1) as f32,
            count,
        })
    }

    fn memory(&self) -> anyhow::Result<MemoryMetrics> {
        let mut sys = self.system();
        sys.refresh_memory();

        let total = sys.total_memory();
        if total == 0 {
            bail!("total memory reported as zero");
        }
        let unavailable = total.saturating_sub(sys.available_memory());

        Ok(MemoryMetrics {
            percent: percent(unavailable, total),
            used_gb: gigabytes(sys.used_memory()),
            total_gb: gigabytes(total),
        })
    }

    fn disk(&self) -> anyhow::Result<DiskMetrics> {
        let root = system_root();
        let disks = Disks::new_with_refreshed_list();

        let disk = disks
            .iter()
            .filter(|disk| root.starts_with(disk.mount_point()))
            .max_by_key(|disk| disk.mount_point().as_os_str().len())
            .with_context(|| format!("no disk mounted at {}", root.display()))?;

        let total = disk.total_space();
        if total == 0 {
            bail!("disk at {} reports zero size", root.display());
        }
        let used = total.saturating_sub(disk.available_space());

        Ok(DiskMetrics {
            percent: percent(used, total),
            used_gb: gigabytes(used),
            total_gb: gigabytes(total),
        })
    }

    fn process_count(&self) -> anyhow::Result<usize> {
        let mut sys = self.system();
        sys.refresh_processes(ProcessesToUpdate::All, true);

        let count = sys.processes().len();
        if count == 0 {
            bail!("process table is empty");
        }
        Ok(count)
    }

    fn network(&self) -> anyhow::Result<NetworkMetrics> {
        let networks = Networks::new_with_refreshed_list();
        if networks.is_empty() {
            bail!("no network interfaces found");
        }

        Ok(networks
            .iter()
            .fold(NetworkMetrics::default(), |acc, (_, data)| NetworkMetrics {
                bytes_sent: acc.bytes_sent + data.total_transmitted(),
                bytes_recv: acc.bytes_recv + data.total_received(),
                packets_sent: acc.packets_sent + data.total_packets_transmitted(),
                packets_recv: acc.packets_recv + data.total_packets_received(),
            }))
    }
}
