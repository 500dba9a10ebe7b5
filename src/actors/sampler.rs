//! SamplerActor - periodically samples host metrics into the metrics store
//!
//! ## Message Flow
//!
//! ```text
//! Timer tick → collect_snapshot → BoundedMetricsStore::append
//!     ↑
//!     └─── Commands (SampleNow, Shutdown)
//! ```
//!
//! Samples never overlap: the tick branch runs to completion before the next
//! command or tick is looked at. A shutdown that arrives mid-sample therefore
//! waits for at most one CPU sampling window.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info, instrument, warn};

use crate::error::{CollectorError, CollectorResult};
use crate::host::{HostProbe, collect_snapshot};
use crate::storage::BoundedMetricsStore;

use super::messages::SamplerCommand;

/// Upper bound on how long `stop` waits for the worker before aborting it
pub const STOP_TIMEOUT: Duration = Duration::from_secs(2);

/// Actor owning the sampling loop
pub struct SamplerActor {
    probe: Arc<dyn HostProbe>,

    store: Arc<BoundedMetricsStore>,

    /// Command receiver for control messages
    command_rx: mpsc::Receiver<SamplerCommand>,

    interval_duration: Duration,
}

impl SamplerActor {
    pub fn new(
        probe: Arc<dyn HostProbe>,
        store: Arc<BoundedMetricsStore>,
        command_rx: mpsc::Receiver<SamplerCommand>,
        interval_duration: Duration,
    ) -> Self {
        Self {
            probe,
            store,
            command_rx,
            interval_duration,
        }
    }

    /// Run until a Shutdown command arrives or every handle is gone
    #[instrument(skip(self), fields(interval = ?self.interval_duration))]
    pub async fn run(mut self) {
        debug!("starting sampler actor");

        let mut ticker = interval(self.interval_duration);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.sample().await {
                        warn!("skipping sampling cycle: {e}");
                    }
                }

                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(SamplerCommand::SampleNow { respond_to }) => {
                            debug!("received SampleNow command");
                            let result = self.sample().await;
                            let _ = respond_to.send(result);
                        }

                        Some(SamplerCommand::Shutdown) => {
                            debug!("received shutdown command");
                            break;
                        }

                        None => {
                            warn!("command channel closed, shutting down");
                            break;
                        }
                    }
                }
            }
        }

        debug!("sampler actor stopped");
    }

    async fn sample(&self) -> CollectorResult<()> {
        let snapshot = collect_snapshot(self.probe.as_ref()).await?;

        debug!(
            "CPU: {:5.1}% | Memory: {:5.1}% | Disk: {:5.1}% | Processes: {}",
            snapshot.cpu.percent,
            snapshot.memory.percent,
            snapshot.disk.percent,
            snapshot.processes
        );

        self.store.append(snapshot);
        Ok(())
    }
}

/// Handle to a spawned SamplerActor
pub struct SamplerHandle {
    sender: mpsc::Sender<SamplerCommand>,
    task: JoinHandle<()>,
}

impl SamplerHandle {
    /// Spawn a new sampler actor as a tokio task
    pub fn spawn(
        probe: Arc<dyn HostProbe>,
        store: Arc<BoundedMetricsStore>,
        interval_duration: Duration,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        let actor = SamplerActor::new(probe, store, cmd_rx, interval_duration);

        Self {
            sender: cmd_tx,
            task: tokio::spawn(actor.run()),
        }
    }

    /// Trigger an immediate sample
    pub async fn sample_now(&self) -> CollectorResult<()> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(SamplerCommand::SampleNow { respond_to: tx })
            .await
            .map_err(|_| CollectorError::SamplerStopped)?;

        rx.await.map_err(|_| CollectorError::SamplerStopped)?
    }

    /// Ask the actor to stop and wait for it, aborting after `timeout`
    pub async fn shutdown(self, timeout: Duration) {
        let SamplerHandle { sender, mut task } = self;

        // a full queue or a dead actor both end in the channel closing below
        let _ = sender.try_send(SamplerCommand::Shutdown);
        drop(sender);

        match tokio::time::timeout(timeout, &mut task).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!("sampler task failed: {e}"),
            Err(_) => {
                warn!("sampler did not stop within {timeout:?}, aborting");
                task.abort();
            }
        }
    }
}

/// Start/stop wrapper around a single sampler actor
///
/// Starting a running sampler and stopping a stopped one are both no-ops.
pub struct MetricsSampler {
    probe: Arc<dyn HostProbe>,
    store: Arc<BoundedMetricsStore>,
    handle: Mutex<Option<SamplerHandle>>,
    running: AtomicBool,
}

impl MetricsSampler {
    pub fn new(probe: Arc<dyn HostProbe>, store: Arc<BoundedMetricsStore>) -> Self {
        Self {
            probe,
            store,
            handle: Mutex::new(None),
            running: AtomicBool::new(false),
        }
    }

    /// Spawn the worker. Returns `false` if it was already running.
    pub async fn start(&self, interval_duration: Duration) -> bool {
        let mut slot = self.handle.lock().await;
        if slot.is_some() {
            warn!("metrics collection already running");
            return false;
        }

        *slot = Some(SamplerHandle::spawn(
            self.probe.clone(),
            self.store.clone(),
            interval_duration,
        ));
        self.running.store(true, Ordering::SeqCst);

        info!("metrics collection started (every {interval_duration:?})");
        true
    }

    pub async fn stop(&self) {
        let Some(handle) = self.handle.lock().await.take() else {
            debug!("metrics collection not running, nothing to stop");
            return;
        };

        self.running.store(false, Ordering::SeqCst);
        handle.shutdown(STOP_TIMEOUT).await;
        info!("metrics collection stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Take a sample right away on the running worker
    pub async fn sample_now(&self) -> CollectorResult<()> {
        match self.handle.lock().await.as_ref() {
            Some(handle) => handle.sample_now().await,
            None => Err(CollectorError::SamplerStopped),
        }
    }
}
