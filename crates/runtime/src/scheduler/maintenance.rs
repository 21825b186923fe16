//! Periodic maintenance loop.
//!
//! Every `sweep_interval` the loop retires expired cache entries, rebuilds the
//! dashboard snapshot, purges the retired entries and, when configured, exports
//! the snapshot. `shutdown` clears an `is_running` flag and wakes the loop
//! through a `Notify`; the flag is checked at the top of each pass, so a pass
//! in progress always completes.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::engine::QualityEngine;
use crate::metrics::SnapshotExporter;

/// Counters describing the loop's own activity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaintenanceStats {
    pub passes: u64,
    pub swept_entries: u64,
    pub export_failures: u64,
}

/// Background task driving cache sweeps and snapshot refreshes.
pub struct MaintenanceLoop {
    engine: Arc<QualityEngine>,
    exporter: Option<Arc<dyn SnapshotExporter>>,
    sweep_interval: Duration,
    shutdown_notify: Arc<Notify>,
    is_running: Arc<RwLock<bool>>,
    stats: Arc<RwLock<MaintenanceStats>>,
    handle: RwLock<Option<JoinHandle<()>>>,
}

impl MaintenanceLoop {
    pub fn new(
        engine: Arc<QualityEngine>,
        exporter: Option<Arc<dyn SnapshotExporter>>,
        sweep_interval: Duration,
    ) -> Self {
        Self {
            engine,
            exporter,
            sweep_interval,
            shutdown_notify: Arc::new(Notify::new()),
            is_running: Arc::new(RwLock::new(false)),
            stats: Arc::new(RwLock::new(MaintenanceStats::default())),
            handle: RwLock::new(None),
        }
    }

    /// Spawn the loop on the current Tokio runtime. Calling it twice is a no-op.
    pub fn start(&self) {
        {
            let mut is_running = self.is_running.write();
            if *is_running {
                return;
            }
            *is_running = true;
        }

        let engine = self.engine.clone();
        let exporter = self.exporter.clone();
        let shutdown = self.shutdown_notify.clone();
        let is_running = self.is_running.clone();
        let stats = self.stats.clone();
        let period = self.sweep_interval;

        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; skip it so the first pass
            // happens one period after startup.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if !*is_running.read() {
                            break;
                        }
                        run_pass(&engine, exporter.as_deref(), &stats).await;
                    }
                    _ = shutdown.notified() => {
                        break;
                    }
                }
            }

            tracing::debug!("Maintenance loop exited");
        });

        *self.handle.write() = Some(handle);
        tracing::info!(interval = ?period, "Maintenance loop started");
    }

    /// Stop the loop and wait for it to exit. Idempotent.
    pub async fn shutdown(&self) {
        {
            let mut is_running = self.is_running.write();
            if !*is_running {
                return;
            }
            *is_running = false;
        }
        self.shutdown_notify.notify_one();

        let handle = self.handle.write().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::warn!("Maintenance loop task failed: {}", e);
            }
        }

        if let Some(exporter) = &self.exporter {
            if let Err(e) = exporter.shutdown().await {
                tracing::warn!("Snapshot exporter shutdown failed: {}", e);
            }
        }
        tracing::info!("Maintenance loop shutdown complete");
    }

    /// Run one pass immediately on the caller's task.
    pub async fn run_once(&self) {
        run_pass(&self.engine, self.exporter.as_deref(), &self.stats).await;
    }

    pub fn is_running(&self) -> bool {
        *self.is_running.read()
    }

    pub fn stats(&self) -> MaintenanceStats {
        self.stats.read().clone()
    }
}

/// Standalone helper so the spawned task can call it without `&self`.
async fn run_pass(
    engine: &QualityEngine,
    exporter: Option<&dyn SnapshotExporter>,
    stats: &RwLock<MaintenanceStats>,
) {
    let snapshot = engine.run_maintenance();

    let mut export_failed = false;
    if let Some(exporter) = exporter {
        if let Err(e) = exporter.export(&snapshot).await {
            tracing::error!("Snapshot export failed: {}", e);
            export_failed = true;
        }
    }

    {
        let mut stats = stats.write();
        stats.passes += 1;
        stats.swept_entries += snapshot.swept_entries as u64;
        if export_failed {
            stats.export_failures += 1;
        }
    }

    tracing::debug!(
        swept = snapshot.swept_entries,
        active = snapshot.summary.cache_stats.active_items,
        alerts = snapshot.alerts.len(),
        "Maintenance pass complete"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SubmitRequest;
    use crate::metrics::file::FileExporter;
    use crate::metrics::{FileSnapshotConfig, QualitySnapshot};

    #[tokio::test]
    async fn test_run_once_refreshes_snapshot() {
        let engine = Arc::new(QualityEngine::default());
        engine.submit(SubmitRequest::new("a", 0.55)).unwrap();

        let maintenance = MaintenanceLoop::new(engine.clone(), None, Duration::from_secs(60));
        maintenance.run_once().await;

        let snapshot = engine.last_snapshot().unwrap();
        assert_eq!(snapshot.summary.quality_metrics.total_documents, 1);
        assert_eq!(maintenance.stats().passes, 1);
    }

    #[tokio::test]
    async fn test_loop_ticks_and_exports() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.json");
        let exporter: Arc<dyn SnapshotExporter> = Arc::new(
            FileExporter::new(FileSnapshotConfig {
                path: path.clone(),
                pretty_print: false,
            })
            .unwrap(),
        );

        let engine = Arc::new(QualityEngine::default());
        engine.submit(SubmitRequest::new("a", 0.9)).unwrap();

        let maintenance =
            MaintenanceLoop::new(engine.clone(), Some(exporter), Duration::from_millis(50));
        maintenance.start();
        assert!(maintenance.is_running());

        tokio::time::sleep(Duration::from_millis(300)).await;
        maintenance.shutdown().await;

        assert!(!maintenance.is_running());
        assert!(maintenance.stats().passes >= 1);
        let content = std::fs::read_to_string(&path).unwrap();
        let snapshot: QualitySnapshot = serde_json::from_str(&content).unwrap();
        assert_eq!(snapshot.metrics.total_documents, 1);
    }

    #[tokio::test]
    async fn test_shutdown_stops_passes() {
        let engine = Arc::new(QualityEngine::default());
        let maintenance = MaintenanceLoop::new(engine, None, Duration::from_millis(20));
        maintenance.start();
        tokio::time::sleep(Duration::from_millis(100)).await;
        maintenance.shutdown().await;

        let passes = maintenance.stats().passes;
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(maintenance.stats().passes, passes);
    }

    #[tokio::test]
    async fn test_shutdown_is_idempotent() {
        let engine = Arc::new(QualityEngine::default());
        let maintenance = MaintenanceLoop::new(engine, None, Duration::from_secs(60));
        maintenance.shutdown().await;
        maintenance.start();
        maintenance.start();
        maintenance.shutdown().await;
        maintenance.shutdown().await;
        assert!(!maintenance.is_running());
    }
}
