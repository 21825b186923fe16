//! Dashboard snapshot export
//!
//! The maintenance loop periodically builds a [`QualitySnapshot`] and hands it
//! to a [`SnapshotExporter`]. Backends:
//! - **File**: JSON written atomically to disk
//! - **Log**: one structured `tracing` event per snapshot
//!
//! Several backends can run together via [`CompositeExporter`].

use crate::alerts::Alert;
use crate::stats::{DashboardSummary, HealthReport, MetricsSummary};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

pub mod file;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while exporting snapshots.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot export failed: {0}")]
    ExportFailed(String),

    #[error("snapshot configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Configuration types
// ---------------------------------------------------------------------------

/// File snapshot configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSnapshotConfig {
    /// Path to the output JSON file.
    pub path: PathBuf,

    /// Pretty-print JSON output.
    #[serde(default = "default_pretty_print")]
    pub pretty_print: bool,
}

fn default_pretty_print() -> bool {
    true
}

impl Default for FileSnapshotConfig {
    fn default() -> Self {
        Self {
            path: std::env::temp_dir().join("docqc_dashboard.json"),
            pretty_print: true,
        }
    }
}

/// Snapshot export configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Export a snapshot after every maintenance pass.
    #[serde(default)]
    pub enabled: bool,

    /// File exporter configuration.
    #[serde(default)]
    pub file: Option<FileSnapshotConfig>,

    /// Also emit each snapshot as a log event.
    #[serde(default)]
    pub log: bool,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            file: Some(FileSnapshotConfig::default()),
            log: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot type
// ---------------------------------------------------------------------------

/// Point-in-time view of everything the dashboard shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualitySnapshot {
    pub timestamp: DateTime<Utc>,
    pub summary: DashboardSummary,
    pub metrics: MetricsSummary,
    pub alerts: Vec<Alert>,
    pub health: HealthReport,
    /// Cache entries retired by the pass that produced this snapshot.
    pub swept_entries: usize,
}

// ---------------------------------------------------------------------------
// Exporter trait
// ---------------------------------------------------------------------------

/// Trait for snapshot export backends.
#[async_trait]
pub trait SnapshotExporter: Send + Sync {
    /// Export a snapshot to the backend.
    async fn export(&self, snapshot: &QualitySnapshot) -> Result<(), SnapshotError>;

    /// Flush pending data and release resources.
    async fn shutdown(&self) -> Result<(), SnapshotError>;
}

/// Writes a one-line summary of each snapshot through `tracing`.
pub struct LogExporter;

#[async_trait]
impl SnapshotExporter for LogExporter {
    async fn export(&self, snapshot: &QualitySnapshot) -> Result<(), SnapshotError> {
        tracing::info!(
            total_documents = snapshot.metrics.total_documents,
            average_confidence = snapshot.metrics.average_confidence,
            trend = %snapshot.metrics.confidence_trend,
            unresolved_reviews = snapshot.summary.review_queue.unresolved_count,
            active_cache_items = snapshot.summary.cache_stats.active_items,
            alerts = snapshot.alerts.len(),
            "Quality snapshot"
        );
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), SnapshotError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Composite exporter
// ---------------------------------------------------------------------------

/// Combines multiple exporters into a single exporter.
///
/// All backends are called on every export; individual failures are logged
/// but do not prevent other backends from running.
pub struct CompositeExporter {
    exporters: Vec<Arc<dyn SnapshotExporter>>,
}

impl CompositeExporter {
    pub fn new(exporters: Vec<Arc<dyn SnapshotExporter>>) -> Self {
        Self { exporters }
    }
}

#[async_trait]
impl SnapshotExporter for CompositeExporter {
    async fn export(&self, snapshot: &QualitySnapshot) -> Result<(), SnapshotError> {
        let mut last_error: Option<SnapshotError> = None;
        for exporter in &self.exporters {
            if let Err(e) = exporter.export(snapshot).await {
                tracing::warn!("Snapshot exporter failed: {}", e);
                last_error = Some(e);
            }
        }
        // Only a lone backend propagates its failure.
        match last_error {
            Some(e) if self.exporters.len() == 1 => Err(e),
            _ => Ok(()),
        }
    }

    async fn shutdown(&self) -> Result<(), SnapshotError> {
        for exporter in &self.exporters {
            if let Err(e) = exporter.shutdown().await {
                tracing::warn!("Snapshot exporter shutdown failed: {}", e);
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Build an exporter (or composite) from configuration.
pub fn create_exporter(config: &SnapshotConfig) -> Result<Arc<dyn SnapshotExporter>, SnapshotError> {
    let mut exporters: Vec<Arc<dyn SnapshotExporter>> = Vec::new();

    if let Some(ref file_cfg) = config.file {
        exporters.push(Arc::new(file::FileExporter::new(file_cfg.clone())?));
    }
    if config.log {
        exporters.push(Arc::new(LogExporter));
    }

    if exporters.is_empty() {
        return Err(SnapshotError::ConfigError(
            "No snapshot exporters configured (enable at least `file` or `log`)".to_string(),
        ));
    }

    if exporters.len() == 1 {
        Ok(exporters.remove(0))
    } else {
        Ok(Arc::new(CompositeExporter::new(exporters)))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
