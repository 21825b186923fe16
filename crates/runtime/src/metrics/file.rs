//! File-based snapshot exporter.
//!
//! Writes JSON snapshots atomically (`tempfile` + rename) so dashboards
//! polling the file never see a partial write.

use super::{FileSnapshotConfig, QualitySnapshot, SnapshotError, SnapshotExporter};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Exports quality snapshots as JSON files using atomic writes.
pub struct FileExporter {
    path: PathBuf,
    pretty_print: bool,
}

impl FileExporter {
    /// Create a new file exporter, ensuring the parent directory exists.
    pub fn new(config: FileSnapshotConfig) -> Result<Self, SnapshotError> {
        if let Some(parent) = config.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                SnapshotError::ConfigError(format!(
                    "Failed to create snapshot directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
        Ok(Self {
            path: config.path,
            pretty_print: config.pretty_print,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SnapshotExporter for FileExporter {
    async fn export(&self, snapshot: &QualitySnapshot) -> Result<(), SnapshotError> {
        let json = if self.pretty_print {
            serde_json::to_string_pretty(snapshot)?
        } else {
            serde_json::to_string(snapshot)?
        };

        let path = self.path.clone();
        tokio::task::spawn_blocking(move || -> Result<(), SnapshotError> {
            use std::io::Write;

            let parent = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
            tmp.write_all(json.as_bytes())?;
            tmp.flush()?;
            tmp.persist(&path).map_err(|e| {
                SnapshotError::ExportFailed(format!(
                    "Failed to persist snapshot file {}: {}",
                    path.display(),
                    e
                ))
            })?;
            Ok(())
        })
        .await
        .map_err(|e| SnapshotError::ExportFailed(format!("Blocking task panicked: {}", e)))??;

        tracing::debug!(path = %self.path.display(), "Quality snapshot written");
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), SnapshotError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::tests::sample_snapshot;

    #[tokio::test]
    async fn test_file_exporter_write_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.json");

        let exporter = FileExporter::new(FileSnapshotConfig {
            path: path.clone(),
            pretty_print: true,
        })
        .unwrap();

        exporter.export(&sample_snapshot()).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let loaded: QualitySnapshot = serde_json::from_str(&content).unwrap();
        assert_eq!(loaded.summary.quality_metrics.total_documents, 12);
        assert_eq!(loaded.swept_entries, 3);
    }

    #[tokio::test]
    async fn test_file_exporter_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deep").join("dashboard.json");

        let exporter = FileExporter::new(FileSnapshotConfig {
            path: path.clone(),
            pretty_print: false,
        })
        .unwrap();

        exporter.export(&sample_snapshot()).await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_file_exporter_compact_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compact.json");

        let exporter = FileExporter::new(FileSnapshotConfig {
            path: path.clone(),
            pretty_print: false,
        })
        .unwrap();

        exporter.export(&sample_snapshot()).await.unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.trim().contains('\n'));
    }

    #[tokio::test]
    async fn test_file_exporter_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overwrite.json");

        let exporter = FileExporter::new(FileSnapshotConfig {
            path: path.clone(),
            pretty_print: false,
        })
        .unwrap();

        let mut snapshot = sample_snapshot();
        exporter.export(&snapshot).await.unwrap();

        snapshot.swept_entries = 42;
        snapshot.metrics.total_documents = 99;
        exporter.export(&snapshot).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let loaded: QualitySnapshot = serde_json::from_str(&content).unwrap();
        assert_eq!(loaded.swept_entries, 42);
        assert_eq!(loaded.metrics.total_documents, 99);
    }
}
