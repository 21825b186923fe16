//! docqc quality-control runtime
//!
//! Turns per-document extraction confidence scores into routing decisions
//! (auto-approve, standard/enhanced review, urgent review, manual validation),
//! keeps a TTL cache of classified documents, a prioritized human review
//! queue, a rolling confidence trend and aggregate quality statistics.

pub mod alerts;
pub mod cache;
pub mod config;
pub mod engine;
pub mod metrics;
pub mod review;
pub mod routing;
pub mod scheduler;
pub mod stats;
pub mod trend;
pub mod types;

#[cfg(feature = "http-api")]
pub mod api;

#[cfg(feature = "http-api")]
use async_trait::async_trait;

// Re-export commonly used types
pub use alerts::{Alert, AlertEvaluator, AlertSeverity, AlertType};
pub use cache::{CacheStats, ConfidenceCache};
pub use config::Config;
pub use engine::{QualityEngine, SubmitRequest};
pub use review::{ReviewItem, ReviewQueue};
pub use routing::{RoutingDecision, RoutingPath, ScoreClassifier};
pub use scheduler::MaintenanceLoop;
pub use stats::{DashboardSummary, HealthReport, MetricsSummary};
pub use trend::{TrendDirection, TrendReport, TrendTracker};
pub use types::*;

#[cfg(feature = "http-api")]
#[async_trait]
impl api::QualityApiProvider for QualityEngine {
    async fn submit(&self, request: SubmitRequest) -> Result<RoutingDecision, RuntimeError> {
        Ok(QualityEngine::submit(self, request)?)
    }

    async fn dashboard_stats(&self) -> Result<DashboardSummary, RuntimeError> {
        Ok(self.stats())
    }

    async fn review_items(
        &self,
        limit: usize,
        priority: Option<ReviewPriority>,
    ) -> Result<Vec<ReviewItem>, RuntimeError> {
        Ok(self.review_queue(limit, priority))
    }

    async fn review_counts(&self) -> Result<review::ReviewQueueSnapshot, RuntimeError> {
        Ok(self.review_queue_snapshot())
    }

    async fn alerts(&self) -> Result<Vec<Alert>, RuntimeError> {
        Ok(QualityEngine::alerts(self))
    }

    async fn resolve_review(
        &self,
        document_id: DocumentId,
        resolution: String,
    ) -> Result<bool, RuntimeError> {
        Ok(self.resolve(&document_id, resolution))
    }

    async fn metrics_summary(&self) -> Result<MetricsSummary, RuntimeError> {
        Ok(QualityEngine::metrics_summary(self))
    }

    async fn health(&self) -> Result<HealthReport, RuntimeError> {
        Ok(QualityEngine::health(self))
    }

    fn uptime_seconds(&self) -> u64 {
        (chrono::Utc::now() - self.started_at())
            .num_seconds()
            .max(0) as u64
    }
}
