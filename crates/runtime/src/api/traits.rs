//! API abstraction traits for the HTTP API
//!
//! Handlers only see [`QualityApiProvider`], so the router can be tested
//! against any implementation.

use async_trait::async_trait;

use crate::alerts::Alert;
use crate::engine::SubmitRequest;
use crate::review::{ReviewItem, ReviewQueueSnapshot};
use crate::routing::RoutingDecision;
use crate::stats::{DashboardSummary, HealthReport, MetricsSummary};
use crate::types::{DocumentId, ReviewPriority, RuntimeError};

/// Trait providing API access to the quality engine
#[async_trait]
pub trait QualityApiProvider: Send + Sync {
    /// Classify and route a scored document
    async fn submit(&self, request: SubmitRequest) -> Result<RoutingDecision, RuntimeError>;

    /// Cache, metrics and trend overview
    async fn dashboard_stats(&self) -> Result<DashboardSummary, RuntimeError>;

    /// Unresolved review items, highest priority first
    async fn review_items(
        &self,
        limit: usize,
        priority: Option<ReviewPriority>,
    ) -> Result<Vec<ReviewItem>, RuntimeError>;

    /// Counts of unresolved items per priority
    async fn review_counts(&self) -> Result<ReviewQueueSnapshot, RuntimeError>;

    /// Active alerts in evaluation order
    async fn alerts(&self) -> Result<Vec<Alert>, RuntimeError>;

    /// Resolve a pending review; `false` when there was nothing to resolve
    async fn resolve_review(
        &self,
        document_id: DocumentId,
        resolution: String,
    ) -> Result<bool, RuntimeError>;

    async fn metrics_summary(&self) -> Result<MetricsSummary, RuntimeError>;

    async fn health(&self) -> Result<HealthReport, RuntimeError>;

    /// Seconds since the provider was created
    fn uptime_seconds(&self) -> u64;
}
