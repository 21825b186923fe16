//! Quality engine
//!
//! Owns one instance of each component and implements `submit` plus the query
//! API. Every component guards its own state; no method here holds more than
//! one component lock at a time, so there is no lock ordering to get wrong.
//! Construct one engine per deployment and share it behind an `Arc`.

use crate::alerts::{Alert, AlertEvaluator};
use crate::cache::{CacheStats, ConfidenceCache};
use crate::config::Config;
use crate::metrics::QualitySnapshot;
use crate::review::{ReviewItem, ReviewQueue, ReviewQueueSnapshot};
use crate::routing::{Classification, RoutingDecision, RoutingError, RoutingResult, ScoreClassifier};
use crate::stats::{DashboardSummary, HealthReport, MetricsSummary, QualityMetrics, StatsAggregator};
use crate::trend::{TrendReport, TrendTracker};
use crate::types::{DocumentId, Metadata, ReviewPriority, ScoredDocument};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Inbound call from the extraction pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "http-api", derive(utoipa::ToSchema))]
pub struct SubmitRequest {
    pub document_id: DocumentId,
    pub confidence_score: f64,
    #[serde(default)]
    pub is_safety_critical: bool,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    #[cfg_attr(feature = "http-api", schema(value_type = Object))]
    pub metadata: Metadata,
}

impl SubmitRequest {
    pub fn new(document_id: impl Into<DocumentId>, confidence_score: f64) -> Self {
        Self {
            document_id: document_id.into(),
            confidence_score,
            is_safety_critical: false,
            category: String::new(),
            metadata: Metadata::new(),
        }
    }

    pub fn safety_critical(mut self, is_safety_critical: bool) -> Self {
        self.is_safety_critical = is_safety_critical;
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Confidence-based quality control engine
pub struct QualityEngine {
    classifier: ScoreClassifier,
    cache: ConfidenceCache,
    review_queue: ReviewQueue,
    trend: TrendTracker,
    alert_evaluator: AlertEvaluator,
    metrics: QualityMetrics,
    last_snapshot: RwLock<Option<Arc<QualitySnapshot>>>,
    started_at: DateTime<Utc>,
}

impl Default for QualityEngine {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl QualityEngine {
    /// Build an engine from (already validated) configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            classifier: ScoreClassifier::new(&config.routing),
            cache: ConfidenceCache::new(),
            review_queue: ReviewQueue::new(config.review.resolved_retention),
            trend: TrendTracker::new(&config.trend),
            alert_evaluator: AlertEvaluator::new(config.alerts.clone()),
            metrics: QualityMetrics::new(),
            last_snapshot: RwLock::new(None),
            started_at: Utc::now(),
        }
    }

    /// Classify a document and apply the decision: cache it, queue it for
    /// review when required, record the score for trend tracking and count it.
    pub fn submit(&self, request: SubmitRequest) -> RoutingResult<RoutingDecision> {
        self.submit_at(request, Utc::now())
    }

    pub fn submit_at(
        &self,
        request: SubmitRequest,
        now: DateTime<Utc>,
    ) -> RoutingResult<RoutingDecision> {
        if request.document_id.as_str().trim().is_empty() {
            return Err(RoutingError::InvalidDocumentId {
                reason: "document id must not be empty".to_string(),
            });
        }

        let SubmitRequest {
            document_id,
            confidence_score,
            is_safety_critical,
            category,
            metadata,
        } = request;

        let classification = self
            .classifier
            .classify(confidence_score, is_safety_critical)?;
        let decision = RoutingDecision::from_classification(
            document_id.clone(),
            confidence_score,
            classification,
            now,
        );

        let document = ScoredDocument::new(
            document_id.clone(),
            confidence_score,
            is_safety_critical,
            category.clone(),
            metadata.clone(),
            now,
        )?;
        self.cache
            .put_at(document, classification.cache_ttl_seconds, now);

        if let (Some(priority), Some(reason)) = (
            decision.review_priority,
            decision.path.review_reason(),
        ) {
            let item = ReviewItem::new(
                document_id.clone(),
                confidence_score,
                decision.band,
                priority,
                reason,
                now,
            )
            .with_category(category)
            .with_metadata(metadata);
            self.review_queue.enqueue(item);
        }

        self.trend.record_at(confidence_score, now);
        self.metrics.record(&decision);

        if decision.is_safety_critical_low {
            tracing::warn!(
                document_id = %document_id,
                score = confidence_score,
                floor = self.classifier.safety_critical_floor(),
                "Safety critical document below confidence floor"
            );
        } else {
            tracing::debug!(
                document_id = %document_id,
                score = confidence_score,
                band = %decision.band,
                path = %decision.path,
                "Document routed"
            );
        }

        Ok(decision)
    }

    /// Pure classification without side effects
    pub fn classify(&self, score: f64, is_safety_critical: bool) -> RoutingResult<Classification> {
        self.classifier.classify(score, is_safety_critical)
    }

    /// Cached classification for a document, if still live
    pub fn cached(&self, id: &DocumentId) -> Option<ScoredDocument> {
        self.cache.get(id)
    }

    pub fn review_queue(&self, limit: usize, priority: Option<ReviewPriority>) -> Vec<ReviewItem> {
        self.review_queue.dequeue_batch_filtered(limit, priority)
    }

    pub fn review_queue_snapshot(&self) -> ReviewQueueSnapshot {
        self.review_queue.snapshot()
    }

    pub fn resolved_reviews(&self, limit: usize) -> Vec<ReviewItem> {
        self.review_queue.resolved_items(limit)
    }

    /// Resolve the pending review for `id`. Unknown or already-resolved ids
    /// return `false` without error.
    pub fn resolve(&self, id: &DocumentId, resolution: impl Into<String>) -> bool {
        let resolved = self.review_queue.resolve(id, resolution);
        if resolved {
            tracing::info!(document_id = %id, "Review item resolved");
        } else {
            tracing::debug!(document_id = %id, "Nothing to resolve");
        }
        resolved
    }

    pub fn alerts(&self) -> Vec<Alert> {
        let trend = self.trend.current_trend();
        let queue = self.review_queue.snapshot();
        self.alert_evaluator
            .evaluate(&trend, &queue, self.metrics.safety_critical_low_confidence())
    }

    pub fn trend(&self) -> TrendReport {
        self.trend.current_trend()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn stats(&self) -> DashboardSummary {
        self.aggregator().summary()
    }

    pub fn metrics_summary(&self) -> MetricsSummary {
        self.aggregator().metrics_summary()
    }

    pub fn health(&self) -> HealthReport {
        self.aggregator().health()
    }

    /// One maintenance pass: sweep expired cache entries, then rebuild and
    /// store the dashboard snapshot.
    pub fn run_maintenance(&self) -> Arc<QualitySnapshot> {
        self.run_maintenance_at(Utc::now())
    }

    pub fn run_maintenance_at(&self, now: DateTime<Utc>) -> Arc<QualitySnapshot> {
        let swept_entries = self.cache.sweep_at(now);
        let aggregator = self.aggregator();

        let snapshot = Arc::new(QualitySnapshot {
            timestamp: now,
            summary: aggregator.summary(),
            metrics: aggregator.metrics_summary(),
            alerts: self.alerts(),
            health: aggregator.health(),
            swept_entries,
        });

        *self.last_snapshot.write() = Some(snapshot.clone());

        // The snapshot above already counted this pass's tombstones.
        let purged = self.cache.clear_expired_at(now);
        if purged > 0 {
            tracing::debug!(purged, "Purged expired cache entries");
        }
        snapshot
    }

    /// Snapshot produced by the most recent maintenance pass
    pub fn last_snapshot(&self) -> Option<Arc<QualitySnapshot>> {
        self.last_snapshot.read().clone()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    fn aggregator(&self) -> StatsAggregator<'_> {
        StatsAggregator::new(&self.cache, &self.review_queue, &self.trend, &self.metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::AlertType;
    use crate::routing::RoutingPath;
    use crate::trend::TrendDirection;
    use crate::types::ConfidenceBand;
    use chrono::Duration;

    #[test]
    fn test_enhanced_review_end_to_end() {
        let engine = QualityEngine::default();
        let decision = engine.submit(SubmitRequest::new("A", 0.55)).unwrap();

        assert_eq!(decision.path, RoutingPath::EnhancedReview);
        assert_eq!(decision.band, ConfidenceBand::Low);
        assert!(decision.requires_review);
        assert_eq!(decision.review_priority, Some(ReviewPriority::High));

        let queue = engine.review_queue(50, None);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].document_id.as_str(), "A");
        assert_eq!(queue[0].priority, ReviewPriority::High);
        assert_eq!(queue[0].reason, "Low confidence extraction");

        assert_eq!(engine.stats().quality_metrics.low_confidence_count, 1);
        assert!(engine.cached(&DocumentId::from("A")).is_some());
    }

    #[test]
    fn test_auto_approve_skips_queue() {
        let engine = QualityEngine::default();
        let decision = engine
            .submit(SubmitRequest::new("clean", 0.93).category("manuals"))
            .unwrap();

        assert_eq!(decision.path, RoutingPath::AutoApprove);
        assert!(!decision.requires_review);
        assert!(engine.review_queue(50, None).is_empty());
        assert_eq!(engine.cached(&DocumentId::from("clean")).unwrap().category(), "manuals");
    }

    #[test]
    fn test_manual_validation_is_not_cached() {
        let engine = QualityEngine::default();
        let decision = engine.submit(SubmitRequest::new("bad", 0.1)).unwrap();

        assert_eq!(decision.path, RoutingPath::ManualValidation);
        assert_eq!(decision.cache_ttl_seconds, 0);
        assert!(engine.cached(&DocumentId::from("bad")).is_none());
        assert_eq!(engine.cache_stats().expired_items, 1);
        assert_eq!(engine.review_queue(50, None)[0].priority, ReviewPriority::High);
    }

    #[test]
    fn test_safety_critical_low_raises_urgent_review_and_alert() {
        let engine = QualityEngine::default();
        let decision = engine
            .submit(SubmitRequest::new("sc-1", 0.7).safety_critical(true))
            .unwrap();

        assert_eq!(decision.path, RoutingPath::UrgentReview);
        assert!(decision.is_safety_critical_low);
        assert_eq!(engine.review_queue(50, None)[0].priority, ReviewPriority::Urgent);

        let alerts = engine.alerts();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::SafetyCriticalLowConfidence);
        assert_eq!(
            engine.stats().quality_metrics.safety_critical_low_confidence_count,
            1
        );
    }

    #[test]
    fn test_invalid_score_has_no_side_effects() {
        let engine = QualityEngine::default();
        assert!(matches!(
            engine.submit(SubmitRequest::new("x", 1.1)),
            Err(RoutingError::InvalidScore { .. })
        ));
        assert!(engine.submit(SubmitRequest::new("", 0.5)).is_err());

        let stats = engine.stats();
        assert_eq!(stats.quality_metrics.total_documents, 0);
        assert_eq!(stats.cache_stats.total_items, 0);
        assert_eq!(stats.confidence_trend.sample_size, 0);
        assert!(engine.review_queue(50, None).is_empty());
    }

    #[test]
    fn test_reclassification_upserts_review_item() {
        let engine = QualityEngine::default();
        let t0 = Utc::now();
        engine
            .submit_at(SubmitRequest::new("X", 0.7), t0)
            .unwrap();
        engine
            .submit_at(
                SubmitRequest::new("X", 0.4).safety_critical(true),
                t0 + Duration::seconds(10),
            )
            .unwrap();

        let queue = engine.review_queue(50, None);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].priority, ReviewPriority::Urgent);
        assert_eq!(queue[0].created_at, t0);
        assert_eq!(engine.cache_stats().total_items, 1);
    }

    #[test]
    fn test_reclassification_to_auto_approve_leaves_pending_review() {
        let engine = QualityEngine::default();
        engine.submit(SubmitRequest::new("Y", 0.5)).unwrap();
        engine.submit(SubmitRequest::new("Y", 0.95)).unwrap();

        assert_eq!(engine.review_queue(50, None).len(), 1);
        assert_eq!(
            engine.cached(&DocumentId::from("Y")).unwrap().confidence_score(),
            0.95
        );
    }

    #[test]
    fn test_resolve_flow() {
        let engine = QualityEngine::default();
        engine.submit(SubmitRequest::new("R", 0.65)).unwrap();

        assert!(engine.resolve(&DocumentId::from("R"), "verified"));
        assert!(!engine.resolve(&DocumentId::from("R"), "verified"));
        assert!(!engine.resolve(&DocumentId::from("unknown"), "x"));
        assert!(engine.review_queue(50, None).is_empty());
        assert_eq!(engine.resolved_reviews(10).len(), 1);
    }

    #[test]
    fn test_high_review_volume_alert() {
        let mut config = Config::default();
        config.alerts.high_review_volume_threshold = 3;
        let engine = QualityEngine::new(&config);

        for i in 0..4 {
            engine
                .submit(SubmitRequest::new(format!("doc-{}", i), 0.7))
                .unwrap();
        }
        let alerts = engine.alerts();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::HighReviewVolume);
    }

    #[test]
    fn test_declining_scores_raise_trend_alert() {
        let engine = QualityEngine::default();
        for i in 0..20 {
            let score = if i < 10 { 0.95 } else { 0.62 };
            engine
                .submit(SubmitRequest::new(format!("doc-{}", i), score))
                .unwrap();
        }
        assert_eq!(engine.trend().trend, TrendDirection::Declining);
        assert!(engine
            .alerts()
            .iter()
            .any(|a| a.alert_type == AlertType::DecliningTrend));
    }

    #[test]
    fn test_maintenance_sweeps_and_stores_snapshot() {
        let mut config = Config::default();
        config.routing.ttl.low_seconds = 5;
        config.routing.ttl.medium_seconds = 5;
        config.routing.ttl.high_seconds = 5;
        let engine = QualityEngine::new(&config);
        assert!(engine.last_snapshot().is_none());

        let t0 = Utc::now();
        engine.submit_at(SubmitRequest::new("a", 0.9), t0).unwrap();
        engine.submit_at(SubmitRequest::new("b", 0.5), t0).unwrap();

        let snapshot = engine.run_maintenance_at(t0 + Duration::seconds(10));
        assert_eq!(snapshot.swept_entries, 2);
        assert_eq!(snapshot.summary.quality_metrics.total_documents, 2);
        assert_eq!(snapshot.summary.review_queue.unresolved_count, 1);
        assert_eq!(
            engine.last_snapshot().unwrap().timestamp,
            t0 + Duration::seconds(10)
        );
    }

    #[test]
    fn test_maintenance_reclaims_expired_entries() {
        let mut config = Config::default();
        config.routing.ttl.low_seconds = 60;
        config.routing.ttl.medium_seconds = 60;
        config.routing.ttl.high_seconds = 60;
        let engine = QualityEngine::new(&config);

        let t0 = Utc::now();
        for i in 0..1000 {
            engine
                .submit_at(SubmitRequest::new(format!("doc-{}", i), 0.9), t0)
                .unwrap();
        }
        assert_eq!(engine.cache_stats().total_items, 1000);

        let snapshot = engine.run_maintenance_at(t0 + Duration::days(1));
        assert_eq!(snapshot.swept_entries, 1000);
        assert_eq!(snapshot.summary.cache_stats.expired_items, 1000);
        assert_eq!(engine.cache_stats(), CacheStats::default());

        let snapshot = engine.run_maintenance_at(t0 + Duration::days(2));
        assert_eq!(snapshot.swept_entries, 0);
        assert_eq!(snapshot.summary.cache_stats.total_items, 0);

        // Documents still live are untouched by the purge.
        engine
            .submit_at(SubmitRequest::new("fresh", 0.9), t0 + Duration::days(2))
            .unwrap();
        engine.run_maintenance_at(t0 + Duration::days(2) + Duration::seconds(1));
        assert_eq!(engine.cache_stats().active_items, 1);
    }

    #[test]
    fn test_empty_engine_queries_are_zeroed() {
        let engine = QualityEngine::default();
        assert!(engine.alerts().is_empty());
        assert!(engine.review_queue(50, None).is_empty());
        assert_eq!(engine.trend(), TrendReport::default());
        assert_eq!(engine.metrics_summary().total_documents, 0);
        assert_eq!(engine.cache_stats(), CacheStats::default());
    }

    #[test]
    fn test_concurrent_submits() {
        let engine = Arc::new(QualityEngine::default());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let engine = engine.clone();
                std::thread::spawn(move || {
                    for i in 0..250 {
                        let score = (i % 100) as f64 / 100.0;
                        engine
                            .submit(SubmitRequest::new(format!("t{}-{}", t, i), score))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let stats = engine.stats();
        assert_eq!(stats.quality_metrics.total_documents, 2000);
        assert_eq!(stats.cache_stats.total_items, 2000);
        assert_eq!(
            stats.cache_stats.active_items + stats.cache_stats.expired_items,
            2000
        );
        assert_eq!(stats.confidence_trend.sample_size, 100);
    }
}
