//! Quality statistics
//!
//! [`QualityMetrics`] keeps cumulative counters over every document ever
//! classified. The counters share one lock so a snapshot never sees the band
//! counts disagree with the total. [`StatsAggregator`] is a read-only view over
//! the cache, review queue, trend tracker and metrics that produces dashboard
//! structures; on an empty engine every structure comes back zeroed.

use crate::cache::{CacheStats, ConfidenceCache};
use crate::review::{ReviewQueue, ReviewQueueSnapshot};
use crate::routing::RoutingDecision;
use crate::trend::{TrendDirection, TrendReport, TrendTracker};
use crate::types::ConfidenceBand;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Average confidence below which the engine reports itself degraded
pub const DEGRADED_AVERAGE_CONFIDENCE: f64 = 0.5;

#[derive(Debug, Default)]
struct Counters {
    total_documents: u64,
    high_confidence_count: u64,
    medium_confidence_count: u64,
    low_confidence_count: u64,
    safety_critical_low_confidence: u64,
    documents_requiring_review: u64,
    cumulative_score: f64,
}

impl Counters {
    fn average_confidence(&self) -> f64 {
        if self.total_documents == 0 {
            return 0.0;
        }
        self.cumulative_score / self.total_documents as f64
    }
}

/// Cumulative counters over every classified document
#[derive(Debug, Default)]
pub struct QualityMetrics {
    counters: Mutex<Counters>,
}

/// Point-in-time copy of [`QualityMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "http-api", derive(utoipa::ToSchema))]
pub struct QualityMetricsSnapshot {
    pub total_documents: u64,
    pub high_confidence_count: u64,
    pub medium_confidence_count: u64,
    pub low_confidence_count: u64,
    /// Mean over every document ever classified
    pub avg_confidence: f64,
    pub safety_critical_low_confidence_count: u64,
    pub documents_requiring_review: u64,
}

impl QualityMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one routing decision.
    pub fn record(&self, decision: &RoutingDecision) {
        let mut counters = self.counters.lock();
        counters.total_documents += 1;

        match decision.band {
            ConfidenceBand::High => counters.high_confidence_count += 1,
            ConfidenceBand::Medium => counters.medium_confidence_count += 1,
            ConfidenceBand::Low => counters.low_confidence_count += 1,
        }
        if decision.is_safety_critical_low {
            counters.safety_critical_low_confidence += 1;
        }
        if decision.requires_review {
            counters.documents_requiring_review += 1;
        }
        counters.cumulative_score += decision.confidence_score.clamp(0.0, 1.0);
    }

    pub fn safety_critical_low_confidence(&self) -> u64 {
        self.counters.lock().safety_critical_low_confidence
    }

    pub fn snapshot(&self) -> QualityMetricsSnapshot {
        let counters = self.counters.lock();
        QualityMetricsSnapshot {
            total_documents: counters.total_documents,
            high_confidence_count: counters.high_confidence_count,
            medium_confidence_count: counters.medium_confidence_count,
            low_confidence_count: counters.low_confidence_count,
            avg_confidence: counters.average_confidence(),
            safety_critical_low_confidence_count: counters.safety_critical_low_confidence,
            documents_requiring_review: counters.documents_requiring_review,
        }
    }
}

/// Full dashboard rollup served by `GET stats`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "http-api", derive(utoipa::ToSchema))]
pub struct DashboardSummary {
    pub cache_stats: CacheStats,
    pub quality_metrics: QualityMetricsSnapshot,
    pub confidence_trend: TrendReport,
    pub review_queue: ReviewQueueSnapshot,
    pub generated_at: DateTime<Utc>,
}

impl DashboardSummary {
    /// Zeroed summary for an engine that has seen nothing yet.
    pub fn empty() -> Self {
        Self {
            cache_stats: CacheStats::default(),
            quality_metrics: QualityMetricsSnapshot::default(),
            confidence_trend: TrendReport::default(),
            review_queue: ReviewQueueSnapshot::default(),
            generated_at: Utc::now(),
        }
    }
}

/// Compact percentages for dashboard tiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "http-api", derive(utoipa::ToSchema))]
pub struct MetricsSummary {
    pub total_documents: u64,
    /// Rounded to 3 decimals
    pub average_confidence: f64,
    /// Rounded to 1 decimal
    pub high_confidence_percentage: f64,
    pub documents_requiring_review: u64,
    /// Rounded to 1 decimal
    pub review_percentage: f64,
    pub safety_critical_low_confidence: u64,
    pub confidence_trend: TrendDirection,
    /// Rounded to 3 decimals
    pub recent_avg_confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "http-api", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    Healthy,
    Degraded,
}

/// Self-reported engine health
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "http-api", derive(utoipa::ToSchema))]
pub struct HealthReport {
    pub status: HealthState,
    pub issues: Vec<String>,
    pub checked_at: DateTime<Utc>,
    pub system_operational: bool,
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// Read-only rollup over the engine components
pub struct StatsAggregator<'a> {
    cache: &'a ConfidenceCache,
    queue: &'a ReviewQueue,
    trend: &'a TrendTracker,
    metrics: &'a QualityMetrics,
}

impl<'a> StatsAggregator<'a> {
    pub fn new(
        cache: &'a ConfidenceCache,
        queue: &'a ReviewQueue,
        trend: &'a TrendTracker,
        metrics: &'a QualityMetrics,
    ) -> Self {
        Self {
            cache,
            queue,
            trend,
            metrics,
        }
    }

    pub fn summary(&self) -> DashboardSummary {
        DashboardSummary {
            cache_stats: self.cache.stats(),
            quality_metrics: self.metrics.snapshot(),
            confidence_trend: self.trend.current_trend(),
            review_queue: self.queue.snapshot(),
            generated_at: Utc::now(),
        }
    }

    pub fn metrics_summary(&self) -> MetricsSummary {
        let metrics = self.metrics.snapshot();
        let trend = self.trend.current_trend();

        MetricsSummary {
            total_documents: metrics.total_documents,
            average_confidence: round_to(metrics.avg_confidence, 3),
            high_confidence_percentage: round_to(
                percentage(metrics.high_confidence_count, metrics.total_documents),
                1,
            ),
            documents_requiring_review: metrics.documents_requiring_review,
            review_percentage: round_to(
                percentage(metrics.documents_requiring_review, metrics.total_documents),
                1,
            ),
            safety_critical_low_confidence: metrics.safety_critical_low_confidence_count,
            confidence_trend: trend.trend,
            recent_avg_confidence: round_to(trend.recent_average, 3),
        }
    }

    /// Degraded when the lifetime average is below 0.5 or expired cache entries
    /// outnumber live ones.
    pub fn health(&self) -> HealthReport {
        let metrics = self.metrics.snapshot();
        let cache = self.cache.stats();
        let mut issues = Vec::new();

        if metrics.total_documents > 0 && metrics.avg_confidence < DEGRADED_AVERAGE_CONFIDENCE {
            issues.push(format!(
                "Low average confidence: {:.3}",
                metrics.avg_confidence
            ));
        }
        if cache.expired_items > cache.active_items {
            issues.push(format!(
                "High cache expiration rate: {} expired vs {} active",
                cache.expired_items, cache.active_items
            ));
        }

        let status = if issues.is_empty() {
            HealthState::Healthy
        } else {
            tracing::debug!(?issues, "Quality engine degraded");
            HealthState::Degraded
        };

        HealthReport {
            status,
            issues,
            checked_at: Utc::now(),
            system_operational: true,
        }
    }
}
