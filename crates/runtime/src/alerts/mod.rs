//! Quality alerts
//!
//! [`AlertEvaluator`] is stateless: alerts are recomputed from the current
//! trend, review-queue counts and safety-critical count on every call, and are
//! always returned in the same order (safety, trend, review volume).

use crate::config::ConfigError;
use crate::review::ReviewQueueSnapshot;
use crate::trend::{TrendDirection, TrendReport};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default unresolved-queue size above which `high_review_volume` fires
pub const DEFAULT_HIGH_REVIEW_VOLUME_THRESHOLD: usize = 50;
/// Safety-critical low-confidence count at which severity becomes critical
pub const DEFAULT_CRITICAL_SAFETY_COUNT: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "http-api", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    SafetyCriticalLowConfidence,
    DecliningTrend,
    HighReviewVolume,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "http-api", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Warning,
    High,
    Critical,
}

/// A transient alert; never stored, regenerated on each evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "http-api", derive(utoipa::ToSchema))]
pub struct Alert {
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub message: String,
    pub recommended_action: String,
    pub raised_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub high_review_volume_threshold: usize,
    pub critical_safety_count: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            high_review_volume_threshold: DEFAULT_HIGH_REVIEW_VOLUME_THRESHOLD,
            critical_safety_count: DEFAULT_CRITICAL_SAFETY_COUNT,
        }
    }
}

impl AlertConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.high_review_volume_threshold == 0 {
            return Err(ConfigError::InvalidValue {
                key: "alerts.high_review_volume_threshold".to_string(),
                reason: "Threshold must be > 0".to_string(),
            });
        }
        if self.critical_safety_count == 0 {
            return Err(ConfigError::InvalidValue {
                key: "alerts.critical_safety_count".to_string(),
                reason: "Count must be > 0".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct AlertEvaluator {
    config: AlertConfig,
}

impl AlertEvaluator {
    pub fn new(config: AlertConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AlertConfig {
        &self.config
    }

    pub fn evaluate(
        &self,
        trend: &TrendReport,
        queue: &ReviewQueueSnapshot,
        safety_critical_low_confidence_count: u64,
    ) -> Vec<Alert> {
        self.evaluate_at(trend, queue, safety_critical_low_confidence_count, Utc::now())
    }

    pub fn evaluate_at(
        &self,
        trend: &TrendReport,
        queue: &ReviewQueueSnapshot,
        safety_critical_low_confidence_count: u64,
        now: DateTime<Utc>,
    ) -> Vec<Alert> {
        let mut alerts = Vec::new();

        if safety_critical_low_confidence_count > 0 {
            let severity = if safety_critical_low_confidence_count >= self.config.critical_safety_count
            {
                AlertSeverity::Critical
            } else {
                AlertSeverity::High
            };
            alerts.push(Alert {
                alert_type: AlertType::SafetyCriticalLowConfidence,
                severity,
                message: format!(
                    "{} safety critical documents with low confidence",
                    safety_critical_low_confidence_count
                ),
                recommended_action: "Immediate review of safety critical extractions required"
                    .to_string(),
                raised_at: now,
            });
        }

        if trend.trend == TrendDirection::Declining {
            alerts.push(Alert {
                alert_type: AlertType::DecliningTrend,
                severity: AlertSeverity::Warning,
                message: format!(
                    "Confidence trend is declining. Recent average: {:.3}",
                    trend.recent_average
                ),
                recommended_action: "Review extraction quality and model performance".to_string(),
                raised_at: now,
            });
        }

        if queue.unresolved_count > self.config.high_review_volume_threshold {
            alerts.push(Alert {
                alert_type: AlertType::HighReviewVolume,
                severity: AlertSeverity::Warning,
                message: format!(
                    "{} unresolved items in review queue ({} urgent), threshold is {}",
                    queue.unresolved_count,
                    queue.urgent_count,
                    self.config.high_review_volume_threshold
                ),
                recommended_action: "Add reviewer capacity or process urgent items first"
                    .to_string(),
                raised_at: now,
            });
        }

        if !alerts.is_empty() {
            tracing::debug!(count = alerts.len(), "Evaluated quality alerts");
        }
        alerts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trend(direction: TrendDirection) -> TrendReport {
        TrendReport {
            trend: direction,
            recent_average: 0.612,
            sample_size: 40,
        }
    }

    fn queue(unresolved: usize) -> ReviewQueueSnapshot {
        ReviewQueueSnapshot {
            unresolved_count: unresolved,
            medium_count: unresolved,
            ..Default::default()
        }
    }

    fn types(alerts: &[Alert]) -> Vec<AlertType> {
        alerts.iter().map(|a| a.alert_type).collect()
    }

    #[test]
    fn test_no_alerts_on_quiet_system() {
        let evaluator = AlertEvaluator::default();
        assert!(evaluator
            .evaluate(&TrendReport::default(), &queue(0), 0)
            .is_empty());
    }

    #[test]
    fn test_safety_alert_fires_at_count_one_regardless_of_state() {
        let evaluator = AlertEvaluator::default();
        for direction in [
            TrendDirection::Improving,
            TrendDirection::Stable,
            TrendDirection::InsufficientData,
        ] {
            let alerts = evaluator.evaluate(&trend(direction), &queue(0), 1);
            assert_eq!(types(&alerts), vec![AlertType::SafetyCriticalLowConfidence]);
            assert_eq!(alerts[0].severity, AlertSeverity::High);
        }
    }

    #[test]
    fn test_safety_severity_scales_with_count() {
        let evaluator = AlertEvaluator::default();
        let alerts = evaluator.evaluate(&TrendReport::default(), &queue(0), 4);
        assert_eq!(alerts[0].severity, AlertSeverity::High);
        let alerts = evaluator.evaluate(&TrendReport::default(), &queue(0), 5);
        assert_eq!(alerts[0].severity, AlertSeverity::Critical);
        assert!(alerts[0].message.starts_with("5 safety critical"));
    }

    #[test]
    fn test_declining_trend_alert() {
        let evaluator = AlertEvaluator::default();
        let alerts = evaluator.evaluate(&trend(TrendDirection::Declining), &queue(0), 0);
        assert_eq!(types(&alerts), vec![AlertType::DecliningTrend]);
        assert!(alerts[0].message.contains("0.612"));
    }

    #[test]
    fn test_review_volume_threshold_is_exclusive() {
        let evaluator = AlertEvaluator::default();
        assert!(evaluator
            .evaluate(&TrendReport::default(), &queue(50), 0)
            .is_empty());
        let alerts = evaluator.evaluate(&TrendReport::default(), &queue(51), 0);
        assert_eq!(types(&alerts), vec![AlertType::HighReviewVolume]);
    }

    #[test]
    fn test_fixed_order_when_all_fire() {
        let evaluator = AlertEvaluator::new(AlertConfig {
            high_review_volume_threshold: 3,
            ..Default::default()
        });
        let alerts = evaluator.evaluate(&trend(TrendDirection::Declining), &queue(10), 2);
        assert_eq!(
            types(&alerts),
            vec![
                AlertType::SafetyCriticalLowConfidence,
                AlertType::DecliningTrend,
                AlertType::HighReviewVolume,
            ]
        );
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let evaluator = AlertEvaluator::default();
        let now = Utc::now();
        let first = evaluator.evaluate_at(&trend(TrendDirection::Declining), &queue(60), 3, now);
        let second = evaluator.evaluate_at(&trend(TrendDirection::Declining), &queue(60), 3, now);
        assert_eq!(first, second);
    }

    #[test]
    fn test_alert_wire_format() {
        let evaluator = AlertEvaluator::default();
        let alerts = evaluator.evaluate(&TrendReport::default(), &queue(0), 1);
        let json = serde_json::to_value(&alerts[0]).unwrap();
        assert_eq!(json["type"], "safety_critical_low_confidence");
        assert_eq!(json["severity"], "high");
        assert!(json["recommended_action"].is_string());
    }
}
