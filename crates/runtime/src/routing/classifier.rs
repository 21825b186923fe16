//! Score classifier
//!
//! Maps a confidence score and the safety-critical flag to a band, a cache TTL
//! and a routing path. Classification is pure: the classifier holds only its
//! immutable configuration and can be shared across threads without locking.

use super::config::{RoutingConfig, TtlPolicy};
use super::decision::{Classification, RoutingPath};
use super::error::{validate_score, RoutingResult};
use crate::types::{
    ConfidenceBand, HIGH_CONFIDENCE_THRESHOLD, MANUAL_VALIDATION_THRESHOLD,
    MEDIUM_CONFIDENCE_THRESHOLD,
};

/// Deterministic score classifier
#[derive(Debug, Clone)]
pub struct ScoreClassifier {
    ttl: TtlPolicy,
    safety_critical_floor: f64,
}

impl Default for ScoreClassifier {
    fn default() -> Self {
        Self::new(&RoutingConfig::default())
    }
}

impl ScoreClassifier {
    pub fn new(config: &RoutingConfig) -> Self {
        Self {
            ttl: config.ttl,
            safety_critical_floor: config.safety_critical_floor,
        }
    }

    pub fn safety_critical_floor(&self) -> f64 {
        self.safety_critical_floor
    }

    pub fn ttl_policy(&self) -> &TtlPolicy {
        &self.ttl
    }

    /// Classify a score. Rules are evaluated in order and the first match wins:
    ///
    /// 1. safety-critical and below the floor: `UrgentReview`
    /// 2. `>= 0.85`: `AutoApprove`
    /// 3. `>= 0.60`: `StandardReview`
    /// 4. `>= 0.30`: `EnhancedReview`
    /// 5. otherwise `ManualValidation`, which is never cached (TTL 0)
    pub fn classify(&self, score: f64, is_safety_critical: bool) -> RoutingResult<Classification> {
        validate_score(score)?;

        let band = ConfidenceBand::from_score(score);
        let path = if is_safety_critical && score < self.safety_critical_floor {
            RoutingPath::UrgentReview
        } else if score >= HIGH_CONFIDENCE_THRESHOLD {
            RoutingPath::AutoApprove
        } else if score >= MEDIUM_CONFIDENCE_THRESHOLD {
            RoutingPath::StandardReview
        } else if score >= MANUAL_VALIDATION_THRESHOLD {
            RoutingPath::EnhancedReview
        } else {
            RoutingPath::ManualValidation
        };

        let cache_ttl_seconds = match path {
            RoutingPath::ManualValidation => 0,
            _ => self.ttl.ttl_for(band),
        };

        Ok(Classification {
            band,
            cache_ttl_seconds,
            path,
        })
    }
}
