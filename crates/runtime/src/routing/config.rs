//! Routing configuration: cache TTL per band and the safety-critical floor

use crate::config::ConfigError;
use crate::types::ConfidenceBand;
use serde::{Deserialize, Serialize};

/// Default TTL for HIGH-confidence results (24 hours)
pub const DEFAULT_TTL_HIGH_SECONDS: u64 = 86_400;
/// Default TTL for MEDIUM-confidence results (12 hours)
pub const DEFAULT_TTL_MEDIUM_SECONDS: u64 = 43_200;
/// Default TTL for LOW-confidence results (1 hour)
pub const DEFAULT_TTL_LOW_SECONDS: u64 = 3_600;
/// Safety-critical documents scoring below this floor are escalated.
pub const DEFAULT_SAFETY_CRITICAL_FLOOR: f64 = 0.80;

/// Cache TTL table keyed by confidence band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TtlPolicy {
    pub high_seconds: u64,
    pub medium_seconds: u64,
    pub low_seconds: u64,
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            high_seconds: DEFAULT_TTL_HIGH_SECONDS,
            medium_seconds: DEFAULT_TTL_MEDIUM_SECONDS,
            low_seconds: DEFAULT_TTL_LOW_SECONDS,
        }
    }
}

impl TtlPolicy {
    pub fn ttl_for(&self, band: ConfidenceBand) -> u64 {
        match band {
            ConfidenceBand::High => self.high_seconds,
            ConfidenceBand::Medium => self.medium_seconds,
            ConfidenceBand::Low => self.low_seconds,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("routing.ttl.high_seconds", self.high_seconds),
            ("routing.ttl.medium_seconds", self.medium_seconds),
            ("routing.ttl.low_seconds", self.low_seconds),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    reason: "TTL must be > 0".to_string(),
                });
            }
        }

        if self.high_seconds < self.medium_seconds || self.medium_seconds < self.low_seconds {
            return Err(ConfigError::InvalidValue {
                key: "routing.ttl".to_string(),
                reason: format!(
                    "TTLs must not increase as confidence drops (high={}, medium={}, low={})",
                    self.high_seconds, self.medium_seconds, self.low_seconds
                ),
            });
        }

        Ok(())
    }
}

/// Classifier settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// TTL table
    pub ttl: TtlPolicy,
    /// Minimum acceptable score for safety-critical documents
    pub safety_critical_floor: f64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            ttl: TtlPolicy::default(),
            safety_critical_floor: DEFAULT_SAFETY_CRITICAL_FLOOR,
        }
    }
}

impl RoutingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ttl.validate()?;

        if !(0.0..=1.0).contains(&self.safety_critical_floor) {
            return Err(ConfigError::InvalidValue {
                key: "routing.safety_critical_floor".to_string(),
                reason: format!(
                    "Must be within [0.0, 1.0], got {}",
                    self.safety_critical_floor
                ),
            });
        }

        Ok(())
    }
}
