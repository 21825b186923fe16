//! Rolling-window confidence trend
//!
//! Keeps the last N scores in a ring buffer and compares the mean of the newer
//! half against the older half. Differences inside the noise band count as
//! stable; fewer than [`MIN_TREND_SAMPLES`] samples are never classified.

use crate::config::ConfigError;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Below this many samples the trend is `insufficient_data`.
pub const MIN_TREND_SAMPLES: usize = 10;
/// Default ring buffer capacity
pub const DEFAULT_WINDOW_SIZE: usize = 100;
/// Default noise-rejection band on the half-to-half mean difference
pub const DEFAULT_NOISE_BAND: f64 = 0.03;

/// Direction of recent confidence scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "http-api", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Declining,
    Stable,
    InsufficientData,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Improving => "improving",
            TrendDirection::Declining => "declining",
            TrendDirection::Stable => "stable",
            TrendDirection::InsufficientData => "insufficient_data",
        }
    }
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendSample {
    pub timestamp: DateTime<Utc>,
    pub score: f64,
}

/// Current trend over the window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "http-api", derive(utoipa::ToSchema))]
pub struct TrendReport {
    pub trend: TrendDirection,
    /// Mean of the newer half of the window
    pub recent_average: f64,
    pub sample_size: usize,
}

impl Default for TrendReport {
    fn default() -> Self {
        Self {
            trend: TrendDirection::InsufficientData,
            recent_average: 0.0,
            sample_size: 0,
        }
    }
}

/// Trend tracker settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    pub window_size: usize,
    pub noise_band: f64,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            noise_band: DEFAULT_NOISE_BAND,
        }
    }
}

impl TrendConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_size < MIN_TREND_SAMPLES {
            return Err(ConfigError::InvalidValue {
                key: "trend.window_size".to_string(),
                reason: format!(
                    "Must be at least {} samples, got {}",
                    MIN_TREND_SAMPLES, self.window_size
                ),
            });
        }

        if !(0.0..1.0).contains(&self.noise_band) {
            return Err(ConfigError::InvalidValue {
                key: "trend.noise_band".to_string(),
                reason: format!("Must be within [0.0, 1.0), got {}", self.noise_band),
            });
        }

        Ok(())
    }
}

/// Thread-safe rolling trend tracker
#[derive(Debug)]
pub struct TrendTracker {
    samples: Mutex<VecDeque<TrendSample>>,
    window_size: usize,
    noise_band: f64,
}

impl Default for TrendTracker {
    fn default() -> Self {
        Self::new(&TrendConfig::default())
    }
}

fn mean<'a>(samples: impl Iterator<Item = &'a TrendSample>) -> Option<f64> {
    let (sum, count) = samples.fold((0.0, 0usize), |(sum, count), s| (sum + s.score, count + 1));
    (count > 0).then(|| sum / count as f64)
}

impl TrendTracker {
    pub fn new(config: &TrendConfig) -> Self {
        let window_size = config.window_size.max(1);
        Self {
            samples: Mutex::new(VecDeque::with_capacity(window_size)),
            window_size,
            noise_band: config.noise_band,
        }
    }

    /// Append a score, evicting the oldest sample when full. O(1).
    pub fn record(&self, score: f64) {
        self.record_at(score, Utc::now())
    }

    pub fn record_at(&self, score: f64, timestamp: DateTime<Utc>) {
        if !(0.0..=1.0).contains(&score) {
            tracing::warn!(score, "Ignoring out-of-range score for trend tracking");
            return;
        }
        let mut samples = self.samples.lock();
        if samples.len() == self.window_size {
            samples.pop_front();
        }
        samples.push_back(TrendSample { timestamp, score });
    }

    /// Older half is the first `len / 2` samples; the newer half is the rest.
    pub fn current_trend(&self) -> TrendReport {
        let samples = self.samples.lock();
        let sample_size = samples.len();
        let split = sample_size / 2;

        let recent_average = mean(samples.iter().skip(split)).unwrap_or(0.0);
        if sample_size < MIN_TREND_SAMPLES {
            return TrendReport {
                trend: TrendDirection::InsufficientData,
                recent_average,
                sample_size,
            };
        }

        let older = mean(samples.iter().take(split)).unwrap_or(0.0);
        let delta = recent_average - older;
        let trend = if delta > self.noise_band {
            TrendDirection::Improving
        } else if delta < -self.noise_band {
            TrendDirection::Declining
        } else {
            TrendDirection::Stable
        };

        TrendReport {
            trend,
            recent_average,
            sample_size,
        }
    }

    /// Copy of the window, oldest first
    pub fn samples(&self) -> Vec<TrendSample> {
        self.samples.lock().iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.samples.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.lock().is_empty()
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(tracker: &TrendTracker, scores: impl IntoIterator<Item = f64>) {
        for score in scores {
            tracker.record(score);
        }
    }

    #[test]
    fn test_empty_tracker() {
        let tracker = TrendTracker::default();
        assert_eq!(tracker.current_trend(), TrendReport::default());
    }

    #[test]
    fn test_insufficient_data_below_ten_samples() {
        let tracker = TrendTracker::default();
        feed(&tracker, (0..9).map(|i| 0.1 + i as f64 * 0.1));
        let report = tracker.current_trend();
        assert_eq!(report.trend, TrendDirection::InsufficientData);
        assert_eq!(report.sample_size, 9);
    }

    #[test]
    fn test_rising_ramp_is_improving() {
        let tracker = TrendTracker::default();
        feed(&tracker, (0..50).map(|i| 0.5 + 0.4 * i as f64 / 49.0));
        let report = tracker.current_trend();
        assert_eq!(report.trend, TrendDirection::Improving);
        assert_eq!(report.sample_size, 50);
        assert!(report.recent_average > 0.75);
    }

    #[test]
    fn test_falling_ramp_is_declining() {
        let tracker = TrendTracker::default();
        feed(&tracker, (0..40).map(|i| 0.9 - 0.5 * i as f64 / 39.0));
        assert_eq!(tracker.current_trend().trend, TrendDirection::Declining);
    }

    #[test]
    fn test_noise_inside_band_is_stable() {
        let tracker = TrendTracker::default();
        feed(&tracker, std::iter::repeat(0.70).take(10));
        feed(&tracker, std::iter::repeat(0.72).take(10));
        let report = tracker.current_trend();
        assert_eq!(report.trend, TrendDirection::Stable);
        assert!((report.recent_average - 0.72).abs() < 1e-9);
    }

    #[test]
    fn test_recent_average_uses_newer_half_only() {
        let tracker = TrendTracker::default();
        feed(&tracker, std::iter::repeat(0.2).take(10));
        feed(&tracker, std::iter::repeat(0.8).take(10));
        let report = tracker.current_trend();
        assert!((report.recent_average - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_odd_length_puts_extra_sample_in_newer_half() {
        let tracker = TrendTracker::default();
        feed(&tracker, std::iter::repeat(0.5).take(5));
        feed(&tracker, std::iter::repeat(0.9).take(6));
        let report = tracker.current_trend();
        assert!((report.recent_average - (0.5 + 5.0 * 0.9) / 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_window_evicts_oldest() {
        let tracker = TrendTracker::new(&TrendConfig {
            window_size: 10,
            ..Default::default()
        });
        feed(&tracker, std::iter::repeat(0.1).take(10));
        feed(&tracker, std::iter::repeat(0.9).take(10));

        assert_eq!(tracker.len(), 10);
        assert!(tracker.samples().iter().all(|s| s.score == 0.9));
        assert_eq!(tracker.current_trend().trend, TrendDirection::Stable);
    }

    #[test]
    fn test_custom_noise_band() {
        let tracker = TrendTracker::new(&TrendConfig {
            window_size: 100,
            noise_band: 0.0,
        });
        feed(&tracker, std::iter::repeat(0.70).take(10));
        feed(&tracker, std::iter::repeat(0.71).take(10));
        assert_eq!(tracker.current_trend().trend, TrendDirection::Improving);
    }

    #[test]
    fn test_out_of_range_scores_ignored() {
        let tracker = TrendTracker::default();
        tracker.record(f64::NAN);
        tracker.record(1.5);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_config_validation() {
        assert!(TrendConfig::default().validate().is_ok());
        let small = TrendConfig {
            window_size: 5,
            ..Default::default()
        };
        assert!(small.validate().is_err());
        let wide = TrendConfig {
            noise_band: 1.0,
            ..Default::default()
        };
        assert!(wide.validate().is_err());
    }
}
