//! Core types shared by every quality-control component

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub mod error;

pub use error::*;

/// Scores at or above this value are HIGH confidence.
pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 0.85;
/// Scores at or above this value (and below HIGH) are MEDIUM confidence.
pub const MEDIUM_CONFIDENCE_THRESHOLD: f64 = 0.60;
/// Scores below this value go to manual validation.
pub const MANUAL_VALIDATION_THRESHOLD: f64 = 0.30;

/// Opaque metadata carried alongside a document, passed through unchanged.
pub type Metadata = HashMap<String, serde_json::Value>;

/// Externally assigned document identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "http-api", derive(utoipa::ToSchema))]
#[serde(transparent)]
pub struct DocumentId(pub String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Discretized quality tier derived from a confidence score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "http-api", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
}

impl ConfidenceBand {
    /// Map a score to its band. Boundaries belong to the higher band.
    ///
    /// The score is expected to be validated already; anything below
    /// [`MEDIUM_CONFIDENCE_THRESHOLD`] (NaN included) lands in `Low`.
    pub fn from_score(score: f64) -> Self {
        if score >= HIGH_CONFIDENCE_THRESHOLD {
            ConfidenceBand::High
        } else if score >= MEDIUM_CONFIDENCE_THRESHOLD {
            ConfidenceBand::Medium
        } else {
            ConfidenceBand::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceBand::High => "HIGH",
            ConfidenceBand::Medium => "MEDIUM",
            ConfidenceBand::Low => "LOW",
        }
    }
}

impl std::fmt::Display for ConfidenceBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority of an item in the human review queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "http-api", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewPriority {
    Urgent,
    High,
    Medium,
}

impl ReviewPriority {
    /// Sort rank, lowest first. URGENT sorts ahead of HIGH ahead of MEDIUM.
    pub fn rank(&self) -> u8 {
        match self {
            ReviewPriority::Urgent => 0,
            ReviewPriority::High => 1,
            ReviewPriority::Medium => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewPriority::Urgent => "URGENT",
            ReviewPriority::High => "HIGH",
            ReviewPriority::Medium => "MEDIUM",
        }
    }
}

impl std::fmt::Display for ReviewPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReviewPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "URGENT" => Ok(ReviewPriority::Urgent),
            "HIGH" => Ok(ReviewPriority::High),
            "MEDIUM" => Ok(ReviewPriority::Medium),
            other => Err(format!("unknown review priority: {}", other)),
        }
    }
}

/// A classified document.
///
/// Immutable once built; the band is always derived from the score by
/// [`ConfidenceBand::from_score`] and cannot be set independently. A later
/// classification of the same id produces a new value that supersedes this one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "http-api", derive(utoipa::ToSchema))]
pub struct ScoredDocument {
    document_id: DocumentId,
    confidence_score: f64,
    confidence_band: ConfidenceBand,
    is_safety_critical: bool,
    category: String,
    metadata: Metadata,
    scored_at: DateTime<Utc>,
}

impl ScoredDocument {
    /// Build a scored document, rejecting scores outside `[0.0, 1.0]`.
    pub fn new(
        document_id: DocumentId,
        confidence_score: f64,
        is_safety_critical: bool,
        category: impl Into<String>,
        metadata: Metadata,
        scored_at: DateTime<Utc>,
    ) -> Result<Self, crate::routing::RoutingError> {
        crate::routing::validate_score(confidence_score)?;
        Ok(Self {
            document_id,
            confidence_score,
            confidence_band: ConfidenceBand::from_score(confidence_score),
            is_safety_critical,
            category: category.into(),
            metadata,
            scored_at,
        })
    }

    pub fn document_id(&self) -> &DocumentId {
        &self.document_id
    }

    pub fn confidence_score(&self) -> f64 {
        self.confidence_score
    }

    pub fn confidence_band(&self) -> ConfidenceBand {
        self.confidence_band
    }

    pub fn is_safety_critical(&self) -> bool {
        self.is_safety_critical
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn scored_at(&self) -> DateTime<Utc> {
        self.scored_at
    }
}
