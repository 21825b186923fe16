//! Routing decision types

use crate::types::{ConfidenceBand, DocumentId, ReviewPriority};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a scored document is handled downstream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "http-api", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoutingPath {
    /// Safety-critical document below the floor
    UrgentReview,
    AutoApprove,
    StandardReview,
    EnhancedReview,
    /// Too unreliable to cache; processed by hand
    ManualValidation,
}

impl RoutingPath {
    /// Every path except auto-approval lands in the review queue.
    pub fn requires_review(&self) -> bool {
        !matches!(self, RoutingPath::AutoApprove)
    }

    /// Fixed priority for each path. `None` means the document is not queued.
    pub fn review_priority(&self) -> Option<ReviewPriority> {
        match self {
            RoutingPath::UrgentReview => Some(ReviewPriority::Urgent),
            RoutingPath::ManualValidation => Some(ReviewPriority::High),
            RoutingPath::EnhancedReview => Some(ReviewPriority::High),
            RoutingPath::StandardReview => Some(ReviewPriority::Medium),
            RoutingPath::AutoApprove => None,
        }
    }

    /// Reason text recorded on the review item
    pub fn review_reason(&self) -> Option<&'static str> {
        match self {
            RoutingPath::UrgentReview => Some("Safety critical document with low confidence"),
            RoutingPath::ManualValidation => Some("Very low confidence extraction"),
            RoutingPath::EnhancedReview => Some("Low confidence extraction"),
            RoutingPath::StandardReview => Some("Medium confidence requiring review"),
            RoutingPath::AutoApprove => None,
        }
    }

    /// Downstream action hint for the extraction pipeline
    pub fn next_action(&self) -> NextAction {
        match self {
            RoutingPath::UrgentReview => NextAction::ImmediateSafetyReview,
            RoutingPath::AutoApprove => NextAction::IndexImmediately,
            RoutingPath::StandardReview => NextAction::QueueForReview,
            RoutingPath::EnhancedReview => NextAction::QueueForDetailedReview,
            RoutingPath::ManualValidation => NextAction::QueueForManualProcessing,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RoutingPath::UrgentReview => "URGENT_REVIEW",
            RoutingPath::AutoApprove => "AUTO_APPROVE",
            RoutingPath::StandardReview => "STANDARD_REVIEW",
            RoutingPath::EnhancedReview => "ENHANCED_REVIEW",
            RoutingPath::ManualValidation => "MANUAL_VALIDATION",
        }
    }
}

impl std::fmt::Display for RoutingPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the pipeline should do with the document next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "http-api", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum NextAction {
    IndexImmediately,
    QueueForReview,
    QueueForDetailedReview,
    QueueForManualProcessing,
    ImmediateSafetyReview,
}

/// Pure classification result: band, cache TTL and path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub band: ConfidenceBand,
    pub cache_ttl_seconds: u64,
    pub path: RoutingPath,
}

/// Result of submitting a document, returned to the extraction pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "http-api", derive(utoipa::ToSchema))]
pub struct RoutingDecision {
    pub document_id: DocumentId,
    pub confidence_score: f64,
    pub band: ConfidenceBand,
    pub path: RoutingPath,
    pub next_action: NextAction,
    pub cache_ttl_seconds: u64,
    pub requires_review: bool,
    pub review_priority: Option<ReviewPriority>,
    /// Safety-critical document that fell below the floor
    pub is_safety_critical_low: bool,
    pub decided_at: DateTime<Utc>,
}

impl RoutingDecision {
    pub fn from_classification(
        document_id: DocumentId,
        confidence_score: f64,
        classification: Classification,
        decided_at: DateTime<Utc>,
    ) -> Self {
        let path = classification.path;
        Self {
            document_id,
            confidence_score,
            band: classification.band,
            path,
            next_action: path.next_action(),
            cache_ttl_seconds: classification.cache_ttl_seconds,
            requires_review: path.requires_review(),
            review_priority: path.review_priority(),
            is_safety_critical_low: path == RoutingPath::UrgentReview,
            decided_at,
        }
    }
}
