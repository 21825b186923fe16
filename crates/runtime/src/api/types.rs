//! HTTP API specific data structures
//!
//! Domain types (`RoutingDecision`, `ReviewItem`, `Alert`, ...) are serialized
//! directly; this module only holds the request/response envelopes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::alerts::Alert;
use crate::review::ReviewItem;

/// Query string for `GET /review-queue`
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReviewQueueQuery {
    /// Maximum number of items to return (clamped to 1..=200, default 50)
    pub limit: Option<usize>,
    /// Only return items of this priority (`URGENT`, `HIGH` or `MEDIUM`)
    pub priority: Option<String>,
}

/// Unresolved review items in priority order
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReviewQueueResponse {
    pub items: Vec<ReviewItem>,
    /// All unresolved items, regardless of `limit` and `priority`
    pub total_count: usize,
    pub pending_urgent: usize,
    pub pending_high: usize,
}

/// Currently active quality alerts
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AlertsResponse {
    pub alerts: Vec<Alert>,
    pub alert_count: usize,
    pub evaluated_at: DateTime<Utc>,
}

/// Body of `POST /review-queue/{id}/resolve`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResolveRequest {
    pub resolution: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResolveResponse {
    pub success: bool,
    pub message: String,
}

/// Error response structure
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
    /// Machine-readable error code
    pub code: String,
    /// Optional additional details
    pub details: Option<serde_json::Value>,
}

/// Server-level health check response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: u64,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}
