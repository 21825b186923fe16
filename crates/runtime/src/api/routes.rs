//! HTTP API route handlers
//!
//! Every handler lives under `/api/v1/confidence`. Query endpoints never fail
//! on an empty engine; only malformed input produces an error body.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use std::sync::Arc;

use super::traits::QualityApiProvider;
use super::types::{
    AlertsResponse, ErrorResponse, ResolveRequest, ResolveResponse, ReviewQueueQuery,
    ReviewQueueResponse,
};
use crate::engine::SubmitRequest;
use crate::routing::RoutingDecision;
use crate::stats::{DashboardSummary, HealthReport, MetricsSummary};
use crate::types::{DocumentId, ReviewPriority, RuntimeError};

pub const DEFAULT_REVIEW_LIMIT: usize = 50;
pub const MAX_REVIEW_LIMIT: usize = 200;

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Shared state handed to every handler
#[derive(Clone)]
pub struct ApiState {
    pub provider: Arc<dyn QualityApiProvider>,
    pub default_review_limit: usize,
    pub max_review_limit: usize,
}

impl ApiState {
    pub fn new(provider: Arc<dyn QualityApiProvider>) -> Self {
        Self {
            provider,
            default_review_limit: DEFAULT_REVIEW_LIMIT,
            max_review_limit: MAX_REVIEW_LIMIT,
        }
    }

    pub fn with_review_limits(mut self, default_limit: usize, max_limit: usize) -> Self {
        self.max_review_limit = max_limit.max(1);
        self.default_review_limit = default_limit.clamp(1, self.max_review_limit);
        self
    }

    fn clamp_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_review_limit)
            .clamp(1, self.max_review_limit)
    }
}

fn error_response(e: RuntimeError) -> ApiError {
    match e {
        RuntimeError::Routing(err) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse {
                error: err.to_string(),
                code: err.code().to_string(),
                details: None,
            }),
        ),
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: other.to_string(),
                code: "INTERNAL_ERROR".to_string(),
                details: None,
            }),
        ),
    }
}

/// Submit a scored document for routing
#[utoipa::path(
    post,
    path = "/api/v1/confidence/submit",
    request_body = SubmitRequest,
    responses(
        (status = 200, description = "Document routed", body = RoutingDecision),
        (status = 422, description = "Score outside [0, 1] or empty document id", body = ErrorResponse)
    ),
    tag = "confidence"
)]
pub async fn submit_document(
    State(state): State<ApiState>,
    Json(request): Json<SubmitRequest>,
) -> Result<Json<RoutingDecision>, ApiError> {
    state
        .provider
        .submit(request)
        .await
        .map(Json)
        .map_err(error_response)
}

/// Dashboard statistics
#[utoipa::path(
    get,
    path = "/api/v1/confidence/stats",
    responses(
        (status = 200, description = "Cache, quality metrics and trend", body = DashboardSummary),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "confidence"
)]
pub async fn get_stats(State(state): State<ApiState>) -> Result<Json<DashboardSummary>, ApiError> {
    state
        .provider
        .dashboard_stats()
        .await
        .map(Json)
        .map_err(error_response)
}

/// Pending review items, highest priority first
#[utoipa::path(
    get,
    path = "/api/v1/confidence/review-queue",
    params(ReviewQueueQuery),
    responses(
        (status = 200, description = "Unresolved review items", body = ReviewQueueResponse),
        (status = 400, description = "Unknown priority filter", body = ErrorResponse)
    ),
    tag = "confidence"
)]
pub async fn get_review_queue(
    State(state): State<ApiState>,
    Query(query): Query<ReviewQueueQuery>,
) -> Result<Json<ReviewQueueResponse>, ApiError> {
    let priority = match query.priority.as_deref() {
        Some(raw) => Some(raw.parse::<ReviewPriority>().map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: e,
                    code: "INVALID_PRIORITY".to_string(),
                    details: Some(serde_json::json!({
                        "allowed": ["URGENT", "HIGH", "MEDIUM"]
                    })),
                }),
            )
        })?),
        None => None,
    };
    let limit = state.clamp_limit(query.limit);

    let items = state
        .provider
        .review_items(limit, priority)
        .await
        .map_err(error_response)?;
    let counts = state.provider.review_counts().await.map_err(error_response)?;

    Ok(Json(ReviewQueueResponse {
        items,
        total_count: counts.unresolved_count,
        pending_urgent: counts.urgent_count,
        pending_high: counts.high_count,
    }))
}

/// Active quality alerts
#[utoipa::path(
    get,
    path = "/api/v1/confidence/alerts",
    responses(
        (status = 200, description = "Alerts in evaluation order", body = AlertsResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "confidence"
)]
pub async fn get_alerts(State(state): State<ApiState>) -> Result<Json<AlertsResponse>, ApiError> {
    let alerts = state.provider.alerts().await.map_err(error_response)?;
    Ok(Json(AlertsResponse {
        alert_count: alerts.len(),
        alerts,
        evaluated_at: chrono::Utc::now(),
    }))
}

/// Resolve a pending review item
#[utoipa::path(
    post,
    path = "/api/v1/confidence/review-queue/{id}/resolve",
    params(
        ("id" = String, Path, description = "Document identifier")
    ),
    request_body = ResolveRequest,
    responses(
        (status = 200, description = "Resolution outcome; success=false when nothing was pending", body = ResolveResponse)
    ),
    tag = "confidence"
)]
pub async fn resolve_review(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(request): Json<ResolveRequest>,
) -> Result<Json<ResolveResponse>, ApiError> {
    let document_id = DocumentId::new(id);
    let success = state
        .provider
        .resolve_review(document_id.clone(), request.resolution)
        .await
        .map_err(error_response)?;

    let message = if success {
        format!("Review for {} resolved", document_id)
    } else {
        format!("No pending review for {}", document_id)
    };
    Ok(Json(ResolveResponse { success, message }))
}

/// Derived quality metrics
#[utoipa::path(
    get,
    path = "/api/v1/confidence/metrics/summary",
    responses(
        (status = 200, description = "Percentages and averages", body = MetricsSummary),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "confidence"
)]
pub async fn get_metrics_summary(
    State(state): State<ApiState>,
) -> Result<Json<MetricsSummary>, ApiError> {
    state
        .provider
        .metrics_summary()
        .await
        .map(Json)
        .map_err(error_response)
}

/// Quality system health
#[utoipa::path(
    get,
    path = "/api/v1/confidence/health",
    responses(
        (status = 200, description = "Health report", body = HealthReport),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "confidence"
)]
pub async fn get_quality_health(
    State(state): State<ApiState>,
) -> Result<Json<HealthReport>, ApiError> {
    state
        .provider
        .health()
        .await
        .map(Json)
        .map_err(error_response)
}
