//! HTTP API server implementation
//!
//! Axum router, middleware stack and server lifecycle.

use axum::{extract::State, http::StatusCode, middleware, response::Json, Router};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;

use super::routes::{self, ApiState};
use super::traits::QualityApiProvider;
use super::types::{
    AlertsResponse, ErrorResponse, HealthResponse, ResolveRequest, ResolveResponse,
    ReviewQueueResponse,
};
use crate::alerts::{Alert, AlertSeverity, AlertType};
use crate::cache::CacheStats;
use crate::config::ApiConfig;
use crate::engine::SubmitRequest;
use crate::review::{ReviewItem, ReviewQueueSnapshot};
use crate::routing::{NextAction, RoutingDecision, RoutingPath};
use crate::stats::{DashboardSummary, HealthReport, HealthState, MetricsSummary, QualityMetricsSnapshot};
use crate::trend::{TrendDirection, TrendReport};
use crate::types::{ConfidenceBand, DocumentId, ReviewPriority, RuntimeError};

/// OpenAPI document for the query API
#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        routes::submit_document,
        routes::get_stats,
        routes::get_review_queue,
        routes::get_alerts,
        routes::resolve_review,
        routes::get_metrics_summary,
        routes::get_quality_health,
    ),
    components(schemas(
        SubmitRequest,
        RoutingDecision,
        RoutingPath,
        NextAction,
        ConfidenceBand,
        ReviewPriority,
        DocumentId,
        ReviewItem,
        ReviewQueueSnapshot,
        ReviewQueueResponse,
        Alert,
        AlertType,
        AlertSeverity,
        AlertsResponse,
        ResolveRequest,
        ResolveResponse,
        CacheStats,
        QualityMetricsSnapshot,
        TrendDirection,
        TrendReport,
        DashboardSummary,
        MetricsSummary,
        HealthState,
        HealthReport,
        HealthResponse,
        ErrorResponse,
    )),
    tags((name = "confidence", description = "Confidence routing and review queue"))
)]
pub struct ApiDoc;

/// HTTP API Server configuration
#[derive(Debug, Clone)]
pub struct HttpApiConfig {
    /// Server bind address
    pub bind_address: String,
    /// Server port
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Enable request tracing
    pub enable_tracing: bool,
    pub default_review_limit: usize,
    pub max_review_limit: usize,
}

impl Default for HttpApiConfig {
    fn default() -> Self {
        Self::from(&ApiConfig::default())
    }
}

impl From<&ApiConfig> for HttpApiConfig {
    fn from(api: &ApiConfig) -> Self {
        Self {
            bind_address: api.host.clone(),
            port: api.port,
            enable_cors: true,
            enable_tracing: true,
            default_review_limit: api.default_review_limit,
            max_review_limit: api.max_review_limit,
        }
    }
}

/// HTTP API Server
pub struct HttpApiServer {
    config: HttpApiConfig,
    provider: Arc<dyn QualityApiProvider>,
}

impl HttpApiServer {
    pub fn new(config: HttpApiConfig, provider: Arc<dyn QualityApiProvider>) -> Self {
        Self { config, provider }
    }

    /// Start the HTTP API server and run until the process is stopped
    pub async fn start(&self) -> Result<(), RuntimeError> {
        self.start_with_shutdown(std::future::pending()).await
    }

    /// Start the HTTP API server and stop gracefully once `signal` resolves
    pub async fn start_with_shutdown<F>(&self, signal: F) -> Result<(), RuntimeError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = format!("{}:{}", self.config.bind_address, self.config.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| RuntimeError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

        self.serve(listener, signal).await
    }

    /// Serve on an already-bound listener until `signal` resolves
    pub async fn serve<F>(&self, listener: TcpListener, signal: F) -> Result<(), RuntimeError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();

        if let Ok(addr) = listener.local_addr() {
            tracing::info!("HTTP API server starting on {}", addr);
        }

        axum::serve(listener, app)
            .with_graceful_shutdown(signal)
            .await
            .map_err(|e| RuntimeError::Internal(format!("Server error: {}", e)))?;

        tracing::info!("HTTP API server stopped");
        Ok(())
    }

    /// Build the Axum router with all routes and middleware
    pub fn router(&self) -> Router {
        use axum::routing::{get, post};

        let state = ApiState::new(self.provider.clone()).with_review_limits(
            self.config.default_review_limit,
            self.config.max_review_limit,
        );

        let confidence = Router::new()
            .route("/submit", post(routes::submit_document))
            .route("/stats", get(routes::get_stats))
            .route("/review-queue", get(routes::get_review_queue))
            .route("/review-queue/:id/resolve", post(routes::resolve_review))
            .route("/alerts", get(routes::get_alerts))
            .route("/metrics/summary", get(routes::get_metrics_summary))
            .route("/health", get(routes::get_quality_health));

        let mut router = Router::new()
            .route("/api/v1/health", get(health_check))
            .route("/api/v1/openapi.json", get(openapi_spec))
            .nest("/api/v1/confidence", confidence)
            .with_state(state);

        if self.config.enable_tracing {
            router = router
                .layer(middleware::from_fn(super::middleware::logging_middleware))
                .layer(TraceLayer::new_for_http());
        }

        if self.config.enable_cors {
            router = router.layer(CorsLayer::permissive());
        }

        router
    }
}

/// Health check endpoint handler
#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Server is up", body = HealthResponse)
    ),
    tag = "confidence"
)]
async fn health_check(
    State(state): State<ApiState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<ErrorResponse>)> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        uptime_seconds: state.provider.uptime_seconds(),
        timestamp: chrono::Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

async fn openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
