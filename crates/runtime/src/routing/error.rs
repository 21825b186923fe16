//! Error types for the routing module

use thiserror::Error;

/// Errors that can occur while classifying a document
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RoutingError {
    /// Caller contract violation: the score is outside `[0.0, 1.0]` or NaN.
    #[error("Invalid confidence score: {score} (expected a value in [0.0, 1.0])")]
    InvalidScore { score: f64 },

    #[error("Invalid document id: {reason}")]
    InvalidDocumentId { reason: String },
}

/// Result type for routing operations
pub type RoutingResult<T> = Result<T, RoutingError>;

impl RoutingError {
    /// Routing errors are caller bugs and are never retried.
    pub fn is_retryable(&self) -> bool {
        false
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            RoutingError::InvalidScore { .. } => ErrorSeverity::Medium,
            RoutingError::InvalidDocumentId { .. } => ErrorSeverity::Low,
        }
    }

    /// Stable machine-readable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            RoutingError::InvalidScore { .. } => "INVALID_SCORE",
            RoutingError::InvalidDocumentId { .. } => "INVALID_DOCUMENT_ID",
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// Reject scores outside the closed interval `[0.0, 1.0]`.
pub fn validate_score(score: f64) -> RoutingResult<()> {
    if (0.0..=1.0).contains(&score) {
        Ok(())
    } else {
        Err(RoutingError::InvalidScore { score })
    }
}
