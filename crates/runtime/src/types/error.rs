//! Error types for the docqc runtime

use thiserror::Error;

pub use crate::config::ConfigError;
pub use crate::metrics::SnapshotError;
pub use crate::routing::RoutingError;

/// Top-level runtime error
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Routing error: {0}")]
    Routing(#[from] RoutingError),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("Scheduler error: {0}")]
    Scheduler(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RuntimeError {
    /// Whether the failure happened before serving traffic and must abort startup.
    pub fn is_fatal(&self) -> bool {
        matches!(self, RuntimeError::Configuration(_))
    }

    /// Caller errors such as an out-of-range score are never worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RuntimeError::Snapshot(_))
    }
}

/// Result type used across the runtime
pub type RuntimeResult<T> = Result<T, RuntimeError>;
