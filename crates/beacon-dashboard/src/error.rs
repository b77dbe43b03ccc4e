//! Error types for the dashboard.

use thiserror::Error;

/// Result type alias for dashboard operations.
pub type DashboardResult<T> = Result<T, DashboardError>;

/// Errors that can occur while building or rendering a dashboard.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Invalid request parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Writing the rendered report failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
