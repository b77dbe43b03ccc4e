//! CLI error types.

use beacon_dashboard::DashboardError;
use thiserror::Error;

/// Errors raised while rendering command output.
#[derive(Debug, Error)]
pub enum CliError {
    /// JSON serialization failed.
    #[error("format error: {0}")]
    Format(#[from] serde_json::Error),

    /// Rendering the dashboard failed.
    #[error("dashboard error: {0}")]
    Dashboard(#[from] DashboardError),

    /// Writing to the output failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
