//! Error types for the beacon-alerts crate.

use thiserror::Error;

/// Errors that can occur in the alert pipeline.
///
/// Data-quality problems never surface here: a malformed cell disables the
/// rule that needed it, and an unreadable input file loads as an empty
/// dataset. What remains are configuration mistakes and failures to persist.
#[derive(Debug, Error)]
pub enum AlertError {
    /// Invalid rule table.
    #[error("invalid rule: {reason}")]
    InvalidRule {
        /// The reason the rule is invalid.
        reason: String,
    },

    /// A severity string did not name a known severity band.
    #[error("invalid severity: {value}")]
    InvalidSeverity {
        /// The rejected value.
        value: String,
    },

    /// A domain name did not match any known domain.
    #[error("unknown domain: {name}")]
    UnknownDomain {
        /// The rejected name.
        name: String,
    },

    /// The primary dataset of a run had no rows.
    #[error("dataset is empty or missing: {path}")]
    EmptyDataset {
        /// Path of the dataset that was expected to contain rows.
        path: String,
    },

    /// Configuration could not be parsed.
    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration could not be rendered.
    #[error("configuration render error: {0}")]
    ConfigRender(#[from] toml::ser::Error),

    /// Tabular read or write failure.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for alert pipeline operations.
pub type Result<T> = std::result::Result<T, AlertError>;
