//! Core types for the alert pipeline.
//!
//! This module provides the fundamental types shared by every domain engine:
//! - [`Severity`]: The severity band of an alert
//! - [`ComparisonOperator`]: Operators for comparing signal values to cutoffs
//! - [`Finding`]: A classifier result that has not been logged yet
//! - [`AlertRecord`]: One immutable row of the shared alert log

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::datetime::{format_timestamp, parse_datetime};
use crate::error::AlertError;
use crate::id::AlertId;

/// The severity band of an alert.
///
/// Ordered `Info < Low < Medium < Critical`. `Info` marks positive notices
/// and is never counted as an actionable band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Severity {
    /// Positive or informational notice, no action required.
    Info,
    /// Worth watching.
    Low,
    /// Should be investigated.
    Medium,
    /// Requires immediate attention.
    Critical,
}

impl Severity {
    /// Returns the severity as it is written to the alert log.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "Info",
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::Critical => "Critical",
        }
    }

    /// Returns the next band up. Critical and Info are left unchanged.
    #[must_use]
    pub const fn raised(self) -> Self {
        match self {
            Self::Low => Self::Medium,
            Self::Medium | Self::Critical => Self::Critical,
            Self::Info => Self::Info,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "critical" => Ok(Self::Critical),
            _ => Err(AlertError::InvalidSeverity {
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Severity {
    type Error = AlertError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Severity> for String {
    fn from(severity: Severity) -> Self {
        severity.as_str().to_string()
    }
}

/// Comparison operators for threshold cutoffs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOperator {
    /// Greater than (>).
    #[serde(rename = ">")]
    GreaterThan,
    /// Greater than or equal (>=).
    #[serde(rename = ">=")]
    GreaterThanOrEqual,
    /// Less than (<).
    #[serde(rename = "<")]
    LessThan,
    /// Less than or equal (<=).
    #[serde(rename = "<=")]
    LessThanOrEqual,
}

impl ComparisonOperator {
    /// Evaluates the comparison between two values.
    #[must_use]
    pub fn evaluate(&self, left: f64, right: f64) -> bool {
        match self {
            Self::GreaterThan => left > right,
            Self::GreaterThanOrEqual => left >= right,
            Self::LessThan => left < right,
            Self::LessThanOrEqual => left <= right,
        }
    }

    /// Returns the operator as a string symbol.
    #[must_use]
    pub const fn as_symbol(&self) -> &'static str {
        match self {
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
        }
    }

    /// Returns true when a smaller value is the worse one.
    #[must_use]
    pub const fn is_lower_worse(&self) -> bool {
        matches!(self, Self::LessThan | Self::LessThanOrEqual)
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_symbol())
    }
}

/// A (title, category, severity) triple produced by a rule block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Human-readable title.
    pub title: String,
    /// Domain category, e.g. `Weather`.
    pub category: String,
    /// Selected severity band.
    pub severity: Severity,
}

impl Finding {
    /// Creates a new finding.
    #[must_use]
    pub fn new(title: impl Into<String>, category: impl Into<String>, severity: Severity) -> Self {
        Self {
            title: title.into(),
            category: category.into(),
            severity,
        }
    }
}

/// One row of the shared alert log.
///
/// Field order is the column order of the persisted log. Severity and
/// timestamp hold the cell text as written, so rows produced by other tools
/// (`High`, `medium`, a blank time) survive a load and save unchanged. Use
/// [`AlertRecord::severity_band`] and [`AlertRecord::created_at`] for typed
/// access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRecord {
    /// Unique identifier.
    pub alert_id: AlertId,
    /// Human-readable title.
    pub alert_title: String,
    /// Domain category.
    pub category: String,
    /// Severity cell.
    pub severity: String,
    /// Creation time cell (local wall clock).
    pub timestamp: String,
}

impl AlertRecord {
    /// Creates a record for a finding.
    #[must_use]
    pub fn from_finding(alert_id: AlertId, finding: Finding, timestamp: NaiveDateTime) -> Self {
        Self {
            alert_id,
            alert_title: finding.title,
            category: finding.category,
            severity: finding.severity.to_string(),
            timestamp: format_timestamp(&timestamp),
        }
    }

    /// The severity band, if the cell names one (case-insensitive).
    #[must_use]
    pub fn severity_band(&self) -> Option<Severity> {
        self.severity.parse().ok()
    }

    /// The creation time, if the cell parses.
    #[must_use]
    pub fn created_at(&self) -> Option<NaiveDateTime> {
        parse_datetime(&self.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod severity_tests {
        use super::*;

        #[test]
        fn severity_as_str() {
            assert_eq!(Severity::Info.as_str(), "Info");
            assert_eq!(Severity::Low.as_str(), "Low");
            assert_eq!(Severity::Medium.as_str(), "Medium");
            assert_eq!(Severity::Critical.as_str(), "Critical");
        }

        #[test]
        fn severity_ordering() {
            assert!(Severity::Info < Severity::Low);
            assert!(Severity::Low < Severity::Medium);
            assert!(Severity::Medium < Severity::Critical);
        }

        #[test]
        fn severity_parse_is_case_insensitive() {
            assert_eq!("critical".parse::<Severity>().unwrap(), Severity::Critical);
            assert_eq!("MEDIUM".parse::<Severity>().unwrap(), Severity::Medium);
            assert_eq!(" Low ".parse::<Severity>().unwrap(), Severity::Low);
            assert_eq!("info".parse::<Severity>().unwrap(), Severity::Info);
        }

        #[test]
        fn severity_parse_rejects_unknown() {
            let err = "urgent".parse::<Severity>().unwrap_err();
            assert!(matches!(err, AlertError::InvalidSeverity { .. }));
        }

        #[test]
        fn severity_raised() {
            assert_eq!(Severity::Low.raised(), Severity::Medium);
            assert_eq!(Severity::Medium.raised(), Severity::Critical);
            assert_eq!(Severity::Critical.raised(), Severity::Critical);
            assert_eq!(Severity::Info.raised(), Severity::Info);
        }

        #[test]
        fn severity_serializes_as_log_text() {
            let json = serde_json::to_string(&Severity::Critical).unwrap();
            assert_eq!(json, "\"Critical\"");
            let parsed: Severity = serde_json::from_str("\"critical\"").unwrap();
            assert_eq!(parsed, Severity::Critical);
        }
    }

    mod operator_tests {
        use super::*;

        #[test]
        fn operator_evaluate() {
            assert!(ComparisonOperator::GreaterThan.evaluate(10.0, 5.0));
            assert!(!ComparisonOperator::GreaterThan.evaluate(5.0, 5.0));
            assert!(ComparisonOperator::GreaterThanOrEqual.evaluate(5.0, 5.0));
            assert!(ComparisonOperator::LessThan.evaluate(4.0, 5.0));
            assert!(!ComparisonOperator::LessThan.evaluate(5.0, 5.0));
            assert!(ComparisonOperator::LessThanOrEqual.evaluate(5.0, 5.0));
        }

        #[test]
        fn operator_direction() {
            assert!(ComparisonOperator::LessThan.is_lower_worse());
            assert!(!ComparisonOperator::GreaterThanOrEqual.is_lower_worse());
        }

        #[test]
        fn operator_display() {
            assert_eq!(ComparisonOperator::GreaterThanOrEqual.to_string(), ">=");
            assert_eq!(ComparisonOperator::LessThan.to_string(), "<");
        }
    }

    mod record_tests {
        use super::*;
        use crate::datetime::parse_datetime;

        #[test]
        fn record_from_finding() {
            let ts = parse_datetime("2025-07-10 12:00:00").unwrap();
            let finding = Finding::new("Critical Heatwave", "Weather", Severity::Critical);
            let record = AlertRecord::from_finding(AlertId::from_persisted("id-1"), finding, ts);

            assert_eq!(record.alert_id.as_str(), "id-1");
            assert_eq!(record.alert_title, "Critical Heatwave");
            assert_eq!(record.category, "Weather");
            assert_eq!(record.severity, "Critical");
            assert_eq!(record.severity_band(), Some(Severity::Critical));
            assert_eq!(record.timestamp, "2025-07-10 12:00:00");
            assert_eq!(record.created_at(), Some(ts));
        }

        #[test]
        fn foreign_cells_have_no_typed_value() {
            let record = AlertRecord {
                alert_id: AlertId::from_persisted("h1"),
                alert_title: "Imported".to_string(),
                category: "Weather".to_string(),
                severity: "High".to_string(),
                timestamp: String::new(),
            };
            assert_eq!(record.severity_band(), None);
            assert_eq!(record.created_at(), None);

            let lower = AlertRecord {
                severity: "medium".to_string(),
                timestamp: "2025-07-10".to_string(),
                ..record
            };
            assert_eq!(lower.severity_band(), Some(Severity::Medium));
            assert!(lower.created_at().is_some());
        }

        #[test]
        fn record_json_uses_log_formats() {
            let ts = parse_datetime("2025-07-10 12:00:00").unwrap();
            let record = AlertRecord::from_finding(
                AlertId::from_persisted("id-1"),
                Finding::new("t", "Weather", Severity::Low),
                ts,
            );
            let json = serde_json::to_value(&record).unwrap();
            assert_eq!(json["severity"], "Low");
            assert_eq!(json["timestamp"], "2025-07-10 12:00:00");
        }
    }
}
