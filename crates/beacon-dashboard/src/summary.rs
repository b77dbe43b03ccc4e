//! Severity counts and category distribution.

use std::collections::HashMap;

use beacon_alerts::{AlertRecord, Severity};
use serde::{Deserialize, Serialize};

/// Alert counts by severity band.
///
/// `Info` notices and severities outside the known bands count towards
/// `total` only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeveritySummary {
    /// All records.
    pub total: usize,
    /// Critical records.
    pub critical: usize,
    /// Medium records.
    pub medium: usize,
    /// Low records.
    pub low: usize,
}

impl SeveritySummary {
    /// Counts a set of records.
    #[must_use]
    pub fn from_records(records: &[AlertRecord]) -> Self {
        records.iter().fold(Self::default(), |mut summary, record| {
            summary.total += 1;
            match record.severity_band() {
                Some(Severity::Critical) => summary.critical += 1,
                Some(Severity::Medium) => summary.medium += 1,
                Some(Severity::Low) => summary.low += 1,
                Some(Severity::Info) | None => {}
            }
            summary
        })
    }
}

/// Number of alerts in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    /// Category name.
    pub category: String,
    /// Number of alerts.
    pub count: usize,
}

/// Counts alerts per category, most frequent first.
///
/// Ties are ordered by category name.
#[must_use]
pub fn category_distribution(records: &[AlertRecord]) -> Vec<CategoryCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in records {
        *counts.entry(record.category.as_str()).or_default() += 1;
    }

    let mut distribution: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(category, count)| CategoryCount {
            category: category.to_string(),
            count,
        })
        .collect();
    distribution.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));
    distribution
}

#[cfg(test)]
mod tests {
    use super::*;
    use beacon_alerts::datetime::parse_datetime;
    use beacon_alerts::{AlertId, Finding};

    fn record(category: &str, severity: Severity) -> AlertRecord {
        AlertRecord::from_finding(
            AlertId::generate(),
            Finding::new("t", category, severity),
            parse_datetime("2025-07-10 12:00:00").unwrap(),
        )
    }

    fn mixed_log() -> Vec<AlertRecord> {
        let mut records = Vec::new();
        records.extend((0..4).map(|_| record("Weather", Severity::Critical)));
        records.extend((0..3).map(|_| record("Inventory", Severity::Medium)));
        records.extend((0..2).map(|_| record("E-commerce", Severity::Low)));
        records.push(record("Logistics/Supply Chain", Severity::Info));
        records
    }

    #[test]
    fn info_counts_towards_total_only() {
        let summary = SeveritySummary::from_records(&mixed_log());
        assert_eq!(
            summary,
            SeveritySummary {
                total: 10,
                critical: 4,
                medium: 3,
                low: 2,
            }
        );
    }

    #[test]
    fn foreign_severities_count_towards_total_only() {
        let mut records = vec![record("Weather", Severity::Medium); 2];
        records[0].severity = "critical".to_string();
        records[1].severity = "High".to_string();
        let summary = SeveritySummary::from_records(&records);
        assert_eq!(
            summary,
            SeveritySummary {
                total: 2,
                critical: 1,
                medium: 0,
                low: 0,
            }
        );
    }

    #[test]
    fn empty_summary() {
        assert_eq!(SeveritySummary::from_records(&[]), SeveritySummary::default());
    }

    #[test]
    fn distribution_is_sorted_by_count() {
        let mut records = mixed_log();
        records.push(record("Inventory", Severity::Low));
        let distribution = category_distribution(&records);
        let pairs: Vec<_> = distribution.iter().map(|c| (c.category.as_str(), c.count)).collect();
        assert_eq!(
            pairs,
            vec![
                ("Inventory", 4),
                ("Weather", 4),
                ("E-commerce", 2),
                ("Logistics/Supply Chain", 1),
            ]
        );
    }
}
