//! The dashboard report: summary cards, a sampled alert table and a bar chart
//! of alerts per category.
//!
//! Summary counts describe the sampled table. The bar chart always covers the
//! full log.

use std::io::Write;
use std::path::Path;

use beacon_alerts::{AlertLog, AlertRecord};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{DashboardError, DashboardResult};
use crate::sampler::sample;
use crate::summary::{CategoryCount, SeveritySummary, category_distribution};

/// Layout used for timestamps in the alert table.
pub const DISPLAY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const BAR_WIDTH: usize = 40;
const TITLE_WIDTH: usize = 64;

/// One row of the sampled alert table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampledAlert {
    /// Alert identifier.
    pub alert_id: String,
    /// Alert title.
    pub alert_title: String,
    /// Category.
    pub category: String,
    /// Severity as logged.
    pub severity: String,
    /// Creation time to the second, or the logged text when it does not parse.
    pub timestamp: String,
}

impl From<AlertRecord> for SampledAlert {
    fn from(record: AlertRecord) -> Self {
        let timestamp = record
            .created_at()
            .map_or(record.timestamp, |ts| ts.format(DISPLAY_TIMESTAMP_FORMAT).to_string());
        Self {
            alert_id: record.alert_id.to_string(),
            alert_title: record.alert_title,
            category: record.category,
            severity: record.severity,
            timestamp,
        }
    }
}

/// Everything the dashboard shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardReport {
    /// Counts over the sampled alerts.
    pub summary: SeveritySummary,
    /// Sampled alerts in display order.
    pub alerts: Vec<SampledAlert>,
    /// Alerts per category over the full log.
    pub categories: Vec<CategoryCount>,
    /// Number of records in the full log.
    pub log_size: usize,
}

impl DashboardReport {
    /// Builds a report from log records.
    pub fn build<R: Rng + ?Sized>(
        records: &[AlertRecord],
        max_per_category: usize,
        rng: &mut R,
    ) -> DashboardResult<Self> {
        if max_per_category == 0 {
            return Err(DashboardError::InvalidRequest(
                "max_per_category must be at least 1".to_string(),
            ));
        }

        let sampled = sample(records, max_per_category, rng);
        debug!(sampled = sampled.len(), total = records.len(), "sampled alerts");
        Ok(Self {
            summary: SeveritySummary::from_records(&sampled),
            alerts: sampled.into_iter().map(SampledAlert::from).collect(),
            categories: category_distribution(records),
            log_size: records.len(),
        })
    }

    /// Loads the alert log at `path` and builds a report from it.
    pub fn load<R: Rng + ?Sized>(path: &Path, max_per_category: usize, rng: &mut R) -> DashboardResult<Self> {
        let log = AlertLog::load(path);
        info!(path = %path.display(), alerts = log.len(), "loaded alert log for dashboard");
        Self::build(log.records(), max_per_category, rng)
    }

    /// Renders the report as pretty JSON.
    pub fn to_json(&self) -> DashboardResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Renders the report as plain text.
    pub fn write_text<W: Write>(&self, writer: &mut W) -> DashboardResult<()> {
        writeln!(writer, "Alert Summary")?;
        writeln!(writer, "══════════════════════════════════")?;
        writeln!(writer, "Total Alerts:     {}", self.summary.total)?;
        writeln!(writer, "Critical Alerts:  {}", self.summary.critical)?;
        writeln!(writer, "Medium Alerts:    {}", self.summary.medium)?;
        writeln!(writer, "Low Alerts:       {}", self.summary.low)?;
        writeln!(writer)?;

        writeln!(writer, "Current Problem Alerts (Sampled)")?;
        if self.alerts.is_empty() {
            writeln!(writer, "No alert data to display.")?;
        } else {
            writeln!(
                writer,
                "{:<22}  {:<64}  {:<22}  {:<8}  {:<19}",
                "ALERT ID", "ALERT TITLE", "CATEGORY", "SEVERITY", "TIMESTAMP"
            )?;
            writeln!(writer, "{}", "─".repeat(143))?;
            for alert in &self.alerts {
                writeln!(
                    writer,
                    "{:<22}  {:<64}  {:<22}  {:<8}  {:<19}",
                    alert.alert_id,
                    truncate(&alert.alert_title, TITLE_WIDTH),
                    alert.category,
                    alert.severity,
                    alert.timestamp
                )?;
            }
        }
        writeln!(writer)?;

        writeln!(writer, "Alerts by Category")?;
        if self.categories.is_empty() {
            writeln!(writer, "No alert data available for the category chart.")?;
            return Ok(());
        }
        let widest = self.categories.iter().map(|c| c.category.chars().count()).max().unwrap_or(0);
        let largest = self.categories.iter().map(|c| c.count).max().unwrap_or(0);
        for entry in &self.categories {
            writeln!(
                writer,
                "{:<widest$}  {} {}",
                entry.category,
                bar(entry.count, largest),
                entry.count
            )?;
        }
        Ok(())
    }

    /// Renders the report as a plain text string.
    pub fn to_text(&self) -> DashboardResult<String> {
        let mut buf = Vec::new();
        self.write_text(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// A bar scaled so the largest count spans [`BAR_WIDTH`] cells. Non-zero
/// counts always get at least one cell.
fn bar(count: usize, largest: usize) -> String {
    if largest == 0 || count == 0 {
        return String::new();
    }
    let cells = (count * BAR_WIDTH).div_ceil(largest);
    "█".repeat(cells)
}

/// Shortens `s` to `max_chars` characters, ending in `...` when cut.
#[must_use]
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else if max_chars > 3 {
        let kept: String = s.chars().take(max_chars - 3).collect();
        format!("{kept}...")
    } else {
        s.chars().take(max_chars).collect()
    }
}
