//! Output formatting for CLI commands.
//!
//! Supports table (human-readable) and JSON output formats.

use std::io::Write;

use beacon_alerts::{AlertRecord, DomainKind, DomainRun, RunReport};
use beacon_dashboard::{DashboardReport, SampledAlert, truncate};
use serde::Serialize;

use crate::cli::Format;
use crate::error::CliError;

/// Number of newly generated alerts echoed after a run.
pub const RECENT_ALERTS: usize = 10;

/// Output formatter that handles both table and JSON output.
#[derive(Debug, Clone)]
pub struct OutputFormat {
    format: Format,
}

impl OutputFormat {
    /// Create a new output formatter.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self { format }
    }

    /// Get the current format.
    #[must_use]
    pub const fn format(&self) -> Format {
        self.format
    }

    /// Check if JSON format is selected.
    #[must_use]
    pub const fn is_json(&self) -> bool {
        matches!(self.format, Format::Json)
    }

    /// Write a value in the selected format.
    pub fn write<W, T>(&self, writer: &mut W, value: &T) -> Result<(), CliError>
    where
        W: Write,
        T: Serialize + TableDisplay,
    {
        match self.format {
            Format::Json => {
                serde_json::to_writer_pretty(&mut *writer, value)?;
                writeln!(writer)?;
            }
            Format::Table => value.write_table(writer)?,
        }
        Ok(())
    }

    /// Render a value to a string in the selected format.
    pub fn to_string<T>(&self, value: &T) -> Result<String, CliError>
    where
        T: Serialize + TableDisplay,
    {
        let mut buf = Vec::new();
        self.write(&mut buf, value)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::new(Format::Table)
    }
}

/// Trait for types that can be displayed as a table.
pub trait TableDisplay {
    /// Write the value as a human-readable table.
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError>;
}

/// Outcome of `beacon run`.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Run counters.
    pub report: RunReport,
    /// Annotated dataset location.
    pub output_path: String,
    /// Alert log size after the run.
    pub log_size: usize,
    /// The last alerts generated by this run, oldest first.
    pub recent_alerts: Vec<AlertRecord>,
}

impl From<DomainRun> for RunSummary {
    fn from(run: DomainRun) -> Self {
        let skip = run.new_alerts.len().saturating_sub(RECENT_ALERTS);
        Self {
            report: run.report,
            output_path: run.output_path.display().to_string(),
            log_size: run.log_len,
            recent_alerts: run.new_alerts.into_iter().skip(skip).collect(),
        }
    }
}

impl TableDisplay for RunSummary {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        let report = &self.report;
        writeln!(writer, "Run Report: {}", report.domain)?;
        writeln!(writer, "══════════════════════════════════")?;
        writeln!(writer, "Rows Evaluated:   {}", report.rows_evaluated)?;
        writeln!(writer, "Rows Skipped:     {}", report.rows_skipped)?;
        writeln!(writer, "Alerts Generated: {}", report.alerts_generated)?;
        writeln!(writer, "  Critical:       {}", report.critical)?;
        writeln!(writer, "  Medium:         {}", report.medium)?;
        writeln!(writer, "  Low:            {}", report.low)?;
        writeln!(writer, "  Info:           {}", report.info)?;
        writeln!(writer, "Output:           {}", self.output_path)?;
        writeln!(writer, "Alert Log Size:   {}", self.log_size)?;
        writeln!(writer)?;

        if self.recent_alerts.is_empty() {
            writeln!(writer, "No alerts generated")?;
            return Ok(());
        }

        writeln!(writer, "Recent Alerts")?;
        writeln!(
            writer,
            "{:<22}  {:<64}  {:<8}  {:<19}",
            "ALERT ID", "ALERT TITLE", "SEVERITY", "TIMESTAMP"
        )?;
        writeln!(writer, "{}", "─".repeat(119))?;
        for alert in self.recent_alerts.iter().cloned().map(SampledAlert::from) {
            writeln!(
                writer,
                "{:<22}  {:<64}  {:<8}  {:<19}",
                alert.alert_id,
                truncate(&alert.alert_title, 64),
                alert.severity,
                alert.timestamp
            )?;
        }
        Ok(())
    }
}

/// Outcome of one domain within `beacon run-all`.
#[derive(Debug, Clone, Serialize)]
pub struct DomainOutcome {
    /// Domain that was run.
    pub domain: DomainKind,
    /// Counters, when the run reached disk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<RunReport>,
    /// Failure message, when it did not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of `beacon run-all`.
#[derive(Debug, Clone, Serialize)]
pub struct RunAllSummary {
    /// Per-domain outcomes in run order.
    pub domains: Vec<DomainOutcome>,
}

impl RunAllSummary {
    /// Alerts generated across all successful domains.
    #[must_use]
    pub fn total_alerts(&self) -> usize {
        self.domains.iter().filter_map(|d| d.report.as_ref()).map(|r| r.alerts_generated).sum()
    }

    /// Number of domains that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.domains.iter().filter(|d| d.error.is_some()).count()
    }
}

impl TableDisplay for RunAllSummary {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(
            writer,
            "{:<12}  {:<6}  {:>6}  {:>7}  {:>6}  {:>8}  {:>6}  {:>4}  {:>4}",
            "DOMAIN", "STATUS", "ROWS", "SKIPPED", "ALERTS", "CRITICAL", "MEDIUM", "LOW", "INFO"
        )?;
        writeln!(writer, "{}", "─".repeat(79))?;
        for outcome in &self.domains {
            match &outcome.report {
                Some(r) => writeln!(
                    writer,
                    "{:<12}  {:<6}  {:>6}  {:>7}  {:>6}  {:>8}  {:>6}  {:>4}  {:>4}",
                    outcome.domain.as_str(),
                    "ok",
                    r.rows_evaluated,
                    r.rows_skipped,
                    r.alerts_generated,
                    r.critical,
                    r.medium,
                    r.low,
                    r.info
                )?,
                None => writeln!(
                    writer,
                    "{:<12}  {:<6}  {}",
                    outcome.domain.as_str(),
                    "failed",
                    outcome.error.as_deref().unwrap_or("unknown error")
                )?,
            }
        }
        writeln!(writer)?;
        writeln!(
            writer,
            "Total: {} alert(s), {} of {} domain(s) failed",
            self.total_alerts(),
            self.failed(),
            self.domains.len()
        )?;
        Ok(())
    }
}

impl TableDisplay for DashboardReport {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        self.write_text(writer)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beacon_alerts::datetime::parse_datetime;
    use beacon_alerts::{AlertId, Finding, Severity};
    use std::path::PathBuf;

    fn alert(i: usize) -> AlertRecord {
        AlertRecord::from_finding(
            AlertId::from_persisted(format!("id-{i}")),
            Finding::new(format!("Alert {i}"), "Weather", Severity::Low),
            parse_datetime("2025-07-10 09:30:00").unwrap(),
        )
    }

    fn domain_run(alerts: usize) -> DomainRun {
        let mut report = RunReport::new(DomainKind::Weather);
        report.rows_evaluated = 3;
        report.alerts_generated = alerts;
        report.low = alerts;
        DomainRun {
            report,
            new_alerts: (0..alerts).map(alert).collect(),
            output_path: PathBuf::from("data/weather_with_alerts.csv"),
            log_len: alerts + 5,
        }
    }

    mod format_tests {
        use super::*;

        #[test]
        fn default_is_table() {
            let format = OutputFormat::default();
            assert_eq!(format.format(), Format::Table);
            assert!(!format.is_json());
        }

        #[test]
        fn json_output_is_parseable() {
            let format = OutputFormat::new(Format::Json);
            let out = format.to_string(&RunSummary::from(domain_run(2))).unwrap();
            let value: serde_json::Value = serde_json::from_str(&out).unwrap();
            assert_eq!(value["report"]["alerts_generated"], 2);
            assert_eq!(value["log_size"], 7);
            assert_eq!(value["recent_alerts"][1]["alert_id"], "id-1");
        }
    }

    mod run_summary_tests {
        use super::*;

        #[test]
        fn keeps_the_last_ten_alerts() {
            let summary = RunSummary::from(domain_run(14));
            assert_eq!(summary.recent_alerts.len(), RECENT_ALERTS);
            assert_eq!(summary.recent_alerts[0].alert_id.as_str(), "id-4");
            assert_eq!(summary.recent_alerts[9].alert_id.as_str(), "id-13");
        }

        #[test]
        fn table_lists_counts_and_alerts() {
            let out = OutputFormat::default().to_string(&RunSummary::from(domain_run(2))).unwrap();
            assert!(out.contains("Run Report: weather"));
            assert!(out.contains("Alerts Generated: 2"));
            assert!(out.contains("Alert Log Size:   7"));
            assert!(out.contains("Recent Alerts"));
            assert!(out.contains("2025-07-10 09:30:00"));
        }

        #[test]
        fn table_cuts_long_titles() {
            let mut run = domain_run(1);
            run.new_alerts[0].alert_title = "x".repeat(80);
            let out = OutputFormat::default().to_string(&RunSummary::from(run)).unwrap();
            assert!(out.contains(&format!("{}...", "x".repeat(61))));
            assert!(!out.contains(&"x".repeat(62)));
        }

        #[test]
        fn table_without_alerts() {
            let out = OutputFormat::default().to_string(&RunSummary::from(domain_run(0))).unwrap();
            assert!(out.contains("No alerts generated"));
        }
    }

    mod run_all_tests {
        use super::*;

        fn summary() -> RunAllSummary {
            RunAllSummary {
                domains: vec![
                    DomainOutcome {
                        domain: DomainKind::Weather,
                        report: Some(domain_run(3).report),
                        error: None,
                    },
                    DomainOutcome {
                        domain: DomainKind::Inventory,
                        report: None,
                        error: Some("dataset data/inventory.csv is empty".to_string()),
                    },
                ],
            }
        }

        #[test]
        fn totals() {
            let s = summary();
            assert_eq!(s.total_alerts(), 3);
            assert_eq!(s.failed(), 1);
        }

        #[test]
        fn table_shows_failures() {
            let out = OutputFormat::default().to_string(&summary()).unwrap();
            assert!(out.contains("inventory     failed  dataset data/inventory.csv is empty"));
            assert!(out.contains("Total: 3 alert(s), 1 of 2 domain(s) failed"));
        }

        #[test]
        fn json_skips_missing_fields() {
            let out = OutputFormat::new(Format::Json).to_string(&summary()).unwrap();
            let value: serde_json::Value = serde_json::from_str(&out).unwrap();
            assert!(value["domains"][0].get("error").is_none());
            assert!(value["domains"][1].get("report").is_none());
        }
    }
}
