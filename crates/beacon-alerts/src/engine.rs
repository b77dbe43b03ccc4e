//! The generic rule engine.
//!
//! One [`RuleEngine`] drives every domain: it walks the dataset once in input
//! order, classifies each row, gives every finding a fresh [`AlertId`] and
//! writes the row's identifiers back into its `alert_id` column.

use std::collections::HashSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::dataset::Dataset;
use crate::datetime;
use crate::domains::{Domain, DomainKind};
use crate::error::Result;
use crate::id::{AlertId, join_ids};
use crate::log::AlertLog;
use crate::types::{AlertRecord, Severity};

/// Column that receives the comma-joined identifiers of a row's alerts.
pub const ALERT_ID_COLUMN: &str = "alert_id";

/// Counters for one engine run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Domain that was run.
    pub domain: DomainKind,
    /// Rows that were classified.
    pub rows_evaluated: usize,
    /// Rows skipped before classification.
    pub rows_skipped: usize,
    /// Alerts appended to the log.
    pub alerts_generated: usize,
    /// Critical alerts.
    pub critical: usize,
    /// Medium alerts.
    pub medium: usize,
    /// Low alerts.
    pub low: usize,
    /// Informational notices.
    pub info: usize,
}

impl RunReport {
    /// An empty report for a domain.
    #[must_use]
    pub const fn new(domain: DomainKind) -> Self {
        Self {
            domain,
            rows_evaluated: 0,
            rows_skipped: 0,
            alerts_generated: 0,
            critical: 0,
            medium: 0,
            low: 0,
            info: 0,
        }
    }

    fn record(&mut self, severity: Severity) {
        self.alerts_generated += 1;
        match severity {
            Severity::Critical => self.critical += 1,
            Severity::Medium => self.medium += 1,
            Severity::Low => self.low += 1,
            Severity::Info => self.info += 1,
        }
    }

    /// Count for one severity band.
    #[must_use]
    pub const fn count(&self, severity: Severity) -> usize {
        match severity {
            Severity::Critical => self.critical,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
            Severity::Info => self.info,
        }
    }
}

/// Everything a run produces.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Input dataset with its `alert_id` column filled in.
    pub dataset: Dataset,
    /// Log with the new records appended.
    pub log: AlertLog,
    /// Run counters.
    pub report: RunReport,
    /// Records generated by this run, in generation order.
    pub new_alerts: Vec<AlertRecord>,
}

/// Runs one domain's rules over a dataset.
pub struct RuleEngine {
    domain: Box<dyn Domain>,
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEngine")
            .field("domain", &self.domain.kind())
            .field("blocks", &self.domain.rules().blocks().len())
            .finish()
    }
}

impl RuleEngine {
    /// Wraps a domain classifier.
    #[must_use]
    pub fn new(domain: Box<dyn Domain>) -> Self {
        Self { domain }
    }

    /// Builds the engine for a domain from configuration.
    pub fn for_domain(kind: DomainKind, config: &PipelineConfig) -> Result<Self> {
        Ok(Self::new(kind.build(config)?))
    }

    /// The domain this engine runs.
    #[must_use]
    pub fn kind(&self) -> DomainKind {
        self.domain.kind()
    }

    /// Runs the engine with the current local time.
    #[must_use]
    pub fn run(&self, dataset: Dataset, log: AlertLog) -> RunOutcome {
        self.run_at(dataset, log, datetime::now())
    }

    /// Runs the engine as of `now`.
    ///
    /// `now` drives time-windowed rules and stamps every new record.
    /// Existing log records are never modified.
    #[must_use]
    pub fn run_at(&self, mut dataset: Dataset, mut log: AlertLog, now: NaiveDateTime) -> RunOutcome {
        let kind = self.domain.kind();
        let rules = self.domain.rules();
        let drops_skipped = self.domain.drops_skipped_rows();
        info!(domain = %kind, rows = dataset.len(), "running rule engine");

        let column = dataset.ensure_column(ALERT_ID_COLUMN);
        let mut taken = log.ids();
        let mut report = RunReport::new(kind);
        let mut new_alerts = Vec::new();
        let mut cells = Vec::with_capacity(dataset.len());
        let mut keep = Vec::with_capacity(dataset.len());

        for (index, row) in dataset.rows().enumerate() {
            let Some(facts) = self.domain.facts(&row, now) else {
                report.rows_skipped += 1;
                cells.push(String::new());
                keep.push(!drops_skipped);
                debug!(domain = %kind, row = index, "row skipped");
                continue;
            };
            report.rows_evaluated += 1;

            let findings = rules.classify(&facts);
            let mut ids = Vec::with_capacity(findings.len());
            for finding in findings {
                let id = fresh_id(&mut taken);
                report.record(finding.severity);
                debug!(domain = %kind, row = index, severity = %finding.severity, title = %finding.title, "alert");
                new_alerts.push(AlertRecord::from_finding(id.clone(), finding, now));
                ids.push(id);
            }
            cells.push(join_ids(&ids));
            keep.push(true);
        }

        for (index, cell) in cells.into_iter().enumerate() {
            dataset.set_cell(index, column, cell);
        }
        if drops_skipped && report.rows_skipped > 0 {
            dataset.retain_rows(&keep);
            info!(domain = %kind, skipped = report.rows_skipped, "removed skipped rows from output");
        }

        log.append(new_alerts.iter().cloned());
        info!(
            domain = %kind,
            alerts = report.alerts_generated,
            critical = report.critical,
            medium = report.medium,
            low = report.low,
            "rule engine completed"
        );

        RunOutcome {
            dataset,
            log,
            report,
            new_alerts,
        }
    }
}

/// Generates an identifier not yet in `taken` and reserves it.
fn fresh_id(taken: &mut HashSet<AlertId>) -> AlertId {
    loop {
        let id = AlertId::generate();
        if taken.insert(id.clone()) {
            return id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datetime::parse_datetime;
    use crate::id::split_ids;
    use proptest::prelude::*;

    fn now() -> NaiveDateTime {
        parse_datetime("2025-07-10 12:00:00").unwrap()
    }

    fn engine(kind: DomainKind) -> RuleEngine {
        RuleEngine::for_domain(kind, &PipelineConfig::default()).unwrap()
    }

    fn inventory_dataset() -> Dataset {
        let mut ds = Dataset::with_columns(&[
            "product_sku",
            "location_id",
            "current_stock",
            "safety_stock_units",
            "reorder_point_units",
            "on_hand_units",
            "available_for_sale_units",
        ]);
        ds.push_row(["SKU-1", "WH-1", "5", "100", "50", "20", "5"]);
        ds.push_row(["SKU-2", "WH-1", "500", "100", "50", "500", "500"]);
        ds.push_row(["SKU-3", "WH-2", "", "", "", "", ""]);
        ds
    }

    mod run_tests {
        use super::*;

        #[test]
        fn row_ids_join_generated_alerts_in_order() {
            let outcome = engine(DomainKind::Inventory).run_at(inventory_dataset(), AlertLog::new(), now());

            assert_eq!(outcome.new_alerts.len(), 2);
            let col = outcome.dataset.column_index(ALERT_ID_COLUMN).unwrap();
            let first = outcome.dataset.row(0).unwrap();
            let expected: Vec<_> = outcome.new_alerts.iter().map(|r| r.alert_id.clone()).collect();
            assert_eq!(first.get(ALERT_ID_COLUMN), Some(join_ids(&expected).as_str()));
            assert_eq!(split_ids(first.get_or(ALERT_ID_COLUMN, "")), expected);
            assert!(outcome.new_alerts[0].alert_title.contains("Stock Risk"));
            assert!(outcome.new_alerts[1].alert_title.contains("Discrepancy"));
            assert_eq!(col, outcome.dataset.headers().len() - 1);
        }

        #[test]
        fn rows_without_alerts_get_empty_cell() {
            let outcome = engine(DomainKind::Inventory).run_at(inventory_dataset(), AlertLog::new(), now());
            assert_eq!(outcome.dataset.len(), 3);
            assert_eq!(outcome.dataset.row(1).unwrap().get(ALERT_ID_COLUMN), None);
            assert_eq!(outcome.dataset.row(2).unwrap().get(ALERT_ID_COLUMN), None);
            assert_eq!(outcome.report.rows_evaluated, 3);
            assert_eq!(outcome.report.rows_skipped, 0);
        }

        #[test]
        fn report_counts_severities() {
            let outcome = engine(DomainKind::Inventory).run_at(inventory_dataset(), AlertLog::new(), now());
            let report = &outcome.report;
            assert_eq!(report.domain, DomainKind::Inventory);
            assert_eq!(report.alerts_generated, 2);
            assert_eq!(report.count(Severity::Critical), 2);
            assert_eq!(report.medium + report.low + report.info, 0);
        }

        #[test]
        fn existing_log_is_preserved() {
            let mut log = AlertLog::new();
            log.push(AlertRecord::from_finding(
                AlertId::from_persisted("existing"),
                crate::types::Finding::new("Old alert", "Weather", Severity::Low),
                now(),
            ));
            let before = log.records().to_vec();

            let outcome = engine(DomainKind::Inventory).run_at(inventory_dataset(), log, now());
            assert_eq!(outcome.log.len(), 3);
            assert_eq!(&outcome.log.records()[..1], before.as_slice());
            assert_eq!(&outcome.log.records()[1..], outcome.new_alerts.as_slice());
            assert!(outcome.new_alerts.iter().all(|r| r.created_at() == Some(now())));
        }

        #[test]
        fn weather_removes_failed_fetches() {
            let mut ds = Dataset::with_columns(&["City & State", "Temperature_C", "Weather_Fetch_Status"]);
            ds.push_row(["Chennai, TN", "41.0", "Success"]);
            ds.push_row(["Pune, MH", "45.0", "Failed"]);

            let outcome = engine(DomainKind::Weather).run_at(ds, AlertLog::new(), now());
            assert_eq!(outcome.dataset.len(), 1);
            assert_eq!(outcome.dataset.row(0).unwrap().get("City & State"), Some("Chennai, TN"));
            assert_eq!(outcome.report.rows_skipped, 1);
            assert_eq!(outcome.new_alerts.len(), 1);
            assert_eq!(outcome.new_alerts[0].severity_band(), Some(Severity::Critical));
            assert!(outcome.new_alerts[0].alert_title.contains("Heatwave"));
        }

        #[test]
        fn inactive_events_are_kept_without_alerts() {
            let mut ds = Dataset::with_columns(&["event_type", "region_id", "event_start_date", "event_end_date"]);
            ds.push_row(["local festival", "R1", "2025-07-01", "2025-07-02"]);

            let outcome = engine(DomainKind::LocalNews).run_at(ds, AlertLog::new(), now());
            assert_eq!(outcome.dataset.len(), 1);
            assert_eq!(outcome.report.rows_skipped, 1);
            assert!(outcome.new_alerts.is_empty());
        }

        #[test]
        fn empty_dataset_still_gets_column() {
            let outcome = engine(DomainKind::Supplier).run_at(Dataset::default(), AlertLog::new(), now());
            assert_eq!(outcome.dataset.headers(), [ALERT_ID_COLUMN.to_string()]);
            assert_eq!(outcome.report.alerts_generated, 0);
        }

        #[test]
        fn fresh_id_skips_taken() {
            let mut taken = HashSet::new();
            let a = fresh_id(&mut taken);
            let b = fresh_id(&mut taken);
            assert_ne!(a, b);
            assert!(taken.contains(&a) && taken.contains(&b));
        }
    }

    proptest! {
        #[test]
        fn alert_ids_are_unique_within_a_run(rates in proptest::collection::vec(0.0f64..0.03, 1..40)) {
            let mut ds = Dataset::with_columns(&["product_sku", "region_id", "conversion_rate", "online_views"]);
            for (i, rate) in rates.iter().enumerate() {
                ds.push_row([format!("SKU-{i}"), "R".to_string(), rate.to_string(), "100".to_string()]);
            }
            let outcome = engine(DomainKind::Ecommerce).run_at(ds, AlertLog::new(), now());

            let ids: HashSet<_> = outcome.new_alerts.iter().map(|r| r.alert_id.clone()).collect();
            prop_assert_eq!(ids.len(), outcome.new_alerts.len());
            prop_assert!(outcome.new_alerts.len() >= rates.len());
        }
    }
}
