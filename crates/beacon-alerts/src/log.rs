//! The shared alert log.
//!
//! Every engine loads the log, appends its new records in memory and writes
//! the whole log back. Saving overwrites the file, so two engines running
//! against the same path at the same time race and the last writer wins.
//! Engines are expected to run one after another.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::dataset::{Dataset, Row};
use crate::error::Result;
use crate::id::AlertId;
use crate::types::AlertRecord;

/// Column order of the persisted log.
pub const ALERT_LOG_COLUMNS: [&str; 5] = ["alert_id", "alert_title", "category", "severity", "timestamp"];

/// Ordered collection of alert records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertLog {
    records: Vec<AlertRecord>,
}

impl AlertLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a persisted log.
    ///
    /// A missing, empty or unparseable file yields an empty log. Every row is
    /// kept with its cells verbatim, including severities outside the known
    /// bands and timestamps that do not parse, so a later save writes them
    /// back unchanged. Missing columns read as empty cells.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let table = Dataset::load_with_columns(path, &ALERT_LOG_COLUMNS);
        let records: Vec<AlertRecord> = table.rows().map(|row| record_from_row(&row)).collect();

        let untyped = records
            .iter()
            .filter(|r| r.severity_band().is_none() || r.created_at().is_none())
            .count();
        if untyped > 0 {
            warn!(path = %path.display(), untyped, "alert log rows with unrecognised severity or timestamp");
        }
        debug!(path = %path.display(), records = records.len(), "loaded alert log");
        Self { records }
    }

    /// Writes the full log, replacing the file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        if self.records.is_empty() {
            writer.write_record(ALERT_LOG_COLUMNS)?;
        }
        for record in &self.records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        info!(path = %path.display(), records = self.len(), "alert log saved");
        Ok(())
    }

    /// Adds one record at the end.
    pub fn push(&mut self, record: AlertRecord) {
        self.records.push(record);
    }

    /// Adds records at the end, keeping existing ones untouched.
    pub fn append(&mut self, records: impl IntoIterator<Item = AlertRecord>) {
        self.records.extend(records);
    }

    /// All records in insertion order.
    #[must_use]
    pub fn records(&self) -> &[AlertRecord] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the log holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The last `n` records.
    #[must_use]
    pub fn tail(&self, n: usize) -> &[AlertRecord] {
        &self.records[self.records.len().saturating_sub(n)..]
    }

    /// Set of identifiers already in the log.
    #[must_use]
    pub fn ids(&self) -> HashSet<AlertId> {
        self.records.iter().map(|r| r.alert_id.clone()).collect()
    }
}

fn record_from_row(row: &Row<'_>) -> AlertRecord {
    AlertRecord {
        alert_id: AlertId::from_persisted(row.raw("alert_id")),
        alert_title: row.raw("alert_title").to_string(),
        category: row.raw("category").to_string(),
        severity: row.raw("severity").to_string(),
        timestamp: row.raw("timestamp").to_string(),
    }
}

impl From<Vec<AlertRecord>> for AlertLog {
    fn from(records: Vec<AlertRecord>) -> Self {
        Self { records }
    }
}
