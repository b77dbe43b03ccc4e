//! File-level orchestration: load a domain dataset and the shared log, run
//! the engine, write both back.

use std::fs;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use tracing::{error, info, warn};

use crate::config::PipelineConfig;
use crate::dataset::Dataset;
use crate::datetime;
use crate::domains::DomainKind;
use crate::engine::{RuleEngine, RunReport};
use crate::error::{AlertError, Result};
use crate::log::AlertLog;
use crate::types::AlertRecord;

/// Result of one domain run that reached disk.
#[derive(Debug, Clone)]
pub struct DomainRun {
    /// Run counters.
    pub report: RunReport,
    /// Records appended to the log by this run.
    pub new_alerts: Vec<AlertRecord>,
    /// Where the annotated dataset was written.
    pub output_path: PathBuf,
    /// Size of the log after the run.
    pub log_len: usize,
}

/// Runs domain engines against files under the configured data directory.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Creates a pipeline.
    #[must_use]
    pub const fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs one domain with the current local time.
    pub fn run_domain(&self, kind: DomainKind) -> Result<DomainRun> {
        self.run_domain_at(kind, datetime::now())
    }

    /// Runs one domain as of `now`.
    ///
    /// An empty or missing input dataset stops the run before anything is
    /// written. Failures to write the output or the log are returned.
    pub fn run_domain_at(&self, kind: DomainKind, now: NaiveDateTime) -> Result<DomainRun> {
        let engine = RuleEngine::for_domain(kind, &self.config)?;
        fs::create_dir_all(&self.config.data_dir)?;

        let input = self.config.input_path(kind);
        let dataset = Dataset::load(&input);
        if dataset.is_empty() {
            error!(domain = %kind, path = %input.display(), "input dataset is empty or missing");
            return Err(AlertError::EmptyDataset {
                path: input.display().to_string(),
            });
        }
        info!(domain = %kind, rows = dataset.len(), path = %input.display(), "loaded dataset");

        let log_path = self.config.alert_log_path();
        let log = AlertLog::load(&log_path);
        if log.is_empty() {
            info!(path = %log_path.display(), "no existing alerts, starting a new log");
        } else {
            info!(path = %log_path.display(), alerts = log.len(), "loaded existing alerts");
        }

        let outcome = engine.run_at(dataset, log, now);

        let output_path = self.config.output_path(kind);
        outcome.dataset.save(&output_path)?;
        outcome.log.save(&log_path)?;

        Ok(DomainRun {
            report: outcome.report,
            new_alerts: outcome.new_alerts,
            output_path,
            log_len: outcome.log.len(),
        })
    }

    /// Runs every domain in turn with the current local time.
    pub fn run_all(&self) -> Vec<(DomainKind, Result<DomainRun>)> {
        self.run_all_at(datetime::now())
    }

    /// Runs every domain in turn as of `now`.
    ///
    /// Each domain reloads the log written by the previous one. A failing
    /// domain is reported and the remaining domains still run.
    pub fn run_all_at(&self, now: NaiveDateTime) -> Vec<(DomainKind, Result<DomainRun>)> {
        DomainKind::ALL
            .iter()
            .map(|&kind| {
                let result = self.run_domain_at(kind, now);
                if let Err(err) = &result {
                    warn!(domain = %kind, error = %err, "domain run failed");
                }
                (kind, result)
            })
            .collect()
    }
}
