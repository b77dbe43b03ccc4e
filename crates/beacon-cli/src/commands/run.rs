//! Engine run commands.

use std::io::Write;

use anyhow::{Context, bail};
use beacon_alerts::{DomainKind, Pipeline, PipelineConfig};
use tracing::info;

use crate::output::{DomainOutcome, OutputFormat, RunAllSummary, RunSummary};

/// Runs a single domain engine.
pub struct RunCommand {
    pipeline: Pipeline,
}

impl RunCommand {
    /// Create a new run command.
    #[must_use]
    pub const fn new(config: PipelineConfig) -> Self {
        Self {
            pipeline: Pipeline::new(config),
        }
    }

    /// Execute the run command.
    ///
    /// An empty input dataset fails the command and leaves every file
    /// untouched.
    pub fn execute<W: Write>(&self, writer: &mut W, format: &OutputFormat, domain: DomainKind) -> anyhow::Result<()> {
        let run = self
            .pipeline
            .run_domain(domain)
            .with_context(|| format!("{domain} engine failed"))?;
        format.write(writer, &RunSummary::from(run))?;
        Ok(())
    }
}

/// Runs every domain engine in turn against the shared log.
pub struct RunAllCommand {
    pipeline: Pipeline,
}

impl RunAllCommand {
    /// Create a new run-all command.
    #[must_use]
    pub const fn new(config: PipelineConfig) -> Self {
        Self {
            pipeline: Pipeline::new(config),
        }
    }

    /// Runs all domains and collects their outcomes.
    pub fn collect(&self) -> RunAllSummary {
        let domains = self
            .pipeline
            .run_all()
            .into_iter()
            .map(|(domain, result)| match result {
                Ok(run) => DomainOutcome {
                    domain,
                    report: Some(run.report),
                    error: None,
                },
                Err(e) => DomainOutcome {
                    domain,
                    report: None,
                    error: Some(e.to_string()),
                },
            })
            .collect();
        RunAllSummary { domains }
    }

    /// Execute the run-all command.
    ///
    /// Fails only when no domain completed.
    pub fn execute<W: Write>(&self, writer: &mut W, format: &OutputFormat) -> anyhow::Result<()> {
        let summary = self.collect();
        format.write(writer, &summary)?;

        if summary.failed() == summary.domains.len() {
            bail!("no domain engine completed");
        }
        info!(
            alerts = summary.total_alerts(),
            failed = summary.failed(),
            "all domain engines finished"
        );
        Ok(())
    }
}
