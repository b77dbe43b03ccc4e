//! Dashboard command implementation.

use std::io::Write;

use anyhow::Context;
use beacon_alerts::PipelineConfig;
use beacon_dashboard::DashboardReport;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::cli::DashboardArgs;
use crate::output::OutputFormat;

/// Dashboard command executor.
pub struct DashboardCommand {
    config: PipelineConfig,
}

impl DashboardCommand {
    /// Create a new dashboard command.
    #[must_use]
    pub const fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Execute the dashboard command.
    pub fn execute<W: Write>(&self, writer: &mut W, format: &OutputFormat, args: &DashboardArgs) -> anyhow::Result<()> {
        let report = self.build(args)?;
        format.write(writer, &report)?;
        Ok(())
    }

    /// Build the report, seeding the sampler when a seed is given.
    pub fn build(&self, args: &DashboardArgs) -> anyhow::Result<DashboardReport> {
        let path = self.config.alert_log_path();
        let report = match args.seed {
            Some(seed) => DashboardReport::load(&path, args.max_per_category, &mut StdRng::seed_from_u64(seed)),
            None => DashboardReport::load(&path, args.max_per_category, &mut rand::thread_rng()),
        };
        report.with_context(|| format!("failed to build dashboard from {}", path.display()))
    }
}
