//! Configuration loading and the `config` command.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use beacon_alerts::PipelineConfig;
use tracing::debug;

use crate::output::OutputFormat;

/// Loads the configuration file when given, then applies the data directory
/// override.
pub fn resolve_config(path: Option<&Path>, data_dir: Option<PathBuf>) -> anyhow::Result<PipelineConfig> {
    let mut config = match path {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => {
            debug!("no configuration file given, using built-in thresholds");
            PipelineConfig::default()
        }
    };
    if let Some(dir) = data_dir {
        config.data_dir = dir;
    }
    Ok(config)
}

/// Prints the effective configuration.
pub struct ConfigCommand {
    config: PipelineConfig,
}

impl ConfigCommand {
    /// Create a new config command.
    #[must_use]
    pub const fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Execute the config command. Table format prints TOML.
    pub fn execute<W: Write>(&self, writer: &mut W, format: &OutputFormat) -> anyhow::Result<()> {
        if format.is_json() {
            serde_json::to_writer_pretty(&mut *writer, &self.config).context("failed to render configuration")?;
            writeln!(writer)?;
        } else {
            let rendered = self.config.to_toml_string().context("failed to render configuration")?;
            write!(writer, "{rendered}")?;
        }
        Ok(())
    }
}
