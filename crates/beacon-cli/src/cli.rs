//! Command-line argument parsing with clap.

use std::path::PathBuf;

use beacon_alerts::DomainKind;
use beacon_dashboard::DEFAULT_MAX_PER_CATEGORY;
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Beacon - threshold alerting over business datasets.
#[derive(Parser, Debug, Clone)]
#[command(name = "beacon")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (TOML). Built-in thresholds are used when absent.
    #[arg(short, long, global = true, env = "BEACON_CONFIG")]
    pub config: Option<PathBuf>,

    /// Data directory, overriding the configured one.
    #[arg(short, long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, global = true, value_enum, default_value_t = Format::Table)]
    pub format: Format,

    /// Log output format on stderr.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON output for scripting.
    Json,
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Plain text lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run one domain engine against its dataset.
    Run {
        /// Domain to run.
        #[arg(value_enum)]
        domain: DomainArg,
    },

    /// Run every domain engine in turn against the shared log.
    RunAll,

    /// Show a sampled view of the alert log.
    Dashboard(DashboardArgs),

    /// Print the effective configuration.
    Config,
}

/// Arguments for the dashboard command.
#[derive(Args, Debug, Clone)]
pub struct DashboardArgs {
    /// Alerts shown per category.
    #[arg(short, long, default_value_t = DEFAULT_MAX_PER_CATEGORY)]
    pub max_per_category: usize,

    /// Seed for reproducible sampling.
    #[arg(short, long)]
    pub seed: Option<u64>,
}

/// Domain names accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DomainArg {
    /// Weather readings.
    Weather,
    /// Inventory snapshots.
    Inventory,
    /// E-commerce funnel metrics.
    Ecommerce,
    /// Shipments.
    Logistics,
    /// Supplier scorecards.
    Supplier,
    /// Customer reviews.
    Reviews,
    /// Social media trends.
    #[value(name = "social_media")]
    SocialMedia,
    /// Local news and events.
    #[value(name = "local_news")]
    LocalNews,
}

impl From<DomainArg> for DomainKind {
    fn from(arg: DomainArg) -> Self {
        match arg {
            DomainArg::Weather => Self::Weather,
            DomainArg::Inventory => Self::Inventory,
            DomainArg::Ecommerce => Self::Ecommerce,
            DomainArg::Logistics => Self::Logistics,
            DomainArg::Supplier => Self::Supplier,
            DomainArg::Reviews => Self::Reviews,
            DomainArg::SocialMedia => Self::SocialMedia,
            DomainArg::LocalNews => Self::LocalNews,
        }
    }
}
