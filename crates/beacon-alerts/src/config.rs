//! Pipeline configuration.
//!
//! Every threshold, factor and keyword list the domains use lives here so a
//! deployment can tune them without code changes. All fields are optional in
//! the TOML file; an empty file yields the stock values.
//!
//! ```toml
//! data_dir = "data"
//! alert_log = "alerts.csv"
//!
//! [ecommerce.conversion_rate]
//! critical = 0.005
//! medium = 0.010
//! low = 0.015
//! ```
//!
//! Threshold tables (`critical`/`medium`/`low`) must be given in full when
//! overridden.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domains::DomainKind;
use crate::domains::ecommerce::EcommerceConfig;
use crate::domains::inventory::InventoryConfig;
use crate::domains::local_news::LocalNewsConfig;
use crate::domains::logistics::LogisticsConfig;
use crate::domains::reviews::ReviewsConfig;
use crate::domains::social_media::SocialMediaConfig;
use crate::domains::supplier::SupplierConfig;
use crate::domains::weather::WeatherConfig;
use crate::error::Result;
use crate::rules::{Cutoff, KeywordTier, Template};
use crate::types::Severity;

/// Default data directory.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Default alert log file name.
pub const DEFAULT_ALERT_LOG: &str = "alerts.csv";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory holding domain datasets, outputs and the alert log.
    pub data_dir: PathBuf,
    /// File name of the shared alert log inside `data_dir`.
    pub alert_log: String,
    /// Weather thresholds.
    pub weather: WeatherConfig,
    /// Inventory thresholds.
    pub inventory: InventoryConfig,
    /// E-commerce thresholds.
    pub ecommerce: EcommerceConfig,
    /// Logistics thresholds.
    pub logistics: LogisticsConfig,
    /// Supplier thresholds.
    pub supplier: SupplierConfig,
    /// Review keywords.
    pub reviews: ReviewsConfig,
    /// Social media thresholds.
    pub social_media: SocialMediaConfig,
    /// Local news keywords and thresholds.
    pub local_news: LocalNewsConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            alert_log: DEFAULT_ALERT_LOG.to_string(),
            weather: WeatherConfig::default(),
            inventory: InventoryConfig::default(),
            ecommerce: EcommerceConfig::default(),
            logistics: LogisticsConfig::default(),
            supplier: SupplierConfig::default(),
            reviews: ReviewsConfig::default(),
            social_media: SocialMediaConfig::default(),
            local_news: LocalNewsConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Loads configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&raw)?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Renders the configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Path of the shared alert log.
    #[must_use]
    pub fn alert_log_path(&self) -> PathBuf {
        self.data_dir.join(&self.alert_log)
    }

    /// Path of a domain's input dataset.
    #[must_use]
    pub fn input_path(&self, kind: DomainKind) -> PathBuf {
        self.data_dir.join(format!("{}.csv", kind.file_stem()))
    }

    /// Path of a domain's annotated output dataset.
    #[must_use]
    pub fn output_path(&self, kind: DomainKind) -> PathBuf {
        self.data_dir
            .join(format!("{}_with_alerts.csv", kind.file_stem()))
    }
}

/// Three cutoffs, most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tiers {
    /// Critical cutoff.
    pub critical: f64,
    /// Medium cutoff.
    pub medium: f64,
    /// Low cutoff.
    pub low: f64,
}

impl Tiers {
    /// Creates a tier table.
    #[must_use]
    pub const fn new(critical: f64, medium: f64, low: f64) -> Self {
        Self {
            critical,
            medium,
            low,
        }
    }

    /// Cutoffs sharing one title template.
    #[must_use]
    pub fn cutoffs(&self, title: &str) -> Vec<Cutoff> {
        vec![
            Cutoff::new(self.critical, Severity::Critical, title),
            Cutoff::new(self.medium, Severity::Medium, title),
            Cutoff::new(self.low, Severity::Low, title),
        ]
    }
}

/// Keyword lists, most severe first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordLists {
    /// Critical keywords.
    pub critical: Vec<String>,
    /// Medium keywords.
    pub medium: Vec<String>,
    /// Low keywords.
    pub low: Vec<String>,
}

impl KeywordLists {
    /// Builds lists from string slices.
    #[must_use]
    pub fn new(critical: &[&str], medium: &[&str], low: &[&str]) -> Self {
        Self {
            critical: strings(critical),
            medium: strings(medium),
            low: strings(low),
        }
    }

    /// Keyword tiers sharing one title template. Empty lists are skipped.
    #[must_use]
    pub fn tiers(&self, title: &str) -> Vec<KeywordTier> {
        [
            (Severity::Critical, &self.critical),
            (Severity::Medium, &self.medium),
            (Severity::Low, &self.low),
        ]
        .into_iter()
        .filter(|(_, words)| !words.is_empty())
        .map(|(severity, words)| KeywordTier::new(severity, words, Template::new(title)))
        .collect()
    }
}

/// Owned copies of static keyword lists.
#[must_use]
pub fn strings(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| (*w).to_string()).collect()
}
