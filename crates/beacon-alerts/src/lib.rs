//! Threshold and keyword alerting over tabular business data.
//!
//! `beacon-alerts` reads one CSV dataset per monitored domain, classifies
//! every row against that domain's rule table and appends the resulting
//! alerts to a shared CSV alert log.
//!
//! # Features
//!
//! - **Declarative rules**: threshold, keyword and composite rule blocks
//!   evaluated by a single [`RuleSet`] evaluator
//! - **Eight domains**: weather, inventory, e-commerce, logistics, supplier,
//!   reviews, social media trends and local news
//! - **Exclusive banding**: each rule block reports at most one severity per row
//! - **Critical overrides**: a block can stop evaluation of the rest of a row
//! - **Tunable thresholds**: every constant lives in [`PipelineConfig`]
//!
//! # Example
//!
//! ```rust
//! use beacon_alerts::{AlertLog, Dataset, DomainKind, PipelineConfig, RuleEngine, Severity};
//!
//! let engine = RuleEngine::for_domain(DomainKind::Ecommerce, &PipelineConfig::default())?;
//!
//! let mut dataset = Dataset::with_columns(&["product_sku", "region_id", "conversion_rate"]);
//! dataset.push_row(["SKU-1", "North", "0.010"]);
//!
//! let outcome = engine.run(dataset, AlertLog::new());
//! assert_eq!(outcome.new_alerts.len(), 1);
//! assert_eq!(outcome.new_alerts[0].severity_band(), Some(Severity::Medium));
//! # Ok::<(), beacon_alerts::AlertError>(())
//! ```
//!
//! # Files
//!
//! [`Pipeline`] wires the engine to the data directory: it reads
//! `<data_dir>/<domain>.csv`, writes `<data_dir>/<domain>_with_alerts.csv`
//! and rewrites the shared log at `<data_dir>/alerts.csv`. Saving replaces
//! the whole log, so engines sharing a log must run one after another.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod dataset;
pub mod datetime;
pub mod domains;
pub mod engine;
pub mod error;
pub mod id;
pub mod log;
pub mod pipeline;
pub mod rules;
pub mod types;

pub use config::{KeywordLists, PipelineConfig, Tiers};
pub use dataset::{Dataset, Row};
pub use domains::{Domain, DomainKind};
pub use engine::{RuleEngine, RunOutcome, RunReport};
pub use error::{AlertError, Result};
pub use id::AlertId;
pub use log::{ALERT_LOG_COLUMNS, AlertLog};
pub use pipeline::{DomainRun, Pipeline};
pub use rules::{Facts, RuleBlock, RuleSet};
pub use types::{AlertRecord, ComparisonOperator, Finding, Severity};
