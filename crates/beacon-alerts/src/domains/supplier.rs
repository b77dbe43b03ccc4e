//! Supplier scorecards.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{Domain, DomainKind};
use crate::config::Tiers;
use crate::dataset::Row;
use crate::error::Result;
use crate::rules::{Facts, RuleBlock, RuleSet};
use crate::types::ComparisonOperator;

/// Supplier thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupplierConfig {
    /// On-time delivery ratio; lower is worse.
    pub on_time_delivery_rate: Tiers,
    /// Defect rate in percent; higher is worse.
    pub defect_rate_percent: Tiers,
    /// Quality score out of ten; lower is worse.
    pub quality_score: Tiers,
    /// Lead time in days; higher is worse.
    pub lead_time_days: Tiers,
}

impl Default for SupplierConfig {
    fn default() -> Self {
        Self {
            on_time_delivery_rate: Tiers::new(0.85, 0.90, 0.95),
            defect_rate_percent: Tiers::new(3.0, 2.0, 1.0),
            quality_score: Tiers::new(7.0, 8.0, 8.5),
            lead_time_days: Tiers::new(14.0, 10.0, 7.0),
        }
    }
}

/// Supplier classifier.
#[derive(Debug, Clone)]
pub struct Supplier {
    rules: RuleSet,
}

impl Supplier {
    /// Builds the classifier.
    pub fn new(config: &SupplierConfig) -> Result<Self> {
        use ComparisonOperator::{GreaterThanOrEqual, LessThan};

        let blocks = vec![
            RuleBlock::threshold(
                "on_time_delivery",
                "on_time_delivery_rate",
                LessThan,
                config
                    .on_time_delivery_rate
                    .cutoffs("{SEVERITY} Supplier OTD: {context} ({value:pct} OTD)"),
            ),
            RuleBlock::threshold(
                "defect_rate",
                "defect_rate_percent",
                GreaterThanOrEqual,
                config
                    .defect_rate_percent
                    .cutoffs("{SEVERITY} Supplier Defect Rate: {context} ({value:.1}% Defect Rate)"),
            ),
            RuleBlock::threshold(
                "quality_score",
                "quality_score",
                LessThan,
                config
                    .quality_score
                    .cutoffs("{SEVERITY} Supplier Quality Score: {context} (Score: {value:.1})"),
            ),
            RuleBlock::threshold(
                "lead_time",
                "lead_time_days",
                GreaterThanOrEqual,
                config
                    .lead_time_days
                    .cutoffs("{SEVERITY} Supplier Lead Time: {context} ({value:int} days)"),
            ),
        ];

        Ok(Self {
            rules: RuleSet::new(DomainKind::Supplier.category(), blocks)?,
        })
    }
}

impl Domain for Supplier {
    fn kind(&self) -> DomainKind {
        DomainKind::Supplier
    }

    fn rules(&self) -> &RuleSet {
        &self.rules
    }

    fn facts(&self, row: &Row<'_>, _now: NaiveDateTime) -> Option<Facts> {
        let context = format!(
            "Supplier: {}, SKU: {}",
            row.get_or("supplier_id", "Unknown Supplier"),
            row.get_or("product_sku", "Unknown SKU")
        );
        let mut facts = Facts::new();
        facts
            .set_text("context", Some(context))
            .set_number("on_time_delivery_rate", row.number("on_time_delivery_rate"))
            .set_number("defect_rate_percent", row.number("defect_rate_percent"))
            .set_number("quality_score", row.number("quality_score"))
            .set_number("lead_time_days", row.number("lead_time_days"));
        Some(facts)
    }
}
