//! Inventory snapshots per SKU and location.
//!
//! Five independent checks: stockout risk against safety stock, overstock
//! against storage capacity and days of supply, on-hand vs. available
//! discrepancy, slow-moving stock, and sales velocity outrunning stock.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{Domain, DomainKind};
use crate::config::Tiers;
use crate::dataset::Row;
use crate::error::Result;
use crate::rules::{Band, BandSeverity, Facts, Operand, Predicate, RuleBlock, RuleSet};
use crate::types::{ComparisonOperator, Severity};

/// Inventory thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// Fractions of safety stock below which stock is at risk.
    pub stockout_safety_factors: Tiers,
    /// Fractions of storage capacity above which stock is excessive.
    pub overstock_capacity_factors: Tiers,
    /// Days of supply above which stock is excessive.
    pub overstock_days_of_supply: Tiers,
    /// Absolute on-hand vs. available difference, in units.
    pub discrepancy_units: Tiers,
    /// Fractions of average daily sales below which stock is slow-moving.
    /// The critical factor also requires stock above the reorder point.
    pub slow_moving_sales_factors: Tiers,
    /// Multiples of average daily sales above which sales are unusually fast.
    pub high_sales_factors: Tiers,
    /// Days of average sales the stock must fall short of for a velocity alert.
    pub high_sales_cover_days: Tiers,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            stockout_safety_factors: Tiers::new(0.2, 0.5, 1.0),
            overstock_capacity_factors: Tiers::new(1.05, 0.95, 0.85),
            overstock_days_of_supply: Tiers::new(90.0, 60.0, 30.0),
            discrepancy_units: Tiers::new(10.0, 5.0, 1.0),
            slow_moving_sales_factors: Tiers::new(0.0, 0.25, 0.5),
            high_sales_factors: Tiers::new(2.0, 1.5, 1.2),
            high_sales_cover_days: Tiers::new(2.0, 3.0, 4.0),
        }
    }
}

/// Inventory classifier.
#[derive(Debug, Clone)]
pub struct Inventory {
    config: InventoryConfig,
    rules: RuleSet,
}

const fn scaled(signal: &'static str, factor: f64) -> Operand {
    Operand::Scaled { signal, factor }
}

fn stockout(config: &InventoryConfig) -> RuleBlock {
    let f = config.stockout_safety_factors;
    RuleBlock::composite(
        "stockout",
        vec![
            Band::new(
                Predicate::le("effective_stock", 0.0),
                BandSeverity::Fixed(Severity::Critical),
                "Critical Stockout for {context} (Stock: {current_stock:int})",
            ),
            Band::new(
                Predicate::lt("effective_stock", scaled("safety_stock", f.critical)),
                BandSeverity::Fixed(Severity::Critical),
                "Critical Stock Risk for {context} (Stock: {effective_stock:int} < {safety_critical:int} of Safety Stock)",
            ),
            Band::new(
                Predicate::lt("effective_stock", scaled("safety_stock", f.medium)),
                BandSeverity::Fixed(Severity::Medium),
                "Medium Stock Risk for {context} (Stock: {effective_stock:int} < {safety_medium:int} of Safety Stock)",
            ),
            Band::new(
                Predicate::lt("effective_stock", scaled("safety_stock", f.low)),
                BandSeverity::Fixed(Severity::Low),
                "Low Stock Risk for {context} (Stock: {effective_stock:int} < Safety Stock)",
            ),
            Band::new(
                Predicate::lt("effective_stock", Operand::Signal("reorder_point")),
                BandSeverity::Fixed(Severity::Low),
                "Reorder Point Reached for {context} (Stock: {effective_stock:int})",
            ),
        ],
    )
    .gated(Predicate::All(vec![
        Predicate::Present("effective_stock"),
        Predicate::Present("safety_stock"),
        Predicate::Present("reorder_point"),
    ]))
}

fn overstock(config: &InventoryConfig) -> RuleBlock {
    let cap = config.overstock_capacity_factors;
    let dos = config.overstock_days_of_supply;
    let title = "{severity} Overstock for {context} (Stock: {current_stock:int}, Capacity: {capacity:int}, DoS: {days_of_supply:.1})";
    let band = |cap_factor: f64, days: f64, severity: Severity| {
        Band::new(
            Predicate::Any(vec![
                Predicate::gt("current_stock", scaled("capacity", cap_factor)),
                Predicate::gt("days_of_supply", days),
            ]),
            BandSeverity::Fixed(severity),
            title,
        )
    };
    RuleBlock::composite(
        "overstock",
        vec![
            band(cap.critical, dos.critical, Severity::Critical),
            band(cap.medium, dos.medium, Severity::Medium),
            band(cap.low, dos.low, Severity::Low),
        ],
    )
    .gated(Predicate::All(vec![
        Predicate::Present("current_stock"),
        Predicate::Present("capacity"),
        Predicate::gt("daily_sales_avg", 0.0),
    ]))
}

fn slow_moving(config: &InventoryConfig) -> RuleBlock {
    let f = config.slow_moving_sales_factors;
    let title = "{severity} Slow-Moving Inventory for {context} ({last_24h_sales:int} sales vs {daily_sales_avg:int} avg)";
    RuleBlock::composite(
        "slow_moving",
        vec![
            Band::new(
                Predicate::All(vec![
                    Predicate::ge("last_24h_sales", 0.0),
                    Predicate::le("last_24h_sales", scaled("daily_sales_avg", f.critical)),
                    Predicate::gt("current_stock", Operand::Signal("reorder_point")),
                ]),
                BandSeverity::Fixed(Severity::Critical),
                "Critical Slow-Moving Inventory for {context} (0 Sales, High Stock)",
            ),
            Band::new(
                Predicate::lt("last_24h_sales", scaled("daily_sales_avg", f.medium)),
                BandSeverity::Fixed(Severity::Medium),
                title,
            ),
            Band::new(
                Predicate::lt("last_24h_sales", scaled("daily_sales_avg", f.low)),
                BandSeverity::Fixed(Severity::Low),
                title,
            ),
        ],
    )
    .gated(Predicate::All(vec![
        Predicate::Present("last_24h_sales"),
        Predicate::gt("daily_sales_avg", 0.0),
        Predicate::Present("current_stock"),
        Predicate::Present("reorder_point"),
    ]))
}

fn sales_velocity(config: &InventoryConfig) -> RuleBlock {
    let f = config.high_sales_factors;
    let days = config.high_sales_cover_days;
    let title = "{severity} High Sales Velocity for {context} (Sales: {last_24h_sales:int}x avg, Stock: {current_stock:int})";
    let band = |factor: f64, cover: f64, severity: Severity| {
        Band::new(
            Predicate::All(vec![
                Predicate::gt("last_24h_sales", scaled("daily_sales_avg", factor)),
                Predicate::lt("current_stock", scaled("daily_sales_avg", cover)),
            ]),
            BandSeverity::Fixed(severity),
            title,
        )
    };
    RuleBlock::composite(
        "sales_velocity",
        vec![
            band(f.critical, days.critical, Severity::Critical),
            band(f.medium, days.medium, Severity::Medium),
            band(f.low, days.low, Severity::Low),
        ],
    )
    .gated(Predicate::All(vec![
        Predicate::Present("last_24h_sales"),
        Predicate::Present("current_stock"),
        Predicate::gt("daily_sales_avg", 0.0),
    ]))
}

impl Inventory {
    /// Builds the classifier.
    pub fn new(config: &InventoryConfig) -> Result<Self> {
        let blocks = vec![
            stockout(config),
            overstock(config),
            RuleBlock::threshold(
                "discrepancy",
                "discrepancy",
                ComparisonOperator::GreaterThanOrEqual,
                config
                    .discrepancy_units
                    .cutoffs("{severity} Inventory Discrepancy for {context} (Diff: {value:int})"),
            ),
            slow_moving(config),
            sales_velocity(config),
        ];
        Ok(Self {
            config: config.clone(),
            rules: RuleSet::new(DomainKind::Inventory.category(), blocks)?,
        })
    }
}

impl Domain for Inventory {
    fn kind(&self) -> DomainKind {
        DomainKind::Inventory
    }

    fn rules(&self) -> &RuleSet {
        &self.rules
    }

    fn facts(&self, row: &Row<'_>, _now: NaiveDateTime) -> Option<Facts> {
        let current_stock = row.number("current_stock");
        let in_transit = row.number("in_transit_in");
        let daily_avg = row.number("daily_sales_avg");
        let safety = row.number("safety_stock_units");
        let effective = match (current_stock, in_transit) {
            (Some(stock), Some(incoming)) => Some(stock + incoming),
            (stock, _) => stock,
        };
        let discrepancy = row
            .number("on_hand_units")
            .zip(row.number("available_for_sale_units"))
            .map(|(on_hand, available)| (on_hand - available).abs());
        let days_of_supply = current_stock
            .zip(daily_avg.filter(|avg| *avg > 0.0))
            .map(|(stock, avg)| stock / avg);

        let factors = self.config.stockout_safety_factors;
        let context = format!(
            "SKU: {}, Location: {}",
            row.get_or("product_sku", "Unknown SKU"),
            row.get_or("location_id", "Unknown Location")
        );

        let mut facts = Facts::new();
        facts
            .set_text("context", Some(context))
            .set_number("current_stock", current_stock)
            .set_number("effective_stock", effective)
            .set_number("safety_stock", safety)
            .set_number("safety_critical", safety.map(|s| s * factors.critical))
            .set_number("safety_medium", safety.map(|s| s * factors.medium))
            .set_number("reorder_point", row.number("reorder_point_units"))
            .set_number("capacity", row.number("storage_capacity_units"))
            .set_number("daily_sales_avg", daily_avg)
            .set_number("last_24h_sales", row.number("last_24h_sales"))
            .set_number("days_of_supply", days_of_supply)
            .set_number("discrepancy", discrepancy);
        Some(facts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::datetime::parse_datetime;
    use crate::types::Finding;

    const HEADERS: [&str; 11] = [
        "location_id",
        "product_sku",
        "current_stock",
        "in_transit_in",
        "daily_sales_avg",
        "last_24h_sales",
        "safety_stock_units",
        "reorder_point_units",
        "storage_capacity_units",
        "on_hand_units",
        "available_for_sale_units",
    ];

    fn classify(cells: [&str; 11]) -> Vec<Finding> {
        let inventory = Inventory::new(&InventoryConfig::default()).unwrap();
        let mut ds = Dataset::with_columns(&HEADERS);
        ds.push_row(cells);
        let now = parse_datetime("2025-07-10 12:00:00").unwrap();
        let facts = inventory.facts(&ds.row(0).unwrap(), now).unwrap();
        inventory.rules().classify(&facts)
    }

    fn severities(findings: &[Finding]) -> Vec<Severity> {
        findings.iter().map(|f| f.severity).collect()
    }

    #[test]
    fn below_safety_with_discrepancy_gives_two_alerts() {
        let findings = classify(["S1", "SKU-1", "30", "0", "", "", "100", "150", "", "30", "18"]);
        assert_eq!(findings.len(), 2);
        assert_eq!(
            findings[0].title,
            "Medium Stock Risk for SKU: SKU-1, Location: S1 (Stock: 30 < 50 of Safety Stock)"
        );
        assert_eq!(
            findings[1].title,
            "Critical Inventory Discrepancy for SKU: SKU-1, Location: S1 (Diff: 12)"
        );
        assert_eq!(severities(&findings), vec![Severity::Medium, Severity::Critical]);
    }

    #[test]
    fn absolute_stockout() {
        let findings = classify(["S1", "SKU-1", "0", "", "", "", "100", "150", "", "", ""]);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].title, "Critical Stockout for SKU: SKU-1, Location: S1 (Stock: 0)");
    }

    #[test]
    fn in_transit_counts_toward_stock() {
        let findings = classify(["S1", "SKU-1", "10", "130", "", "", "100", "150", "", "", ""]);
        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].title,
            "Reorder Point Reached for SKU: SKU-1, Location: S1 (Stock: 140)"
        );
    }

    #[test]
    fn stockout_requires_reorder_point() {
        let findings = classify(["S1", "SKU-1", "0", "", "", "", "100", "", "", "", ""]);
        assert!(findings.is_empty());
    }

    #[test]
    fn overstock_by_days_of_supply() {
        let findings = classify(["S1", "SKU-1", "700", "", "10", "10", "50", "100", "10000", "", ""]);
        assert_eq!(severities(&findings), vec![Severity::Medium]);
        assert_eq!(
            findings[0].title,
            "Medium Overstock for SKU: SKU-1, Location: S1 (Stock: 700, Capacity: 10000, DoS: 70.0)"
        );
    }

    #[test]
    fn overstock_by_capacity() {
        let findings = classify(["S1", "SKU-1", "1100", "", "100", "100", "50", "100", "1000", "", ""]);
        assert_eq!(severities(&findings), vec![Severity::Critical]);
    }

    #[test]
    fn zero_sales_with_high_stock_is_critical_slow_moving() {
        let findings = classify(["S1", "SKU-1", "200", "", "20", "0", "50", "100", "", "", ""]);
        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].title,
            "Critical Slow-Moving Inventory for SKU: SKU-1, Location: S1 (0 Sales, High Stock)"
        );
    }

    #[test]
    fn net_returns_are_not_zero_sales() {
        let findings = classify(["S1", "SKU-1", "200", "", "20", "-3", "50", "100", "", "", ""]);
        assert_eq!(severities(&findings), vec![Severity::Medium]);
        assert!(findings[0].title.starts_with("Medium Slow-Moving Inventory"));
    }

    #[test]
    fn slow_moving_medium() {
        let findings = classify(["S1", "SKU-1", "200", "", "20", "4", "50", "100", "", "", ""]);
        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].title,
            "Medium Slow-Moving Inventory for SKU: SKU-1, Location: S1 (4 sales vs 20 avg)"
        );
    }

    #[test]
    fn high_sales_velocity() {
        let findings = classify(["S1", "SKU-1", "30", "", "20", "45", "", "", "", "", ""]);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Critical);
        assert_eq!(
            findings[0].title,
            "Critical High Sales Velocity for SKU: SKU-1, Location: S1 (Sales: 45x avg, Stock: 30)"
        );
    }

    #[test]
    fn zero_average_disables_sales_rules() {
        let findings = classify(["S1", "SKU-1", "500", "", "0", "0", "", "", "100", "", ""]);
        assert!(findings.is_empty());
    }
}
