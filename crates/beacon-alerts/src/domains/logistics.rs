//! Shipment tracking.
//!
//! A shipment in a critical status raises one Critical alert and nothing
//! else. Otherwise delayed shipments are banded by hours late, with large
//! consignments escalated, and on-time deliveries are logged as `Info`.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{Domain, DomainKind};
use crate::config::strings;
use crate::dataset::Row;
use crate::datetime::{hours_between, parse_datetime};
use crate::error::Result;
use crate::rules::{Band, BandSeverity, Facts, Predicate, RuleBlock, RuleSet};
use crate::types::Severity;

/// Logistics thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticsConfig {
    /// Statuses that raise a single Critical alert for the shipment.
    pub critical_statuses: Vec<String>,
    /// Delay in hours for a Critical delay alert.
    pub critical_delay_hours: f64,
    /// Delay in hours for a Medium delay alert.
    pub medium_delay_hours: f64,
    /// Units at which a delay is escalated by one band (Low and Medium).
    pub high_quantity: f64,
    /// Units at which a Low delay is escalated to Medium.
    pub medium_quantity: f64,
}

impl Default for LogisticsConfig {
    fn default() -> Self {
        Self {
            critical_statuses: strings(&[
                "delayed",
                "damaged",
                "lost",
                "stuck_in_customs",
                "return_to_origin",
                "exception",
            ]),
            critical_delay_hours: 48.0,
            medium_delay_hours: 24.0,
            high_quantity: 500.0,
            medium_quantity: 100.0,
        }
    }
}

/// Logistics classifier.
#[derive(Debug, Clone)]
pub struct Logistics {
    high_quantity: f64,
    rules: RuleSet,
}

impl Logistics {
    /// Builds the classifier.
    pub fn new(config: &LogisticsConfig) -> Result<Self> {
        let mut blocks = Vec::new();

        if !config.critical_statuses.is_empty() {
            blocks.push(
                RuleBlock::composite(
                    "critical_status",
                    vec![Band::new(
                        Predicate::one_of("status", &config.critical_statuses),
                        BandSeverity::Fixed(Severity::Critical),
                        "CRITICAL LOGISTICS ALERT: Shipment {shipment_id} Status: {status:upper}.{impact} Reason: {reason}. {context}",
                    )],
                )
                .overriding(),
            );
        }

        let delay_title =
            "{severity} Delay: Shipment {shipment_id} delayed by ~{delay_hours:int} hours. Reason: {reason}. {context}";
        blocks.push(
            RuleBlock::composite(
                "delay",
                vec![
                    Band::new(
                        Predicate::ge("delay_hours", config.critical_delay_hours),
                        BandSeverity::Fixed(Severity::Critical),
                        delay_title,
                    ),
                    Band::new(
                        Predicate::ge("delay_hours", config.medium_delay_hours),
                        BandSeverity::Fixed(Severity::Medium),
                        delay_title,
                    ),
                    Band::new(
                        Predicate::gt("delay_hours", 0.0),
                        BandSeverity::Fixed(Severity::Low),
                        delay_title,
                    ),
                ],
            )
            .gated(Predicate::equals("status", "delayed"))
            .escalate(
                Predicate::ge("quantity", config.high_quantity),
                &[Severity::Low, Severity::Medium],
            )
            .escalate(Predicate::ge("quantity", config.medium_quantity), &[Severity::Low]),
        );

        blocks.push(
            RuleBlock::composite(
                "delivered",
                vec![
                    Band::new(
                        Predicate::gt("early_hours", 0.0),
                        BandSeverity::Fixed(Severity::Info),
                        "Positive Logistics: Shipment {shipment_id} arrived {early_hours:int} hours early. {context}",
                    ),
                    Band::new(
                        Predicate::Present("early_hours"),
                        BandSeverity::Fixed(Severity::Info),
                        "Positive Logistics: Shipment {shipment_id} arrived on time. {context}",
                    ),
                ],
            )
            .gated(Predicate::equals("status", "delivered")),
        );

        Ok(Self {
            high_quantity: config.high_quantity,
            rules: RuleSet::new(DomainKind::Logistics.category(), blocks)?,
        })
    }
}

/// Hours a shipment is late.
///
/// Arrival delay comes from the actual arrival, else the estimate, else the
/// current time while the scheduled arrival has passed. A later departure
/// delay takes precedence.
fn delay_hours(row: &Row<'_>, now: NaiveDateTime) -> f64 {
    let scheduled = row.get("ScheduledArrivalTime").and_then(parse_datetime);
    let actual = row.get("ActualArrivalTime").and_then(parse_datetime);
    let estimated = row.get("EstimatedTimeOfArrival").and_then(parse_datetime);

    let arrival = match (scheduled, actual, estimated) {
        (Some(s), Some(a), _) if a > s => hours_between(s, a),
        (Some(s), None, Some(e)) if e > s => hours_between(s, e),
        (Some(s), None, _) if now > s => hours_between(s, now),
        _ => 0.0,
    };

    let departure = match (
        row.get("ScheduledDepartureTime").and_then(parse_datetime),
        row.get("ActualDepartureTime").and_then(parse_datetime),
    ) {
        (Some(s), Some(a)) if a > s => hours_between(s, a),
        _ => 0.0,
    };

    arrival.max(departure)
}

impl Domain for Logistics {
    fn kind(&self) -> DomainKind {
        DomainKind::Logistics
    }

    fn rules(&self) -> &RuleSet {
        &self.rules
    }

    fn facts(&self, row: &Row<'_>, now: NaiveDateTime) -> Option<Facts> {
        let status = row.text("Status");
        let quantity = row.number("Quantity");
        let shipment_id = row.get_or("ShipmentID", "N/A");
        let reason = match row.text("DelayReason") {
            r if r.is_empty() => "Not specified".to_string(),
            r => r,
        };
        let context = format!(
            "Shipment: {shipment_id}, Order: {}, Product: {} ({} units), From: {} to: {}, Carrier: {}",
            row.get_or("OrderID", "N/A"),
            row.get_or("ProductID", "N/A"),
            row.get_or("Quantity", "N/A"),
            row.get_or("OriginLocation", "Unknown"),
            row.get_or("DestinationLocation", "Unknown"),
            row.get_or("CarrierID", "Unknown"),
        );
        #[allow(clippy::cast_possible_truncation)]
        let impact = match quantity {
            Some(q) if q >= self.high_quantity => format!(" High impact due to {} units.", q.trunc() as i64),
            _ => String::new(),
        };

        let early_hours = match (
            row.get("ScheduledArrivalTime").and_then(parse_datetime),
            row.get("ActualArrivalTime").and_then(parse_datetime),
        ) {
            (Some(scheduled), Some(actual)) if actual <= scheduled => Some(hours_between(actual, scheduled)),
            _ => None,
        };

        let mut facts = Facts::new();
        facts
            .set_text("status", Some(status.as_str()))
            .set_text("shipment_id", Some(shipment_id))
            .set_text("reason", Some(reason))
            .set_text("context", Some(context))
            .set_text("impact", Some(impact))
            .set_number("quantity", quantity)
            .set_number("early_hours", early_hours);
        if status == "delayed" {
            facts.set_number("delay_hours", Some(delay_hours(row, now)));
        }
        Some(facts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::types::Finding;
    use test_case::test_case;

    const HEADERS: [&str; 12] = [
        "ShipmentID",
        "OrderID",
        "ProductID",
        "Quantity",
        "Status",
        "DelayReason",
        "ScheduledArrivalTime",
        "ActualArrivalTime",
        "EstimatedTimeOfArrival",
        "ScheduledDepartureTime",
        "ActualDepartureTime",
        "OriginLocation",
    ];

    fn now() -> NaiveDateTime {
        parse_datetime("2025-07-10 12:00:00").unwrap()
    }

    fn classify_with(config: &LogisticsConfig, cells: [&str; 12]) -> Vec<Finding> {
        let logistics = Logistics::new(config).unwrap();
        let mut ds = Dataset::with_columns(&HEADERS);
        ds.push_row(cells);
        let facts = logistics.facts(&ds.row(0).unwrap(), now()).unwrap();
        logistics.rules().classify(&facts)
    }

    fn classify(cells: [&str; 12]) -> Vec<Finding> {
        classify_with(&LogisticsConfig::default(), cells)
    }

    fn without_delayed_override() -> LogisticsConfig {
        let mut config = LogisticsConfig::default();
        config.critical_statuses.retain(|s| s != "delayed");
        config
    }

    #[test]
    fn damaged_is_single_critical_alert() {
        let findings = classify([
            "SH1", "O1", "P1", "600", "Damaged", "", "2025-07-01 10:00", "2025-07-05 10:00", "", "", "", "Pune",
        ]);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Critical);
        assert_eq!(
            findings[0].title,
            "CRITICAL LOGISTICS ALERT: Shipment SH1 Status: DAMAGED. High impact due to 600 units. \
             Reason: Not specified. Shipment: SH1, Order: O1, Product: P1 (600 units), From: Pune to: Unknown, Carrier: Unknown"
        );
        assert_eq!(findings[0].category, "Logistics/Supply Chain");
    }

    #[test]
    fn delayed_status_is_critical_by_default() {
        let findings = classify([
            "SH2", "O2", "P2", "10", "delayed", "Weather", "2025-07-09 12:00", "", "", "", "", "",
        ]);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].title.starts_with("CRITICAL LOGISTICS ALERT: Shipment SH2 Status: DELAYED. Reason: weather."));
    }

    #[test_case("2025-07-08 10:00", "10", Severity::Critical ; "two days late")]
    #[test_case("2025-07-09 10:00", "10", Severity::Medium ; "one day late")]
    #[test_case("2025-07-10 10:00", "10", Severity::Low ; "hours late")]
    #[test_case("2025-07-10 10:00", "150", Severity::Medium ; "medium quantity escalates low")]
    #[test_case("2025-07-09 10:00", "150", Severity::Medium ; "medium quantity leaves medium")]
    #[test_case("2025-07-09 10:00", "800", Severity::Critical ; "high quantity escalates medium")]
    fn delay_bands(scheduled: &str, quantity: &str, expected: Severity) {
        let findings = classify_with(
            &without_delayed_override(),
            ["SH3", "O3", "P3", quantity, "Delayed", "", scheduled, "", "", "", "", ""],
        );
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, expected);
    }

    #[test]
    fn delay_uses_estimate_and_departure() {
        let findings = classify_with(
            &without_delayed_override(),
            [
                "SH4",
                "O4",
                "P4",
                "5",
                "delayed",
                "port congestion",
                "2025-07-11 00:00",
                "",
                "2025-07-11 05:00",
                "2025-07-08 00:00",
                "2025-07-09 02:00",
                "",
            ],
        );
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Medium);
        assert!(findings[0]
            .title
            .starts_with("Medium Delay: Shipment SH4 delayed by ~26 hours. Reason: port congestion."));
    }

    #[test]
    fn delayed_but_not_late_yields_nothing() {
        let findings = classify_with(
            &without_delayed_override(),
            ["SH5", "", "", "", "delayed", "", "2025-07-12 00:00", "", "", "", "", ""],
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn early_delivery_is_info() {
        let findings = classify([
            "SH6", "", "", "", "Delivered", "", "2025-07-05 12:00", "2025-07-05 09:00", "", "", "", "",
        ]);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Info);
        assert!(findings[0].title.starts_with("Positive Logistics: Shipment SH6 arrived 3 hours early."));
    }

    #[test]
    fn on_time_and_late_deliveries() {
        let on_time = classify([
            "SH7", "", "", "", "delivered", "", "2025-07-05 12:00", "2025-07-05 12:00", "", "", "", "",
        ]);
        assert!(on_time[0].title.starts_with("Positive Logistics: Shipment SH7 arrived on time."));

        let late = classify([
            "SH8", "", "", "", "delivered", "", "2025-07-05 12:00", "2025-07-05 13:00", "", "", "", "",
        ]);
        assert!(late.is_empty());
    }
}
