//! Local news and events, evaluated only while the event is active.
//!
//! Every active row carries a baseline severity derived from its
//! `impact_level`; weather and road blocks raise it when keywords or the
//! affected population call for more.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{Domain, DomainKind};
use crate::config::strings;
use crate::dataset::Row;
use crate::datetime::parse_datetime;
use crate::error::Result;
use crate::rules::{Band, BandSeverity, Facts, Predicate, RuleBlock, RuleSet, title_case};
use crate::types::Severity;

/// Local news thresholds and keyword lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalNewsConfig {
    /// Affected population that makes a weather event critical.
    pub population_critical: f64,
    /// Affected population that makes an event at least medium.
    pub population_medium: f64,
    /// Weather descriptions that are always critical.
    pub weather_critical_keywords: Vec<String>,
    /// Weather descriptions that are at least medium.
    pub weather_medium_keywords: Vec<String>,
    /// Road disruptions that are always critical.
    pub road_critical_keywords: Vec<String>,
    /// Road disruptions that are at least medium.
    pub road_medium_keywords: Vec<String>,
    /// Extra phrases raising a road event to medium without making it a road event.
    pub road_medium_phrases: Vec<String>,
    /// Descriptions that raise a single critical alert for the row.
    pub public_safety_keywords: Vec<String>,
}

impl Default for LocalNewsConfig {
    fn default() -> Self {
        Self {
            population_critical: 5_000_000.0,
            population_medium: 500_000.0,
            weather_critical_keywords: strings(&[
                "cyclone",
                "tornado",
                "hurricane",
                "blizzard",
                "flood",
                "severe thunderstorm",
                "landslide",
            ]),
            weather_medium_keywords: strings(&[
                "heavy rain",
                "snow storm",
                "flash flood",
                "heatwave",
                "dense fog",
                "thunderstorm",
            ]),
            road_critical_keywords: strings(&[
                "major highway closure",
                "airport closure",
                "port strike",
                "trucking strike",
                "bridge collapse",
                "total closure",
            ]),
            road_medium_keywords: strings(&[
                "street closure",
                "traffic disruption",
                "construction delay",
                "partial closure",
            ]),
            road_medium_phrases: strings(&["route affected", "significant delay"]),
            public_safety_keywords: strings(&[
                "evacuation",
                "lockdown",
                "riot",
                "protest",
                "bomb threat",
                "natural disaster",
                "emergency",
            ]),
        }
    }
}

/// Local news classifier.
#[derive(Debug, Clone)]
pub struct LocalNews {
    rules: RuleSet,
}

fn public_safety(config: &LocalNewsConfig) -> RuleBlock {
    RuleBlock::composite(
        "public_safety",
        vec![Band::new(
            Predicate::contains("description", &config.public_safety_keywords),
            BandSeverity::Fixed(Severity::Critical),
            "Critical Public Safety Event: {event} ({description})",
        )],
    )
    .overriding()
}

fn weather(config: &LocalNewsConfig) -> RuleBlock {
    let title = "{severity} Weather Alert: {event} ({description})";
    RuleBlock::composite(
        "weather_alert",
        vec![
            Band::new(
                Predicate::Any(vec![
                    Predicate::contains("description", &config.weather_critical_keywords),
                    Predicate::ge("population", config.population_critical),
                ]),
                BandSeverity::Fixed(Severity::Critical),
                title,
            ),
            Band::new(
                Predicate::Any(vec![
                    Predicate::contains("description", &config.weather_medium_keywords),
                    Predicate::ge("population", config.population_medium),
                ]),
                BandSeverity::AtLeast(Severity::Medium),
                title,
            ),
            Band::new(Predicate::Always, BandSeverity::Baseline, title),
        ],
    )
    .gated(Predicate::contains("event_type", &["weather alert"]))
}

fn road(config: &LocalNewsConfig) -> RuleBlock {
    let title = "{severity} Logistics Disruption: {event} (Route: {route}, Desc: {description})";
    let road_keywords: Vec<&String> = config
        .road_critical_keywords
        .iter()
        .chain(&config.road_medium_keywords)
        .collect();
    let medium_terms: Vec<&String> = config
        .road_medium_keywords
        .iter()
        .chain(&config.road_medium_phrases)
        .collect();

    RuleBlock::composite(
        "road_disruption",
        vec![
            Band::new(
                Predicate::Any(vec![
                    Predicate::contains("description", &config.road_critical_keywords),
                    Predicate::contains("impact_level", &["critical"]),
                ]),
                BandSeverity::Fixed(Severity::Critical),
                title,
            ),
            Band::new(
                Predicate::contains("description", &medium_terms),
                BandSeverity::AtLeast(Severity::Medium),
                title,
            ),
            Band::new(Predicate::Always, BandSeverity::Baseline, title),
        ],
    )
    .gated(Predicate::Any(vec![
        Predicate::contains("event_type", &["road closure"]),
        Predicate::contains("description", &road_keywords),
    ]))
}

fn festival(config: &LocalNewsConfig) -> RuleBlock {
    let title = "{severity} Local Event: {event} (Pop: {population:int})";
    RuleBlock::composite(
        "local_event",
        vec![
            Band::new(
                Predicate::ge("population", config.population_medium),
                BandSeverity::Fixed(Severity::Medium),
                title,
            ),
            Band::new(Predicate::Always, BandSeverity::Fixed(Severity::Low), title),
        ],
    )
    .gated(Predicate::contains("event_type", &["local festival", "community fair"]))
}

fn baseline(impact_level: &str) -> Severity {
    match impact_level {
        "critical" => Severity::Critical,
        "high" => Severity::Medium,
        _ => Severity::Low,
    }
}

fn is_active(row: &Row<'_>, now: NaiveDateTime) -> bool {
    let start = row.get("event_start_date").and_then(parse_datetime);
    let end = row.get("event_end_date").and_then(parse_datetime);
    matches!((start, end), (Some(start), Some(end)) if start <= now && now <= end)
}

impl LocalNews {
    /// Builds the classifier.
    pub fn new(config: &LocalNewsConfig) -> Result<Self> {
        let blocks = vec![public_safety(config), weather(config), road(config), festival(config)];
        Ok(Self {
            rules: RuleSet::new(DomainKind::LocalNews.category(), blocks)?,
        })
    }
}

impl Domain for LocalNews {
    fn kind(&self) -> DomainKind {
        DomainKind::LocalNews
    }

    fn rules(&self) -> &RuleSet {
        &self.rules
    }

    fn facts(&self, row: &Row<'_>, now: NaiveDateTime) -> Option<Facts> {
        if !is_active(row, now) {
            return None;
        }

        let event_type = row.text("event_type");
        let impact_level = row.text("impact_level");
        let event = format!(
            "{} in {}",
            title_case(&event_type),
            row.get_or("region_id", "Unknown Region")
        );
        let route = row
            .get("route_affected")
            .map(str::to_lowercase)
            .filter(|r| r != "none");

        let mut facts = Facts::new();
        facts
            .set_baseline(baseline(&impact_level))
            .set_text("event", Some(event))
            .set_text("event_type", Some(event_type))
            .set_text("impact_level", Some(impact_level))
            .set_text("description", Some(row.text("description")))
            .set_text("route", route)
            .set_number("population", row.number("affected_population_estimate"));
        Some(facts)
    }
}
