//! Weather readings.
//!
//! Rows whose fetch status is not `Success` carry no usable reading and are
//! removed from the output dataset.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{Domain, DomainKind};
use crate::config::KeywordLists;
use crate::dataset::Row;
use crate::error::Result;
use crate::rules::{Cutoff, Facts, KeywordTier, RuleBlock, RuleSet};
use crate::types::{ComparisonOperator, Severity};

/// Critical and low cutoffs of a weather signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherLevels {
    /// Critical cutoff (inclusive).
    pub critical: f64,
    /// Low cutoff (inclusive).
    pub low: f64,
}

/// Weather thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Temperature in degrees Celsius.
    pub temperature_c: WeatherLevels,
    /// Relative humidity in percent.
    pub humidity_percent: WeatherLevels,
    /// Wind speed in metres per second.
    pub wind_speed_mps: WeatherLevels,
    /// Description keywords for critical storms.
    pub storm_critical_keywords: Vec<String>,
    /// Description keywords for ordinary rain.
    pub storm_low_keywords: Vec<String>,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        let storms = KeywordLists::new(
            &[
                "cyclone",
                "heavy storm",
                "torrential rain",
                "flood",
                "severe thunderstorm",
                "hurricane",
                "typhoon",
            ],
            &[],
            &["rain", "storm", "thunderstorm", "drizzle", "shower", "monsoon"],
        );
        Self {
            temperature_c: WeatherLevels {
                critical: 40.0,
                low: 35.0,
            },
            humidity_percent: WeatherLevels {
                critical: 90.0,
                low: 80.0,
            },
            wind_speed_mps: WeatherLevels {
                critical: 20.0,
                low: 12.0,
            },
            storm_critical_keywords: storms.critical,
            storm_low_keywords: storms.low,
        }
    }
}

/// Weather classifier.
#[derive(Debug, Clone)]
pub struct Weather {
    rules: RuleSet,
}

fn levels(signal: &'static str, name: &'static str, levels: WeatherLevels, titles: [&str; 2]) -> RuleBlock {
    RuleBlock::threshold(
        name,
        signal,
        ComparisonOperator::GreaterThanOrEqual,
        vec![
            Cutoff::new(levels.critical, Severity::Critical, titles[0]),
            Cutoff::new(levels.low, Severity::Low, titles[1]),
        ],
    )
}

impl Weather {
    /// Builds the classifier.
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let mut storm_tiers = Vec::new();
        if !config.storm_critical_keywords.is_empty() {
            storm_tiers.push(KeywordTier::new(
                Severity::Critical,
                &config.storm_critical_keywords,
                "Critical Storm/Rainfall in {location} ({description})",
            ));
        }
        if !config.storm_low_keywords.is_empty() {
            storm_tiers.push(KeywordTier::new(
                Severity::Low,
                &config.storm_low_keywords,
                "Heavy Rain/Storm in {location} ({description})",
            ));
        }

        let mut blocks = vec![
            levels(
                "temperature_c",
                "temperature",
                config.temperature_c,
                ["Critical Heatwave in {location} ({value}°C)", "Extreme Heat in {location} ({value}°C)"],
            ),
            levels(
                "humidity_percent",
                "humidity",
                config.humidity_percent,
                ["Critical Humidity in {location} ({value}%)", "High Humidity in {location} ({value}%)"],
            ),
            levels(
                "wind_speed_mps",
                "wind",
                config.wind_speed_mps,
                ["Critical Wind Warning in {location} ({value} MPS)", "High Wind Advisory in {location} ({value} MPS)"],
            ),
        ];
        if !storm_tiers.is_empty() {
            blocks.push(RuleBlock::keyword("storm", "description", storm_tiers));
        }

        Ok(Self {
            rules: RuleSet::new(DomainKind::Weather.category(), blocks)?,
        })
    }
}

impl Domain for Weather {
    fn kind(&self) -> DomainKind {
        DomainKind::Weather
    }

    fn rules(&self) -> &RuleSet {
        &self.rules
    }

    fn facts(&self, row: &Row<'_>, _now: NaiveDateTime) -> Option<Facts> {
        if row.get("Weather_Fetch_Status")? != "Success" {
            return None;
        }

        let mut facts = Facts::new();
        let location = row
            .get("City & State")
            .or_else(|| row.get("Full Address"))
            .unwrap_or("Unknown Location");
        facts
            .set_text("location", Some(location))
            .set_text("description", Some(row.text("Weather_Description")))
            .set_number("temperature_c", row.number("Temperature_C"))
            .set_number("humidity_percent", row.number("Humidity_Percent"))
            .set_number("wind_speed_mps", row.number("Wind_Speed_MPS"));
        Some(facts)
    }

    fn drops_skipped_rows(&self) -> bool {
        true
    }
}
