//! The eight monitored domains.
//!
//! Each domain contributes two things: a [`RuleSet`] built from its section of
//! the [`PipelineConfig`], and a function that turns one raw dataset row into
//! [`Facts`]. Everything else (iteration, id assignment, log merging) is
//! shared by [`RuleEngine`](crate::engine::RuleEngine).

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::dataset::Row;
use crate::error::{AlertError, Result};
use crate::rules::{Facts, RuleSet};

pub mod ecommerce;
pub mod inventory;
pub mod local_news;
pub mod logistics;
pub mod reviews;
pub mod social_media;
pub mod supplier;
pub mod weather;

/// A domain classifier.
pub trait Domain: Send + Sync {
    /// Which domain this is.
    fn kind(&self) -> DomainKind;

    /// The domain's rule blocks.
    fn rules(&self) -> &RuleSet;

    /// Extracts facts from a row. `None` skips the row without alerts.
    fn facts(&self, row: &Row<'_>, now: NaiveDateTime) -> Option<Facts>;

    /// Whether skipped rows are removed from the output dataset.
    fn drops_skipped_rows(&self) -> bool {
        false
    }
}

/// Identifies a domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainKind {
    /// Weather readings per location.
    Weather,
    /// Stock snapshots per SKU and location.
    Inventory,
    /// Storefront funnel metrics.
    Ecommerce,
    /// Shipment tracking.
    Logistics,
    /// Supplier scorecards.
    Supplier,
    /// Customer reviews.
    Reviews,
    /// Social media trend metrics.
    SocialMedia,
    /// Local news and events.
    LocalNews,
}

impl DomainKind {
    /// All domains in run order.
    pub const ALL: [Self; 8] = [
        Self::Weather,
        Self::Inventory,
        Self::Ecommerce,
        Self::Logistics,
        Self::Supplier,
        Self::Reviews,
        Self::SocialMedia,
        Self::LocalNews,
    ];

    /// Short name used on the command line.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Weather => "weather",
            Self::Inventory => "inventory",
            Self::Ecommerce => "ecommerce",
            Self::Logistics => "logistics",
            Self::Supplier => "supplier",
            Self::Reviews => "reviews",
            Self::SocialMedia => "social_media",
            Self::LocalNews => "local_news",
        }
    }

    /// Stem of the input and output file names.
    #[must_use]
    pub const fn file_stem(&self) -> &'static str {
        match self {
            Self::SocialMedia => "social_media_trends",
            other => other.as_str(),
        }
    }

    /// Category stamped on the domain's alerts.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Weather => "Weather",
            Self::Inventory => "Inventory",
            Self::Ecommerce => "E-commerce",
            Self::Logistics => "Logistics/Supply Chain",
            Self::Supplier => "Supplier Performance",
            Self::Reviews => "Customer Reviews",
            Self::SocialMedia => "Social Media Trends",
            Self::LocalNews => "Local News/Events",
        }
    }

    /// Builds the domain classifier from configuration.
    pub fn build(self, config: &PipelineConfig) -> Result<Box<dyn Domain>> {
        Ok(match self {
            Self::Weather => Box::new(weather::Weather::new(&config.weather)?),
            Self::Inventory => Box::new(inventory::Inventory::new(&config.inventory)?),
            Self::Ecommerce => Box::new(ecommerce::Ecommerce::new(&config.ecommerce)?),
            Self::Logistics => Box::new(logistics::Logistics::new(&config.logistics)?),
            Self::Supplier => Box::new(supplier::Supplier::new(&config.supplier)?),
            Self::Reviews => Box::new(reviews::Reviews::new(&config.reviews)?),
            Self::SocialMedia => Box::new(social_media::SocialMedia::new(&config.social_media)?),
            Self::LocalNews => Box::new(local_news::LocalNews::new(&config.local_news)?),
        })
    }
}

impl fmt::Display for DomainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DomainKind {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "weather" => Ok(Self::Weather),
            "inventory" => Ok(Self::Inventory),
            "ecommerce" | "e_commerce" => Ok(Self::Ecommerce),
            "logistics" => Ok(Self::Logistics),
            "supplier" => Ok(Self::Supplier),
            "reviews" => Ok(Self::Reviews),
            "social_media" | "social_media_trends" => Ok(Self::SocialMedia),
            "local_news" => Ok(Self::LocalNews),
            _ => Err(AlertError::UnknownDomain {
                name: s.to_string(),
            }),
        }
    }
}

/// Records a text cell, substituting `fallback` when the cell is missing.
pub(crate) fn text_or(facts: &mut Facts, name: &'static str, row: &Row<'_>, column: &str, fallback: &str) {
    facts.set_text(name, Some(row.get_or(column, fallback)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("weather", DomainKind::Weather)]
    #[test_case("E-Commerce", DomainKind::Ecommerce)]
    #[test_case("social-media", DomainKind::SocialMedia)]
    #[test_case("social_media_trends", DomainKind::SocialMedia)]
    #[test_case(" local_news ", DomainKind::LocalNews)]
    fn parses_domain_names(raw: &str, expected: DomainKind) {
        assert_eq!(raw.parse::<DomainKind>().unwrap(), expected);
    }

    #[test]
    fn rejects_unknown_domain() {
        assert!(matches!(
            "finance".parse::<DomainKind>(),
            Err(AlertError::UnknownDomain { .. })
        ));
    }

    #[test]
    fn every_domain_builds_from_defaults() {
        let config = PipelineConfig::default();
        for kind in DomainKind::ALL {
            let domain = kind.build(&config).unwrap();
            assert_eq!(domain.kind(), kind);
            assert_eq!(domain.rules().category(), kind.category());
            assert!(!domain.rules().blocks().is_empty());
        }
    }

    #[test]
    fn only_weather_drops_skipped_rows() {
        let config = PipelineConfig::default();
        for kind in DomainKind::ALL {
            let domain = kind.build(&config).unwrap();
            assert_eq!(domain.drops_skipped_rows(), kind == DomainKind::Weather);
        }
    }

    #[test]
    fn file_stems() {
        assert_eq!(DomainKind::SocialMedia.file_stem(), "social_media_trends");
        assert_eq!(DomainKind::LocalNews.file_stem(), "local_news");
        assert_eq!(DomainKind::Ecommerce.to_string(), "ecommerce");
    }
}
