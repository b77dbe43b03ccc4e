//! Customer reviews, classified by keywords in the review title.
//!
//! A review raises at most one alert, at the most severe matching tier.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{Domain, DomainKind};
use crate::config::KeywordLists;
use crate::dataset::Row;
use crate::error::Result;
use crate::rules::{Facts, RuleBlock, RuleSet};

/// Review keyword tiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewsConfig {
    /// Title keywords per severity.
    pub keywords: KeywordLists,
}

impl Default for ReviewsConfig {
    fn default() -> Self {
        Self {
            keywords: KeywordLists::new(
                &[
                    "con artists",
                    "fake",
                    "scam",
                    "fraud",
                    "horrible",
                    "worst",
                    "disaster",
                    "never again",
                    "unacceptable",
                    "ripoff",
                    "stole",
                    "lied",
                    "deceptive",
                ],
                &[
                    "problem",
                    "issue",
                    "bug",
                    "delayed",
                    "missing",
                    "damaged",
                    "poor quality",
                    "unhappy",
                    "bad experience",
                    "defective",
                    "broken",
                    "difficult",
                    "struggle",
                    "misleading",
                    "disappointed",
                ],
                &[
                    "disappointing",
                    "not great",
                    "concern",
                    "slow",
                    "minor issue",
                    "frustrating",
                    "could be better",
                    "average",
                    "mild",
                ],
            ),
        }
    }
}

/// Review classifier.
#[derive(Debug, Clone)]
pub struct Reviews {
    rules: RuleSet,
}

impl Reviews {
    /// Builds the classifier.
    pub fn new(config: &ReviewsConfig) -> Result<Self> {
        let block = RuleBlock::keyword(
            "review_title",
            "review_title",
            config.keywords.tiers("{SEVERITY} Review: '{review_title}' - {context}"),
        )
        .overriding();
        Ok(Self {
            rules: RuleSet::new(DomainKind::Reviews.category(), vec![block])?,
        })
    }
}

impl Domain for Reviews {
    fn kind(&self) -> DomainKind {
        DomainKind::Reviews
    }

    fn rules(&self) -> &RuleSet {
        &self.rules
    }

    fn facts(&self, row: &Row<'_>, _now: NaiveDateTime) -> Option<Facts> {
        let context = format!(
            "Product: {}, Reviewer: {}, Source: {}",
            row.get_or("product_reviewed", "Unknown Product"),
            row.get_or("reviewer_name", "Anonymous"),
            row.get_or("source", "Unknown Source")
        );
        let mut facts = Facts::new();
        facts
            .set_text("review_title", Some(row.text("review_title")))
            .set_text("context", Some(context));
        Some(facts)
    }
}
