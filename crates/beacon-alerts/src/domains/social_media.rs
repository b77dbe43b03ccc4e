//! Social media trend metrics.
//!
//! Negative sentiment only alerts at the lowest band when the trend is also
//! spreading (enough mentions or virality); a quiet negative trend is
//! suppressed rather than reported at a milder band.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{Domain, DomainKind};
use crate::config::Tiers;
use crate::dataset::Row;
use crate::error::Result;
use crate::rules::{Band, BandSeverity, Facts, Predicate, RuleBlock, RuleSet};
use crate::types::{ComparisonOperator, Severity};

/// Critical and medium minimums of a reach signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reach {
    /// Minimum for the critical band.
    pub critical: f64,
    /// Minimum for the medium band.
    pub medium: f64,
}

/// Social media thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialMediaConfig {
    /// Sentiment scores below which a trend is negative.
    pub negative_sentiment: Tiers,
    /// Mentions needed to report strongly negative sentiment.
    pub negative_mentions: Reach,
    /// Virality needed to report strongly negative sentiment.
    pub negative_virality: Reach,
    /// Sentiment at or above which a trend is positive.
    pub positive_sentiment: f64,
    /// Virality minimums for positive trends.
    pub positive_virality: Tiers,
    /// Mention minimums for positive trends.
    pub positive_mentions: Tiers,
    /// Influencer engagement rates; lower is worse.
    pub engagement_rate: Tiers,
    /// Sentiment below which a mentioned campaign is underperforming.
    pub campaign_low_sentiment: f64,
    /// Sentiment at or above which a mentioned campaign is overperforming.
    pub campaign_high_sentiment: f64,
    /// Virality an overperforming campaign also needs.
    pub campaign_min_virality: f64,
}

impl Default for SocialMediaConfig {
    fn default() -> Self {
        Self {
            negative_sentiment: Tiers::new(0.2, 0.3, 0.4),
            negative_mentions: Reach {
                critical: 500.0,
                medium: 100.0,
            },
            negative_virality: Reach {
                critical: 0.5,
                medium: 0.2,
            },
            positive_sentiment: 0.6,
            positive_virality: Tiers::new(0.6, 0.3, 0.1),
            positive_mentions: Tiers::new(1000.0, 200.0, 50.0),
            engagement_rate: Tiers::new(0.01, 0.02, 0.03),
            campaign_low_sentiment: 0.5,
            campaign_high_sentiment: 0.8,
            campaign_min_virality: 0.3,
        }
    }
}

/// Social media classifier.
#[derive(Debug, Clone)]
pub struct SocialMedia {
    rules: RuleSet,
}

fn negative_sentiment(config: &SocialMediaConfig) -> RuleBlock {
    let s = config.negative_sentiment;
    let mentions = config.negative_mentions;
    let virality = config.negative_virality;
    let title = "{SEVERITY} Negative Sentiment: {context} (Score: {sentiment_score:.2}, Mentions: {mentions_count:int})";
    let spreading = |m: f64, v: f64| {
        Predicate::Any(vec![
            Predicate::ge("mentions_count", m),
            Predicate::ge("virality_score", v),
        ])
    };

    RuleBlock::composite(
        "negative_sentiment",
        vec![
            Band::new(
                Predicate::All(vec![
                    Predicate::lt("sentiment_score", s.critical),
                    spreading(mentions.critical, virality.critical),
                ]),
                BandSeverity::Fixed(Severity::Critical),
                title,
            ),
            Band::new(
                Predicate::All(vec![
                    Predicate::lt("sentiment_score", s.critical),
                    spreading(mentions.medium, virality.medium),
                ]),
                BandSeverity::Fixed(Severity::Medium),
                title,
            ),
            Band::new(Predicate::lt("sentiment_score", s.critical), BandSeverity::Suppress, title),
            Band::new(
                Predicate::All(vec![
                    Predicate::lt("sentiment_score", s.medium),
                    Predicate::ge("mentions_count", mentions.medium),
                ]),
                BandSeverity::Fixed(Severity::Medium),
                title,
            ),
            Band::new(Predicate::lt("sentiment_score", s.medium), BandSeverity::Suppress, title),
            Band::new(
                Predicate::lt("sentiment_score", s.low),
                BandSeverity::Fixed(Severity::Low),
                title,
            ),
        ],
    )
}

fn positive_virality(config: &SocialMediaConfig) -> RuleBlock {
    let v = config.positive_virality;
    let m = config.positive_mentions;
    let title = "{SEVERITY} Viral Trend: {context} (Virality: {virality_score:.2}, Mentions: {mentions_count:int})";
    let band = |virality: f64, mentions: f64, severity: Severity| {
        Band::new(
            Predicate::All(vec![
                Predicate::ge("virality_score", virality),
                Predicate::ge("mentions_count", mentions),
            ]),
            BandSeverity::Fixed(severity),
            title,
        )
    };
    RuleBlock::composite(
        "positive_virality",
        vec![
            band(v.critical, m.critical, Severity::Critical),
            band(v.medium, m.medium, Severity::Medium),
            band(v.low, m.low, Severity::Low),
        ],
    )
    .gated(Predicate::ge("sentiment_score", config.positive_sentiment))
}

fn campaign(config: &SocialMediaConfig) -> RuleBlock {
    RuleBlock::composite(
        "campaign",
        vec![
            Band::new(
                Predicate::lt("sentiment_score", config.campaign_low_sentiment),
                BandSeverity::Fixed(Severity::Medium),
                "MEDIUM Campaign Performance Alert: {campaign_mention} for {context} shows low sentiment ({sentiment_score:.2})",
            ),
            Band::new(
                Predicate::All(vec![
                    Predicate::ge("sentiment_score", config.campaign_high_sentiment),
                    Predicate::ge("virality_score", config.campaign_min_virality),
                ]),
                BandSeverity::Fixed(Severity::Low),
                "LOW Campaign Overperformance: {campaign_mention} for {context} showing strong positive trend \
                 (Sentiment: {sentiment_score:.2}, Virality: {virality_score:.2})",
            ),
        ],
    )
    .gated(Predicate::HasText("campaign_mention"))
}

impl SocialMedia {
    /// Builds the classifier.
    pub fn new(config: &SocialMediaConfig) -> Result<Self> {
        let blocks = vec![
            negative_sentiment(config),
            positive_virality(config),
            RuleBlock::threshold(
                "low_engagement",
                "engagement_rate",
                ComparisonOperator::LessThan,
                config.engagement_rate.cutoffs(
                    "{SEVERITY} Low Engagement: Influencer {influencer_id} for {context} (Rate: {value:pct})",
                ),
            )
            .gated(Predicate::HasText("influencer_id")),
            campaign(config),
        ];
        Ok(Self {
            rules: RuleSet::new(DomainKind::SocialMedia.category(), blocks)?,
        })
    }
}

impl Domain for SocialMedia {
    fn kind(&self) -> DomainKind {
        DomainKind::SocialMedia
    }

    fn rules(&self) -> &RuleSet {
        &self.rules
    }

    fn facts(&self, row: &Row<'_>, _now: NaiveDateTime) -> Option<Facts> {
        let context = format!(
            "SKU: {}, Keyword: '{}', Platform: {}",
            row.get_or("product_sku", "Unknown SKU"),
            row.get_or("keyword", "Unknown Keyword"),
            row.get_or("platform", "Unknown Platform")
        );
        let campaign = row
            .get("campaign_mention")
            .map(str::to_lowercase)
            .filter(|c| c != "none" && c != "nan");

        let mut facts = Facts::new();
        facts
            .set_text("context", Some(context))
            .set_text("influencer_id", row.get("influencer_id"))
            .set_text("campaign_mention", campaign)
            .set_number("sentiment_score", row.number("sentiment_score"))
            .set_number("mentions_count", row.number("mentions_count"))
            .set_number("virality_score", row.number("virality_score"))
            .set_number("engagement_rate", row.number("engagement_rate"));
        Some(facts)
    }
}
