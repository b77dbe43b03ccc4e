//! Storefront funnel metrics per SKU and region.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{Domain, DomainKind, text_or};
use crate::config::{Tiers, strings};
use crate::dataset::Row;
use crate::error::Result;
use crate::rules::{Band, BandSeverity, Facts, Predicate, RuleBlock, RuleSet};
use crate::types::{ComparisonOperator, Severity};

/// E-commerce thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EcommerceConfig {
    /// Conversion rate; lower is worse.
    pub conversion_rate: Tiers,
    /// Cart abandonment rate; higher is worse.
    pub cart_abandonment_rate: Tiers,
    /// Online views; lower is worse.
    pub online_views: Tiers,
    /// Add-to-cart count; lower is worse.
    pub add_to_cart: Tiers,
    /// Search terms that signal purchase intent.
    pub high_interest_terms: Vec<String>,
    /// Views above which an unpromoted high-intent product is flagged.
    pub high_interest_views: f64,
}

impl Default for EcommerceConfig {
    fn default() -> Self {
        Self {
            conversion_rate: Tiers::new(0.008, 0.012, 0.018),
            cart_abandonment_rate: Tiers::new(0.65, 0.60, 0.55),
            online_views: Tiers::new(300.0, 600.0, 900.0),
            add_to_cart: Tiers::new(15.0, 40.0, 80.0),
            high_interest_terms: strings(&["deal", "best", "discount"]),
            high_interest_views: 1000.0,
        }
    }
}

/// E-commerce classifier.
#[derive(Debug, Clone)]
pub struct Ecommerce {
    rules: RuleSet,
}

impl Ecommerce {
    /// Builds the classifier.
    pub fn new(config: &EcommerceConfig) -> Result<Self> {
        use ComparisonOperator::{GreaterThan, LessThan};

        let mut blocks = vec![
            RuleBlock::threshold(
                "conversion_rate",
                "conversion_rate",
                LessThan,
                config
                    .conversion_rate
                    .cutoffs("{severity} Conversion Rate for {location} ({value:pct})"),
            ),
            RuleBlock::threshold(
                "cart_abandonment",
                "cart_abandonment_rate",
                GreaterThan,
                config
                    .cart_abandonment_rate
                    .cutoffs("{severity} Cart Abandonment for {location} ({value:pct})"),
            ),
            RuleBlock::threshold(
                "online_views",
                "online_views",
                LessThan,
                config
                    .online_views
                    .cutoffs("{severity} Drop in Online Views for {location} ({value:int} views)"),
            ),
            RuleBlock::threshold(
                "add_to_cart",
                "add_to_cart",
                LessThan,
                config
                    .add_to_cart
                    .cutoffs("{severity} Drop in Add to Cart for {location} ({value:int} adds)"),
            ),
        ];

        if !config.high_interest_terms.is_empty() {
            blocks.push(RuleBlock::composite(
                "high_interest_no_promotion",
                vec![Band::new(
                    Predicate::All(vec![
                        Predicate::contains("search_term", &config.high_interest_terms),
                        Predicate::gt("online_views", config.high_interest_views),
                        Predicate::negate(Predicate::HasText("promotional_campaign_id")),
                    ]),
                    BandSeverity::Fixed(Severity::Low),
                    "High Interest ({search_term}) for {product_sku} in {region_id} but No Active Promotion",
                )],
            ));
        }

        Ok(Self {
            rules: RuleSet::new(DomainKind::Ecommerce.category(), blocks)?,
        })
    }
}

impl Domain for Ecommerce {
    fn kind(&self) -> DomainKind {
        DomainKind::Ecommerce
    }

    fn rules(&self) -> &RuleSet {
        &self.rules
    }

    fn facts(&self, row: &Row<'_>, _now: NaiveDateTime) -> Option<Facts> {
        let sku = row.get_or("product_sku", "Unknown SKU");
        let region = row.get_or("region_id", "Unknown Region");

        let mut facts = Facts::new();
        facts
            .set_text("location", Some(format!("SKU: {sku}, Region: {region}")))
            .set_text("search_term", Some(row.text("search_term")))
            .set_text("promotional_campaign_id", row.get("promotional_campaign_id"))
            .set_number("conversion_rate", row.number("conversion_rate"))
            .set_number("cart_abandonment_rate", row.number("cart_abandonment_rate"))
            .set_number("online_views", row.number("online_views"))
            .set_number("add_to_cart", row.number("add_to_cart"));
        text_or(&mut facts, "product_sku", row, "product_sku", "Unknown SKU");
        text_or(&mut facts, "region_id", row, "region_id", "Unknown Region");
        Some(facts)
    }
}
