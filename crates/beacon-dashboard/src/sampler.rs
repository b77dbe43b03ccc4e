//! Per-category random sampling of alert records.

use std::collections::BTreeMap;

use beacon_alerts::AlertRecord;
use rand::Rng;
use rand::seq::SliceRandom;

/// Default number of alerts shown per category.
pub const DEFAULT_MAX_PER_CATEGORY: usize = 4;

/// Picks up to `max_per_category` records from every category, without
/// replacement, and shuffles the combined selection.
///
/// Categories with fewer records contribute all of them. The result order is
/// random; pass a seeded generator for reproducible output.
pub fn sample<R: Rng + ?Sized>(alerts: &[AlertRecord], max_per_category: usize, rng: &mut R) -> Vec<AlertRecord> {
    let mut by_category: BTreeMap<&str, Vec<&AlertRecord>> = BTreeMap::new();
    for alert in alerts {
        by_category.entry(alert.category.as_str()).or_default().push(alert);
    }

    let mut picked: Vec<AlertRecord> = by_category
        .values()
        .flat_map(|records| records.choose_multiple(rng, max_per_category))
        .map(|record| (*record).clone())
        .collect();
    picked.shuffle(rng);
    picked
}

/// [`sample`] with the thread-local generator.
#[must_use]
pub fn sample_random(alerts: &[AlertRecord], max_per_category: usize) -> Vec<AlertRecord> {
    sample(alerts, max_per_category, &mut rand::thread_rng())
}
