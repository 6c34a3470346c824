//! Panel-level statistics over a loaded catalog.

use std::collections::BTreeMap;

use crowdtest_core::profile::CustomerProfile;
use serde::{Deserialize, Serialize};

/// Aggregate view of a profile catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PanelStats {
    pub total_profiles: usize,
    /// Mean age across the panel, one decimal.
    pub average_age: f64,
    /// Profiles per segment label; a profile with several labels counts once
    /// per label.
    pub segments: BTreeMap<String, usize>,
    pub loyalty_tiers: BTreeMap<String, usize>,
}

/// Compute catalog statistics. Deterministic for a fixed panel.
pub fn panel_stats(profiles: &[CustomerProfile]) -> PanelStats {
    let total_profiles = profiles.len();
    let average_age = if total_profiles == 0 {
        0.0
    } else {
        let sum: u64 = profiles.iter().map(|p| u64::from(p.age)).sum();
        (sum as f64 * 10.0 / total_profiles as f64).round() / 10.0
    };

    let mut segments: BTreeMap<String, usize> = BTreeMap::new();
    let mut loyalty_tiers: BTreeMap<String, usize> = BTreeMap::new();
    for profile in profiles {
        for segment in &profile.segments {
            *segments.entry(segment.clone()).or_insert(0) += 1;
        }
        if !profile.loyalty_tier.is_empty() {
            *loyalty_tiers.entry(profile.loyalty_tier.clone()).or_insert(0) += 1;
        }
    }

    PanelStats {
        total_profiles,
        average_age,
        segments,
        loyalty_tiers,
    }
}
