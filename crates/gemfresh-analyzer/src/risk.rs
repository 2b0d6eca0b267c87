//! Aggregate risk scoring over a set of freshness results.

use serde::Serialize;

use crate::freshness::Freshness;

/// Ordinal staleness buckets over version distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskTier {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl RiskTier {
    /// Fixed breakpoints: [0,10) low, [10,16) moderate, [16,22) high,
    /// 22 and up very high.
    pub fn for_distance(distance: usize) -> Self {
        match distance {
            0..=9 => RiskTier::Low,
            10..=15 => RiskTier::Moderate,
            16..=21 => RiskTier::High,
            _ => RiskTier::VeryHigh,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskTier::Low => "low",
            RiskTier::Moderate => "moderate",
            RiskTier::High => "high",
            RiskTier::VeryHigh => "very_high",
        }
    }
}

/// Per-star ceilings on the cumulative moderate / high / very-high
/// percentages, checked from five stars down. Boundary values pass: a set
/// sitting exactly on a ceiling earns that star level.
const STAR_CEILINGS: [(u8, f64, f64, f64); 4] = [
    (5, 5.0, 2.0, 0.0),
    (4, 15.0, 8.0, 3.0),
    (3, 30.0, 15.0, 8.0),
    (2, 50.0, 30.0, 15.0),
];

/// Tier counts, cumulative percentages, and the derived star rating for one
/// analysis run. Percentages are over the scored (`Ok`) gems only; gems in a
/// terminal failure state are reported individually but carry no distance to
/// bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RiskSummary {
    /// Number of gems that produced a distance.
    pub rated: usize,
    pub low: usize,
    pub moderate: usize,
    pub high: usize,
    pub very_high: usize,
    /// Share of rated gems at moderate risk or worse.
    pub cumulative_moderate_pct: f64,
    /// Share of rated gems at high risk or worse.
    pub cumulative_high_pct: f64,
    /// Share of rated gems at very high risk.
    pub cumulative_very_high_pct: f64,
    /// 1 to 5; higher is fresher.
    pub stars: u8,
}

impl RiskSummary {
    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a Freshness>) -> Self {
        let mut summary = RiskSummary::default();

        for result in results {
            let Some(distance) = result.version_distance else {
                continue;
            };
            summary.rated += 1;
            match RiskTier::for_distance(distance) {
                RiskTier::Low => summary.low += 1,
                RiskTier::Moderate => summary.moderate += 1,
                RiskTier::High => summary.high += 1,
                RiskTier::VeryHigh => summary.very_high += 1,
            }
        }

        if summary.rated > 0 {
            let pct = |count: usize| count as f64 / summary.rated as f64 * 100.0;
            // Cumulative framing: each tier folds in everything worse than it,
            // so the rating step checks three monotonic percentages.
            summary.cumulative_moderate_pct =
                pct(summary.moderate + summary.high + summary.very_high);
            summary.cumulative_high_pct = pct(summary.high + summary.very_high);
            summary.cumulative_very_high_pct = pct(summary.very_high);
        }

        summary.stars = summary.star_rating();
        summary
    }

    fn star_rating(&self) -> u8 {
        for (stars, moderate, high, very_high) in STAR_CEILINGS {
            if self.cumulative_moderate_pct <= moderate
                && self.cumulative_high_pct <= high
                && self.cumulative_very_high_pct <= very_high
            {
                return stars;
            }
        }
        1
    }
}
