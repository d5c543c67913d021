// 🧮 Comparison summaries - what a percentile means for the caller
// Pure arithmetic on top of a computed percentile; no lookups here

use crate::household::QuintileBounds;
use serde::{Deserialize, Serialize};

/// Round to one decimal place
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// ============================================================================
// BUILDING BLOCKS
// ============================================================================

/// Income relative to a reference value (median or average)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceDelta {
    pub value: f64,
    pub difference: i64,
    pub percent_difference: f64,
}

impl ReferenceDelta {
    pub fn new(income: f64, reference: f64) -> Self {
        let difference = income - reference;
        let percent_difference = if reference == 0.0 {
            0.0
        } else {
            round1(difference / reference * 100.0)
        };

        ReferenceDelta {
            value: reference,
            difference: difference.round() as i64,
            percent_difference,
        }
    }
}

/// Whole-number split of the population around a percentile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    /// Percentile rounded to one decimal
    pub percentile: f64,
    pub below_you: u32,
    pub above_you: u32,
}

impl Standing {
    pub fn from_percentile(percentile: f64) -> Self {
        let below_you = percentile.floor().clamp(0.0, 100.0) as u32;
        Standing {
            percentile: round1(percentile),
            below_you,
            above_you: 100 - below_you,
        }
    }

    /// People (or households) estimated to earn less
    pub fn estimated_below(&self, population: u64) -> u64 {
        (self.below_you as f64 / 100.0 * population as f64).floor() as u64
    }
}

// ============================================================================
// SUMMARIES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeComparison {
    pub income: f64,
    pub geography: String,
    pub demographic: String,
    pub year: i32,
    #[serde(flatten)]
    pub standing: Standing,
    pub bracket: String,
    pub median: ReferenceDelta,
    pub average: ReferenceDelta,
    pub estimated_people_below_you: u64,
    pub total_recipients: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseholdComparison {
    pub income: f64,
    pub geography: String,
    pub year: i32,
    pub quintile: u8,
    pub quintile_label: String,
    pub quintile_bounds: QuintileBounds,
    #[serde(flatten)]
    pub standing: Standing,
    pub bracket: String,
    pub median: ReferenceDelta,
    pub average: ReferenceDelta,
    pub estimated_households_below_you: u64,
    pub total_households: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_delta() {
        let delta = ReferenceDelta::new(50000.0, 37358.0);
        assert_eq!(delta.value, 37358.0);
        assert_eq!(delta.difference, 12642);
        assert_eq!(delta.percent_difference, 33.8);

        let below = ReferenceDelta::new(20000.0, 40000.0);
        assert_eq!(below.difference, -20000);
        assert_eq!(below.percent_difference, -50.0);
    }

    #[test]
    fn test_zero_reference() {
        let delta = ReferenceDelta::new(1000.0, 0.0);
        assert_eq!(delta.percent_difference, 0.0);
        assert_eq!(delta.difference, 1000);
    }

    #[test]
    fn test_standing() {
        let standing = Standing::from_percentile(62.46);
        assert_eq!(standing.percentile, 62.5);
        assert_eq!(standing.below_you, 62);
        assert_eq!(standing.above_you, 38);
        assert_eq!(standing.estimated_below(27_000_000), 16_740_000);

        let top = Standing::from_percentile(99.9);
        assert_eq!(top.below_you, 99);
        assert_eq!(top.above_you, 1);

        let bottom = Standing::from_percentile(0.0);
        assert_eq!(bottom.below_you, 0);
        assert_eq!(bottom.estimated_below(1000), 0);
    }

    #[test]
    fn test_comparison_serializes_flat() {
        let comparison = IncomeComparison {
            income: 37358.0,
            geography: "Canada".to_string(),
            demographic: "All persons".to_string(),
            year: 2020,
            standing: Standing::from_percentile(50.0),
            bracket: "Above Median".to_string(),
            median: ReferenceDelta::new(37358.0, 37358.0),
            average: ReferenceDelta::new(37358.0, 53939.0),
            estimated_people_below_you: 13_500_000,
            total_recipients: 27_000_000,
        };

        let json = serde_json::to_value(&comparison).unwrap();
        assert_eq!(json["percentile"], 50.0);
        assert_eq!(json["belowYou"], 50);
        assert_eq!(json["median"]["percentDifference"], 0.0);
        assert_eq!(json["estimatedPeopleBelowYou"], 13_500_000);
    }
}
