// 📈 Individual-Income Interpolation
// Piecewise-linear percentile rank over the stored markers

use crate::config::EngineConfig;
use crate::distribution::DistributionRecord;
use crate::error::{check_income, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Highest rank ever reported; 100 is never reached
pub const MAX_PERCENTILE: f64 = 99.9;

/// Returned when no anchor pair brackets the income
pub const FALLBACK_PERCENTILE: f64 = 50.0;

// ============================================================================
// BRACKETS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncomeBracket {
    #[serde(rename = "Top 1%")]
    Top1,
    #[serde(rename = "Top 5%")]
    Top5,
    #[serde(rename = "Top 10%")]
    Top10,
    #[serde(rename = "Top 25%")]
    Top25,
    #[serde(rename = "Above Median")]
    AboveMedian,
    #[serde(rename = "Below Median")]
    BelowMedian,
    #[serde(rename = "Bottom 25%")]
    Bottom25,
}

impl IncomeBracket {
    pub fn label(&self) -> &'static str {
        match self {
            IncomeBracket::Top1 => "Top 1%",
            IncomeBracket::Top5 => "Top 5%",
            IncomeBracket::Top10 => "Top 10%",
            IncomeBracket::Top25 => "Top 25%",
            IncomeBracket::AboveMedian => "Above Median",
            IncomeBracket::BelowMedian => "Below Median",
            IncomeBracket::Bottom25 => "Bottom 25%",
        }
    }
}

impl fmt::Display for IncomeBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Inclusive lower bounds, highest first
const BRACKET_THRESHOLDS: [(f64, IncomeBracket); 6] = [
    (99.0, IncomeBracket::Top1),
    (95.0, IncomeBracket::Top5),
    (90.0, IncomeBracket::Top10),
    (75.0, IncomeBracket::Top25),
    (50.0, IncomeBracket::AboveMedian),
    (25.0, IncomeBracket::BelowMedian),
];

/// Classify a percentile rank
pub fn bracket_of(percentile: f64) -> IncomeBracket {
    BRACKET_THRESHOLDS
        .iter()
        .find(|(threshold, _)| percentile >= *threshold)
        .map(|(_, bracket)| *bracket)
        .unwrap_or(IncomeBracket::Bottom25)
}

// ============================================================================
// ENGINE
// ============================================================================

/// One point of the rank/income curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub rank: f64,
    pub income: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterpolationEngine {
    upper_bound: f64,
}

impl InterpolationEngine {
    pub fn new(upper_bound: f64) -> Result<Self> {
        Self::from_config(&EngineConfig {
            upper_bound,
            ..EngineConfig::default()
        })
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(InterpolationEngine {
            upper_bound: config.upper_bound,
        })
    }

    pub fn upper_bound(&self) -> f64 {
        self.upper_bound
    }

    /// `(0, 0)`, the seven markers, then `(100, upper_bound)`
    pub fn anchors(&self, record: &DistributionRecord) -> [Anchor; 9] {
        let mut anchors = [Anchor { rank: 0.0, income: 0.0 }; 9];
        for (slot, (rank, income)) in anchors[1..8].iter_mut().zip(record.markers.pairs()) {
            *slot = Anchor { rank, income };
        }
        anchors[8] = Anchor {
            rank: 100.0,
            income: self.upper_bound,
        };
        anchors
    }

    /// Percentile rank of `income` within `record`, in `[0, 99.9]`
    pub fn percentile_of(&self, income: f64, record: &DistributionRecord) -> Result<f64> {
        check_income(income)?;
        record.markers.check_monotonic()?;

        let markers = &record.markers;

        // Straight line from the origin through p10
        if income <= markers.p10 {
            if markers.p10 <= 0.0 {
                return Ok(0.0);
            }
            return Ok((income / markers.p10 * 10.0).max(0.0));
        }

        // One rank per p99-sized step above p99
        if income >= markers.p99 {
            if markers.p99 <= 0.0 {
                return Ok(MAX_PERCENTILE);
            }
            return Ok((99.0 + (income - markers.p99) / markers.p99).min(MAX_PERCENTILE));
        }

        match interpolate(income, &self.anchors(record)) {
            Some(percentile) => Ok(percentile.clamp(0.0, MAX_PERCENTILE)),
            None => {
                tracing::warn!(
                    geography = %record.geography_code,
                    demographic = %record.demographic_code,
                    income,
                    "no marker pair brackets income, falling back to median rank"
                );
                Ok(FALLBACK_PERCENTILE)
            }
        }
    }
}

impl Default for InterpolationEngine {
    fn default() -> Self {
        InterpolationEngine {
            upper_bound: EngineConfig::default().upper_bound,
        }
    }
}

/// Linear interpolation between the first consecutive pair bracketing `income`.
/// The origin anchor is skipped; incomes below p10 never get here.
fn interpolate(income: f64, anchors: &[Anchor]) -> Option<f64> {
    for pair in anchors[1..].windows(2) {
        let (low, high) = (pair[0], pair[1]);

        if income >= low.income && income <= high.income {
            if high.income == low.income {
                return Some(low.rank);
            }
            let ratio = (income - low.income) / (high.income - low.income);
            return Some(low.rank + ratio * (high.rank - low.rank));
        }
    }

    None
}

// ============================================================================
// TESTS
// ============================================================================
