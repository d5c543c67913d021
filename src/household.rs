// 🏠 Household Income - quintile placement and percentile rank
//
// Two ways of deriving quintile boundaries exist in the source data:
// - Midpoint: only per-quintile averages are known; boundaries sit halfway between them
// - ExplicitBounds: each quintile carries its own min/max
// They give different ranks for the same income, so the policy is always chosen
// explicitly through `QuintilePolicy` and never mixed.

use crate::error::{check_income, RankError, Result};
use crate::interpolation::MAX_PERCENTILE;
use serde::{Deserialize, Serialize};

// ============================================================================
// POLICY
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuintilePolicy {
    /// Boundaries are midpoints between consecutive quintile averages
    #[default]
    Midpoint,

    /// Boundaries are the `min`/`max` given for each quintile
    ExplicitBounds,
}

impl QuintilePolicy {
    pub fn name(&self) -> &'static str {
        match self {
            QuintilePolicy::Midpoint => "midpoint",
            QuintilePolicy::ExplicitBounds => "explicit-bounds",
        }
    }
}

// ============================================================================
// RECORD
// ============================================================================

/// One fifth of households. Either `average` or `min`/`max` is present,
/// depending on how the source published it; both may be.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quintile {
    pub label: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    /// For the fifth quintile this is an extrapolation anchor, not a ceiling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseholdRecord {
    #[serde(rename = "geography")]
    pub geography_label: String,
    pub year: i32,
    pub median: f64,
    pub average: f64,
    pub total_households: u64,
    pub quintiles: [Quintile; 5],
}

/// Income range of a quintile; `upper` is `None` for the open-ended top quintile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuintileBounds {
    pub lower: f64,
    pub upper: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuintilePlacement {
    /// 1..=5
    pub quintile: u8,
    pub label: String,
    pub bounds: QuintileBounds,
}

impl HouseholdRecord {
    /// Check the record carries what `policy` needs, in a sane order
    pub fn validate(&self, policy: QuintilePolicy) -> Result<()> {
        for (name, value) in [("median", self.median), ("average", self.average)] {
            if !value.is_finite() || value < 0.0 {
                return Err(RankError::invalid(format!(
                    "household {} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        match policy {
            QuintilePolicy::Midpoint => {
                let averages = self.averages()?;
                // Strictly increasing, so every midpoint span is non-empty
                for (i, pair) in averages.windows(2).enumerate() {
                    if pair[1] <= pair[0] {
                        return Err(RankError::invariant(format!(
                            "quintile {} average ({}) is not above quintile {} average ({})",
                            i + 2,
                            pair[1],
                            i + 1,
                            pair[0]
                        )));
                    }
                }
            }
            QuintilePolicy::ExplicitBounds => {
                let bounds = self.explicit_bounds()?;
                for (i, (min, max)) in bounds.iter().enumerate() {
                    if max < min {
                        return Err(RankError::invariant(format!(
                            "quintile {} max ({}) is below its min ({})",
                            i + 1,
                            max,
                            min
                        )));
                    }
                }
                for (i, pair) in bounds.windows(2).enumerate() {
                    if pair[1].0 < pair[0].1 {
                        return Err(RankError::invariant(format!(
                            "quintile {} overlaps quintile {}",
                            i + 2,
                            i + 1
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    /// Which quintile `income` falls in, with the quintile's bounds
    pub fn quintile_of(&self, income: f64, policy: QuintilePolicy) -> Result<QuintilePlacement> {
        check_income(income)?;
        self.validate(policy)?;

        let (index, bounds) = match policy {
            QuintilePolicy::Midpoint => {
                let midpoints = midpoints(&self.averages()?);
                let index = midpoints
                    .iter()
                    .position(|midpoint| income < *midpoint)
                    .unwrap_or(4);
                let lower = if index == 0 { 0.0 } else { midpoints[index - 1] };
                let upper = midpoints.get(index).copied();
                (index, QuintileBounds { lower, upper })
            }
            QuintilePolicy::ExplicitBounds => {
                let bounds = self.explicit_bounds()?;
                let index = explicit_index(&bounds, income);
                let (min, max) = bounds[index];
                let upper = if index == 4 { None } else { Some(max) };
                (index, QuintileBounds { lower: min, upper })
            }
        };

        Ok(QuintilePlacement {
            quintile: index as u8 + 1,
            label: self.quintiles[index].label.clone(),
            bounds,
        })
    }

    /// Continuous percentile rank of `income`, in `[0, 99.9]`
    pub fn percentile_of(&self, income: f64, policy: QuintilePolicy) -> Result<f64> {
        check_income(income)?;
        self.validate(policy)?;

        let percentile = match policy {
            QuintilePolicy::Midpoint => self.midpoint_percentile(income)?,
            QuintilePolicy::ExplicitBounds => self.explicit_percentile(income)?,
        };

        Ok(percentile.clamp(0.0, MAX_PERCENTILE))
    }

    fn midpoint_percentile(&self, income: f64) -> Result<f64> {
        let averages = self.averages()?;
        let midpoints = midpoints(&averages);
        let index = midpoints
            .iter()
            .position(|midpoint| income < *midpoint)
            .unwrap_or(4);

        // Averages are strictly increasing here, so every divisor below is positive
        let percentile = match index {
            0 => (income / midpoints[0] * 20.0).min(20.0),
            4 => {
                let top_average = averages[4];
                let lower = midpoints[3];
                if income > top_average {
                    // Past the top average every 10% adds one rank, up to 99.9
                    90.0 + ((income / top_average - 1.0) * 10.0).min(9.9)
                } else {
                    80.0 + (income - lower) / (top_average - lower) * 10.0
                }
            }
            _ => {
                let (lower, upper) = (midpoints[index - 1], midpoints[index]);
                index as f64 * 20.0 + (income - lower) / (upper - lower) * 20.0
            }
        };

        Ok(percentile)
    }

    fn explicit_percentile(&self, income: f64) -> Result<f64> {
        let bounds = self.explicit_bounds()?;
        let index = explicit_index(&bounds, income);
        let (min, max) = bounds[index];

        let position = if max == min {
            self.log_degenerate(income, index + 1);
            0.5
        } else {
            let raw = (income - min) / (max - min);
            if index == 4 {
                raw.max(0.0)
            } else {
                raw.clamp(0.0, 1.0)
            }
        };

        Ok(index as f64 * 20.0 + 20.0 * position)
    }

    fn averages(&self) -> Result<[f64; 5]> {
        let mut averages = [0.0; 5];
        for (slot, quintile) in averages.iter_mut().zip(self.quintiles.iter()) {
            *slot = match quintile.average {
                Some(average) if average.is_finite() && average >= 0.0 => average,
                Some(average) => {
                    return Err(RankError::invalid(format!(
                        "quintile '{}' has an invalid average: {}",
                        quintile.label, average
                    )))
                }
                None => {
                    return Err(RankError::invalid(format!(
                        "quintile '{}' has no average (required by the {} policy)",
                        quintile.label,
                        QuintilePolicy::Midpoint.name()
                    )))
                }
            };
        }
        Ok(averages)
    }

    fn explicit_bounds(&self) -> Result<[(f64, f64); 5]> {
        let mut bounds = [(0.0, 0.0); 5];
        for (slot, quintile) in bounds.iter_mut().zip(self.quintiles.iter()) {
            *slot = match (quintile.min, quintile.max) {
                (Some(min), Some(max)) if min.is_finite() && max.is_finite() && min >= 0.0 => {
                    (min, max)
                }
                (Some(_), Some(_)) => {
                    return Err(RankError::invalid(format!(
                        "quintile '{}' has invalid bounds",
                        quintile.label
                    )))
                }
                _ => {
                    return Err(RankError::invalid(format!(
                        "quintile '{}' has no min/max (required by the {} policy)",
                        quintile.label,
                        QuintilePolicy::ExplicitBounds.name()
                    )))
                }
            };
        }
        Ok(bounds)
    }

    fn log_degenerate(&self, income: f64, quintile: usize) {
        tracing::warn!(
            geography = %self.geography_label,
            quintile,
            income,
            "quintile has a zero-width span, placing income at its centre"
        );
    }
}

/// Boundaries halfway between consecutive averages
fn midpoints(averages: &[f64; 5]) -> [f64; 4] {
    [
        (averages[0] + averages[1]) / 2.0,
        (averages[1] + averages[2]) / 2.0,
        (averages[2] + averages[3]) / 2.0,
        (averages[3] + averages[4]) / 2.0,
    ]
}

/// First quintile whose max exceeds `income`; the fifth takes any overflow
fn explicit_index(bounds: &[(f64, f64); 5], income: f64) -> usize {
    bounds[..4]
        .iter()
        .position(|(_, max)| income < *max)
        .unwrap_or(4)
}

// ============================================================================
// BRACKETS
// ============================================================================

/// Human label for a quintile number
pub fn household_bracket_of(quintile: u8) -> Result<&'static str> {
    match quintile {
        1 => Ok("First Quintile (Q1) - Bottom 20%"),
        2 => Ok("Second Quintile (Q2) - Lower-Middle 20%"),
        3 => Ok("Third Quintile (Q3) - Middle 20%"),
        4 => Ok("Fourth Quintile (Q4) - Upper-Middle 20%"),
        5 => Ok("Fifth Quintile (Q5) - Top 20%"),
        other => Err(RankError::UnknownQuintile(other)),
    }
}

// ============================================================================
// TESTS
// ============================================================================
