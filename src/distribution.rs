// 📊 Distribution Records - sparse percentile tables
// One record per (geography, demographic) pair, immutable after load

use crate::error::{RankError, Result};
use serde::{Deserialize, Serialize};

/// Demographic code meaning "whole population"
pub const ALL_DEMOGRAPHIC: &str = "all";

fn default_demographic() -> String {
    ALL_DEMOGRAPHIC.to_string()
}

// ============================================================================
// PERCENTILE MARKERS
// ============================================================================

/// Income values at the fixed ranks 10, 25, 50, 75, 90, 95, 99.
///
/// Incomes must be non-negative and non-decreasing as the rank increases.
/// Extra keys in the source data (`p96`, `p97`, ...) are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentileMarkers {
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
}

impl PercentileMarkers {
    /// Ranks carried by every record, ascending
    pub const RANKS: [f64; 7] = [10.0, 25.0, 50.0, 75.0, 90.0, 95.0, 99.0];

    /// (rank, income) pairs in ascending rank order
    pub fn pairs(&self) -> [(f64, f64); 7] {
        [
            (10.0, self.p10),
            (25.0, self.p25),
            (50.0, self.p50),
            (75.0, self.p75),
            (90.0, self.p90),
            (95.0, self.p95),
            (99.0, self.p99),
        ]
    }

    /// Income stored at an exact rank, if that rank is one of the markers
    pub fn at_rank(&self, rank: u8) -> Option<f64> {
        match rank {
            10 => Some(self.p10),
            25 => Some(self.p25),
            50 => Some(self.p50),
            75 => Some(self.p75),
            90 => Some(self.p90),
            95 => Some(self.p95),
            99 => Some(self.p99),
            _ => None,
        }
    }

    /// Check the non-negative + non-decreasing invariant
    pub fn check_monotonic(&self) -> Result<()> {
        let pairs = self.pairs();

        for (rank, income) in pairs.iter() {
            if !income.is_finite() || *income < 0.0 {
                return Err(RankError::invariant(format!(
                    "marker p{} must be a non-negative number, got {}",
                    rank, income
                )));
            }
        }

        for window in pairs.windows(2) {
            let (low_rank, low) = window[0];
            let (high_rank, high) = window[1];
            if high < low {
                return Err(RankError::invariant(format!(
                    "marker p{} ({}) is below p{} ({})",
                    high_rank, high, low_rank, low
                )));
            }
        }

        Ok(())
    }
}

// ============================================================================
// DISTRIBUTION RECORD
// ============================================================================

/// Individual employment-income distribution for one geography/demographic slice.
///
/// Field names on the wire follow the census JSON files (`geography`,
/// `geographyCode`, `demographic`, `percentiles`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionRecord {
    // ========================================================================
    // KEY
    // ========================================================================
    pub geography_code: String,

    /// Opaque demographic code, `"all"` for the whole population
    #[serde(rename = "demographic", default = "default_demographic")]
    pub demographic_code: String,

    // ========================================================================
    // LABELS
    // ========================================================================
    #[serde(rename = "geography")]
    pub geography_label: String,

    #[serde(default)]
    pub demographic_label: Option<String>,

    /// "country", "province", ... (descriptor metadata only)
    #[serde(default)]
    pub geography_type: Option<String>,

    #[serde(default)]
    pub demographic_type: Option<String>,

    // ========================================================================
    // STATISTICS
    // ========================================================================
    pub year: i32,

    #[serde(rename = "percentiles")]
    pub markers: PercentileMarkers,

    pub median: f64,
    pub average: f64,
    pub total_recipients: u64,
}

impl DistributionRecord {
    /// Composite store key
    pub fn key(&self) -> (&str, &str) {
        (&self.geography_code, &self.demographic_code)
    }

    /// Label shown for the demographic, falling back to the code
    pub fn demographic_display(&self) -> &str {
        self.demographic_label
            .as_deref()
            .unwrap_or(&self.demographic_code)
    }

    /// Full validation run by the loader before registering a record
    pub fn validate(&self) -> Result<()> {
        if self.geography_code.trim().is_empty() {
            return Err(RankError::invalid("geographyCode is empty"));
        }
        if self.demographic_code.trim().is_empty() {
            return Err(RankError::invalid("demographic is empty"));
        }
        for (name, value) in [("median", self.median), ("average", self.average)] {
            if !value.is_finite() || value < 0.0 {
                return Err(RankError::invalid(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        self.markers.check_monotonic()
    }

    /// Built-in Canada-wide 2020 distribution, seeded before any data files
    pub fn default_canada() -> Self {
        DistributionRecord {
            geography_code: "CA".to_string(),
            demographic_code: ALL_DEMOGRAPHIC.to_string(),
            geography_label: "Canada".to_string(),
            demographic_label: Some("All persons".to_string()),
            geography_type: Some("country".to_string()),
            demographic_type: None,
            year: 2020,
            markers: PercentileMarkers {
                p10: 5200.0,
                p25: 16900.0,
                p50: 37358.0,
                p75: 67800.0,
                p90: 102000.0,
                p95: 129700.0,
                p99: 216200.0,
            },
            median: 37358.0,
            average: 53939.0,
            total_recipients: 27_000_000,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
