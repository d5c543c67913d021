// 🗂️ Distribution Store - in-memory index of distributions
//
// Populated once by the loader, then handed out by shared reference.
// Registration needs `&mut self`, so a store behind an `Arc` is read-only.

use crate::distribution::{DistributionRecord, ALL_DEMOGRAPHIC};
use crate::error::{RankError, Result};
use crate::household::HouseholdRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// DESCRIPTORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeographyDescriptor {
    pub code: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemographicDescriptor {
    pub code: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

// ============================================================================
// STORE
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct DistributionStore {
    /// geography code -> demographic code -> record
    records: HashMap<String, HashMap<String, DistributionRecord>>,
    household: Option<HouseholdRecord>,
    geographies: Vec<GeographyDescriptor>,
    demographics: Vec<DemographicDescriptor>,
}

impl DistributionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the record under its (geography, demographic) key
    pub fn register(&mut self, record: DistributionRecord) {
        if !self.geographies.iter().any(|g| g.code == record.geography_code) {
            self.geographies.push(GeographyDescriptor {
                code: record.geography_code.clone(),
                name: record.geography_label.clone(),
                kind: record
                    .geography_type
                    .clone()
                    .unwrap_or_else(|| "country".to_string()),
            });
        }

        if record.demographic_code != ALL_DEMOGRAPHIC
            && !self.demographics.iter().any(|d| d.code == record.demographic_code)
        {
            self.demographics.push(DemographicDescriptor {
                code: record.demographic_code.clone(),
                name: record.demographic_display().to_string(),
                kind: record
                    .demographic_type
                    .clone()
                    .unwrap_or_else(|| "other".to_string()),
            });
        }

        let previous = self
            .records
            .entry(record.geography_code.clone())
            .or_default()
            .insert(record.demographic_code.clone(), record);

        if let Some(previous) = previous {
            tracing::debug!(
                geography = %previous.geography_code,
                demographic = %previous.demographic_code,
                "replaced existing distribution"
            );
        }
    }

    /// Exact match, then the geography's `"all"` slice
    pub fn lookup(&self, geography_code: &str, demographic_code: &str) -> Result<&DistributionRecord> {
        let by_demographic = self.records.get(geography_code).ok_or_else(|| {
            RankError::not_found(format!("no distribution for geography '{}'", geography_code))
        })?;

        by_demographic
            .get(demographic_code)
            .or_else(|| by_demographic.get(ALL_DEMOGRAPHIC))
            .ok_or_else(|| {
                RankError::not_found(format!(
                    "no distribution for '{}-{}' and no '{}-{}' fallback",
                    geography_code, demographic_code, geography_code, ALL_DEMOGRAPHIC
                ))
            })
    }

    /// Population-wide distribution for a geography
    pub fn lookup_all(&self, geography_code: &str) -> Result<&DistributionRecord> {
        self.lookup(geography_code, ALL_DEMOGRAPHIC)
    }

    pub fn set_household(&mut self, record: HouseholdRecord) {
        if self.household.is_some() {
            tracing::warn!(
                geography = %record.geography_label,
                "replacing previously loaded household record"
            );
        }
        self.household = Some(record);
    }

    pub fn household(&self) -> Result<&HouseholdRecord> {
        self.household
            .as_ref()
            .ok_or_else(|| RankError::not_found("household income data not available"))
    }

    pub fn geographies(&self) -> &[GeographyDescriptor] {
        &self.geographies
    }

    pub fn demographics(&self) -> &[DemographicDescriptor] {
        &self.demographics
    }

    /// Number of registered distributions
    pub fn len(&self) -> usize {
        self.records.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn records(&self) -> impl Iterator<Item = &DistributionRecord> {
        self.records.values().flat_map(|by_demographic| by_demographic.values())
    }
}

// ============================================================================
// TESTS
// ============================================================================
