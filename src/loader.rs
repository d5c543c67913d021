// 📂 Data Loader - census JSON files → DistributionStore
//
// Seeds the built-in Canada distribution, then reads every `*.json` file in the
// data directory (sorted by name). Bad files are skipped with a warning so one
// malformed export cannot take the whole service down.

use crate::distribution::DistributionRecord;
use crate::household::{HouseholdRecord, QuintilePolicy};
use crate::store::DistributionStore;
use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// One parsed data file
#[derive(Debug, Clone, PartialEq)]
pub enum DataFile {
    Distribution(DistributionRecord),
    Household(HouseholdRecord),
}

/// Parse a data file; documents carrying `quintiles` are household records
pub fn parse_data_file(content: &str) -> Result<DataFile> {
    let value: Value = serde_json::from_str(content).context("Failed to parse JSON")?;

    if value.get("quintiles").is_some() {
        let record: HouseholdRecord =
            serde_json::from_value(value).context("Invalid household record")?;
        Ok(DataFile::Household(record))
    } else {
        let record: DistributionRecord =
            serde_json::from_value(value).context("Invalid distribution record")?;
        Ok(DataFile::Distribution(record))
    }
}

pub fn load_file<P: AsRef<Path>>(path: P) -> Result<DataFile> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read data file: {:?}", path.as_ref()))?;

    parse_data_file(&content).with_context(|| format!("In data file: {:?}", path.as_ref()))
}

/// `*.json` files directly inside `dir`, sorted by file name
fn json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read data directory: {:?}", dir))? {
        let path = entry?.path();
        if path.is_file() && path.extension().map_or(false, |ext| ext == "json") {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Build a store from `data_dir`. Household records are checked against `policy`.
pub fn load_store(data_dir: &Path, policy: QuintilePolicy) -> Result<DistributionStore> {
    let mut store = DistributionStore::new();
    store.register(DistributionRecord::default_canada());
    tracing::info!("Default Canada distribution loaded");

    if !data_dir.exists() {
        tracing::warn!("Data directory not found: {:?}, using default data only", data_dir);
        return Ok(store);
    }

    let files = match json_files(data_dir) {
        Ok(files) => files,
        Err(e) => {
            tracing::warn!("{:#}, using default data only", e);
            return Ok(store);
        }
    };
    if files.is_empty() {
        tracing::info!("No data files in {:?}, using default data only", data_dir);
        return Ok(store);
    }

    tracing::info!("Found {} data file(s) to load", files.len());

    for path in files {
        match load_file(&path) {
            Ok(DataFile::Distribution(record)) => {
                if let Err(e) = record.validate() {
                    tracing::warn!("Skipping {:?}: {}", path, e);
                    continue;
                }
                tracing::info!(
                    "Loaded: {} - {}",
                    record.geography_label,
                    record.demographic_code
                );
                store.register(record);
            }
            Ok(DataFile::Household(record)) => {
                if let Err(e) = record.validate(policy) {
                    tracing::warn!("Skipping household file {:?}: {}", path, e);
                    continue;
                }
                tracing::info!("Loaded household data: {} {}", record.geography_label, record.year);
                store.set_household(record);
            }
            Err(e) => {
                tracing::warn!("Skipping {:?}: {:#}", path, e);
            }
        }
    }

    tracing::info!(
        distributions = store.len(),
        geographies = store.geographies().len(),
        demographics = store.demographics().len(),
        household = store.household().is_ok(),
        "Data loaded"
    );

    Ok(store)
}

// ============================================================================
// TESTS
// ============================================================================
