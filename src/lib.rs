// Income Rank - Core Library
// Percentile lookup + interpolation over sparse income distributions.
// Exposes all modules for use in the CLI, API server, and tests

pub mod error;
pub mod distribution;   // Percentile tables per geography/demographic
pub mod interpolation;  // Individual income → percentile + bracket
pub mod household;      // Household quintiles → percentile + bracket
pub mod store;          // In-memory index with "all" fallback
pub mod comparison;     // Below/above counts, median/average deltas
pub mod demographics;   // Age → demographic code helper
pub mod loader;         // JSON data directory → store
pub mod config;
pub mod logging;
pub mod service;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use error::{RankError, Result};
pub use distribution::{DistributionRecord, PercentileMarkers, ALL_DEMOGRAPHIC};
pub use interpolation::{
    bracket_of, Anchor, IncomeBracket, InterpolationEngine, MAX_PERCENTILE,
};
pub use household::{
    household_bracket_of, HouseholdRecord, Quintile, QuintileBounds, QuintilePlacement,
    QuintilePolicy,
};
pub use store::{DemographicDescriptor, DistributionStore, GeographyDescriptor};
pub use comparison::{HouseholdComparison, IncomeComparison, ReferenceDelta, Standing};
pub use demographics::{age_group_label, check_age, demographic_for_age};
pub use loader::{load_file, load_store, parse_data_file, DataFile};
pub use config::{Config, DataConfig, EngineConfig, ServerConfig};
pub use service::RankService;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
