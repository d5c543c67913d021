// 🎯 Rank Service - store + engines behind one read-only handle
//
// Built once at startup and shared (by reference or `Arc`) with the request
// layer. Every method is a pure computation over the loaded data.

use crate::comparison::{HouseholdComparison, IncomeComparison, ReferenceDelta, Standing};
use crate::config::{Config, EngineConfig};
use crate::distribution::DistributionRecord;
use crate::error::Result;
use crate::household::{household_bracket_of, HouseholdRecord, QuintilePlacement, QuintilePolicy};
use crate::interpolation::{bracket_of, IncomeBracket, InterpolationEngine};
use crate::loader::load_store;
use crate::store::DistributionStore;

#[derive(Debug, Clone)]
pub struct RankService {
    store: DistributionStore,
    engine: InterpolationEngine,
    policy: QuintilePolicy,
}

impl RankService {
    pub fn new(store: DistributionStore, config: &EngineConfig) -> Result<Self> {
        Ok(RankService {
            store,
            engine: InterpolationEngine::from_config(config)?,
            policy: config.quintile_policy,
        })
    }

    /// Load the data directory named in `config` and build the service
    pub fn load(config: &Config) -> anyhow::Result<Self> {
        config.engine.validate()?;
        let store = load_store(&config.data.data_dir, config.engine.quintile_policy)?;
        Ok(RankService::new(store, &config.engine)?)
    }

    pub fn store(&self) -> &DistributionStore {
        &self.store
    }

    pub fn engine(&self) -> &InterpolationEngine {
        &self.engine
    }

    pub fn policy(&self) -> QuintilePolicy {
        self.policy
    }

    // ========================================================================
    // INDIVIDUAL INCOME
    // ========================================================================

    pub fn lookup(&self, geography_code: &str, demographic_code: &str) -> Result<&DistributionRecord> {
        self.store.lookup(geography_code, demographic_code)
    }

    pub fn percentile_of(&self, income: f64, record: &DistributionRecord) -> Result<f64> {
        self.engine.percentile_of(income, record)
    }

    pub fn bracket_of(&self, percentile: f64) -> IncomeBracket {
        bracket_of(percentile)
    }

    /// Resolve the distribution, rank the income and summarize it
    pub fn compare_income(
        &self,
        income: f64,
        geography_code: &str,
        demographic_code: &str,
    ) -> Result<IncomeComparison> {
        let record = self.lookup(geography_code, demographic_code)?;
        let percentile = self.percentile_of(income, record)?;
        let standing = Standing::from_percentile(percentile);

        tracing::debug!(
            geography = %record.geography_code,
            demographic = %record.demographic_code,
            income,
            percentile,
            "ranked individual income"
        );

        Ok(IncomeComparison {
            income,
            geography: record.geography_label.clone(),
            demographic: record.demographic_display().to_string(),
            year: record.year,
            standing,
            bracket: bracket_of(percentile).label().to_string(),
            median: ReferenceDelta::new(income, record.median),
            average: ReferenceDelta::new(income, record.average),
            estimated_people_below_you: standing.estimated_below(record.total_recipients),
            total_recipients: record.total_recipients,
        })
    }

    // ========================================================================
    // HOUSEHOLD INCOME
    // ========================================================================

    pub fn household(&self) -> Result<&HouseholdRecord> {
        self.store.household()
    }

    pub fn household_quintile_of(&self, income: f64) -> Result<QuintilePlacement> {
        self.household()?.quintile_of(income, self.policy)
    }

    pub fn household_percentile_of(&self, income: f64) -> Result<f64> {
        self.household()?.percentile_of(income, self.policy)
    }

    pub fn household_bracket_of(&self, quintile: u8) -> Result<&'static str> {
        household_bracket_of(quintile)
    }

    pub fn compare_household(&self, income: f64) -> Result<HouseholdComparison> {
        let household = self.household()?;
        let placement = household.quintile_of(income, self.policy)?;
        let percentile = household.percentile_of(income, self.policy)?;
        let standing = Standing::from_percentile(percentile);

        Ok(HouseholdComparison {
            income,
            geography: household.geography_label.clone(),
            year: household.year,
            quintile: placement.quintile,
            bracket: household_bracket_of(placement.quintile)?.to_string(),
            quintile_label: placement.label,
            quintile_bounds: placement.bounds,
            standing,
            median: ReferenceDelta::new(income, household.median),
            average: ReferenceDelta::new(income, household.average),
            estimated_households_below_you: standing.estimated_below(household.total_households),
            total_households: household.total_households,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RankError;
    use crate::household::Quintile;

    fn household() -> HouseholdRecord {
        let quintile = |label: &str, average: f64| Quintile {
            label: label.to_string(),
            average: Some(average),
            min: None,
            max: None,
        };
        HouseholdRecord {
            geography_label: "Canada".to_string(),
            year: 2021,
            median: 84000.0,
            average: 106000.0,
            total_households: 15_000_000,
            quintiles: [
                quintile("Lowest quintile", 20000.0),
                quintile("Second quintile", 45000.0),
                quintile("Third quintile", 75000.0),
                quintile("Fourth quintile", 115000.0),
                quintile("Highest quintile", 250000.0),
            ],
        }
    }

    fn service(with_household: bool) -> RankService {
        let mut store = DistributionStore::new();
        store.register(DistributionRecord::default_canada());
        if with_household {
            store.set_household(household());
        }
        RankService::new(store, &EngineConfig::default()).unwrap()
    }

    #[test]
    fn test_compare_income_at_median() {
        let comparison = service(false).compare_income(37358.0, "CA", "age-25-29").unwrap();

        assert_eq!(comparison.geography, "Canada");
        assert_eq!(comparison.demographic, "All persons");
        assert_eq!(comparison.standing.percentile, 50.0);
        assert_eq!(comparison.standing.below_you, 50);
        assert_eq!(comparison.bracket, "Above Median");
        assert_eq!(comparison.median.difference, 0);
        assert_eq!(comparison.estimated_people_below_you, 13_500_000);
    }

    #[test]
    fn test_compare_income_errors() {
        let service = service(false);
        assert!(matches!(
            service.compare_income(-5.0, "CA", "all"),
            Err(RankError::InvalidInput(_))
        ));
        assert!(matches!(
            service.compare_income(5.0, "ZZ", "all"),
            Err(RankError::NotFound(_))
        ));
    }

    #[test]
    fn test_household_operations() {
        let service = service(true);

        let placement = service.household_quintile_of(10000.0).unwrap();
        assert_eq!(placement.quintile, 1);
        assert_eq!(
            service.household_bracket_of(placement.quintile).unwrap(),
            "First Quintile (Q1) - Bottom 20%"
        );

        let p = service.household_percentile_of(10000.0).unwrap();
        assert!((p - 10000.0 / 32500.0 * 20.0).abs() < 1e-9);

        let comparison = service.compare_household(84000.0).unwrap();
        assert_eq!(comparison.quintile, 3);
        assert_eq!(comparison.quintile_label, "Third quintile");
        assert_eq!(comparison.bracket, "Third Quintile (Q3) - Middle 20%");
        assert_eq!(comparison.median.difference, 0);
        assert_eq!(comparison.total_households, 15_000_000);
    }

    #[test]
    fn test_household_missing() {
        let service = service(false);
        assert!(matches!(service.household_percentile_of(1.0), Err(RankError::NotFound(_))));
        assert!(matches!(service.compare_household(1.0), Err(RankError::NotFound(_))));
    }

    #[test]
    fn test_load_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.data.data_dir = dir.path().to_path_buf();
        config.engine.upper_bound = 500_000.0;

        let service = RankService::load(&config).unwrap();
        assert_eq!(service.engine().upper_bound(), 500_000.0);
        assert_eq!(service.policy(), QuintilePolicy::Midpoint);
        assert_eq!(service.store().len(), 1);
    }
}
