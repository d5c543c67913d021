// ⚠️ Error taxonomy for distribution lookup and interpolation

/// Failures reported by the store and the interpolation engines.
///
/// Nothing in the core performs I/O, so none of these are retryable.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RankError {
    /// Negative or non-finite income, malformed record, bad configuration
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No distribution (after fallback) or household record available
    #[error("Not found: {0}")]
    NotFound(String),

    /// Data broke an invariant the engine relies on (e.g. marker monotonicity)
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Household bracket requested for a quintile outside 1..=5
    #[error("Unknown quintile: {0}")]
    UnknownQuintile(u8),
}

impl RankError {
    pub fn invalid(message: impl Into<String>) -> Self {
        RankError::InvalidInput(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        RankError::NotFound(message.into())
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        RankError::InvariantViolation(message.into())
    }
}

pub type Result<T> = std::result::Result<T, RankError>;

/// Reject negative, NaN and infinite incomes
pub fn check_income(income: f64) -> Result<()> {
    if !income.is_finite() {
        return Err(RankError::invalid(format!("income must be a finite number, got {}", income)));
    }
    if income < 0.0 {
        return Err(RankError::invalid(format!("income must not be negative, got {}", income)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_income() {
        assert!(check_income(0.0).is_ok());
        assert!(check_income(52_000.0).is_ok());
        assert!(matches!(check_income(-1.0), Err(RankError::InvalidInput(_))));
        assert!(matches!(check_income(f64::NAN), Err(RankError::InvalidInput(_))));
        assert!(matches!(check_income(f64::INFINITY), Err(RankError::InvalidInput(_))));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(RankError::UnknownQuintile(7).to_string(), "Unknown quintile: 7");
        assert_eq!(
            RankError::not_found("CA-all").to_string(),
            "Not found: CA-all"
        );
    }
}
