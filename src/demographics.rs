// 👥 Age → demographic code, for the CLI and HTTP surfaces
// The store and engines treat demographic codes as opaque strings.

use crate::error::{RankError, Result};

pub const MIN_AGE: u32 = 15;
pub const MAX_AGE: u32 = 100;

/// 5-year buckets from 15 to 64, then a single 65+ bucket
const AGE_BUCKETS: [(u32, u32, &str, &str); 10] = [
    (15, 19, "age-15-19", "15-19"),
    (20, 24, "age-20-24", "20-24"),
    (25, 29, "age-25-29", "25-29"),
    (30, 34, "age-30-34", "30-34"),
    (35, 39, "age-35-39", "35-39"),
    (40, 44, "age-40-44", "40-44"),
    (45, 49, "age-45-49", "45-49"),
    (50, 54, "age-50-54", "50-54"),
    (55, 59, "age-55-59", "55-59"),
    (60, 64, "age-60-64", "60-64"),
];

pub fn demographic_for_age(age: u32) -> &'static str {
    if age >= 65 {
        return "age-65plus";
    }
    AGE_BUCKETS
        .iter()
        .find(|(low, high, _, _)| (*low..=*high).contains(&age))
        .map(|(_, _, code, _)| *code)
        .unwrap_or(crate::distribution::ALL_DEMOGRAPHIC)
}

pub fn age_group_label(age: u32) -> Option<&'static str> {
    if age >= 65 {
        return Some("65+");
    }
    AGE_BUCKETS
        .iter()
        .find(|(low, high, _, _)| (*low..=*high).contains(&age))
        .map(|(_, _, _, label)| *label)
}

pub fn check_age(age: u32) -> Result<u32> {
    if (MIN_AGE..=MAX_AGE).contains(&age) {
        Ok(age)
    } else {
        Err(RankError::invalid(format!(
            "age must be between {} and {}, got {}",
            MIN_AGE, MAX_AGE, age
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_edges() {
        assert_eq!(demographic_for_age(15), "age-15-19");
        assert_eq!(demographic_for_age(19), "age-15-19");
        assert_eq!(demographic_for_age(20), "age-20-24");
        assert_eq!(demographic_for_age(64), "age-60-64");
        assert_eq!(demographic_for_age(65), "age-65plus");
        assert_eq!(demographic_for_age(99), "age-65plus");
        assert_eq!(demographic_for_age(14), "all");
    }

    #[test]
    fn test_labels() {
        assert_eq!(age_group_label(27), Some("25-29"));
        assert_eq!(age_group_label(70), Some("65+"));
        assert_eq!(age_group_label(3), None);
    }

    #[test]
    fn test_check_age() {
        assert_eq!(check_age(15).unwrap(), 15);
        assert_eq!(check_age(100).unwrap(), 100);
        assert!(check_age(14).is_err());
        assert!(check_age(101).is_err());
    }
}
