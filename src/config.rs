use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};

/// overdue interest policy
///
/// Interest is linear: `rate × (days_overdue / month_length_days)`, no
/// compounding. A month is a fixed block of days, not a calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterestPolicy {
    /// rate charged per full month overdue
    pub monthly_rate: Rate,
    /// days that make up one interest month
    pub month_length_days: u32,
}

impl Default for InterestPolicy {
    fn default() -> Self {
        Self {
            monthly_rate: Rate::from_percentage(10),
            month_length_days: 30,
        }
    }
}

/// settlement policy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SettlementPolicy {
    /// accepted gap between attempted and expected amount
    pub tolerance: Money,
    pub interest: InterestPolicy,
}

impl SettlementPolicy {
    /// exact-match settlement, no tolerance
    pub fn strict() -> Self {
        Self {
            tolerance: Money::ZERO,
            interest: InterestPolicy::default(),
        }
    }
}

impl Default for SettlementPolicy {
    fn default() -> Self {
        Self {
            tolerance: Money::CENT,
            interest: InterestPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_policy() {
        let policy = SettlementPolicy::default();
        assert_eq!(policy.tolerance, Money::from_str_exact("0.01").unwrap());
        assert_eq!(policy.interest.monthly_rate.as_decimal(), dec!(0.10));
        assert_eq!(policy.interest.month_length_days, 30);
    }

    #[test]
    fn test_strict_policy() {
        let policy = SettlementPolicy::strict();
        assert!(policy.tolerance.is_zero());
    }
}
