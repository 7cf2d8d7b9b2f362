use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::InterestPolicy;
use crate::decimal::{round2, Money};

/// result of evaluating a charge against a reference instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterestCalculation {
    pub original_amount: Money,
    pub interest: Money,
    pub total_amount: Money,
    pub is_overdue: bool,
    /// months overdue, 2-decimal, 30-day months
    pub months_overdue: Decimal,
}

/// engine for computing overdue interest
///
/// Pure and total: any non-negative amount and any pair of instants produce
/// a calculation, never an error.
#[derive(Debug, Clone, Default)]
pub struct InterestEngine {
    pub policy: InterestPolicy,
}

impl InterestEngine {
    pub fn new(policy: InterestPolicy) -> Self {
        Self { policy }
    }

    /// compute interest accrued on `amount` due at `due_date`, as of `now`
    ///
    /// A charge is overdue only strictly after its due instant. Days overdue
    /// truncate downward, so a charge less than one full day late is overdue
    /// with zero interest.
    pub fn calculate(&self, amount: Money, due_date: DateTime<Utc>, now: DateTime<Utc>) -> InterestCalculation {
        let is_overdue = now > due_date;

        if !is_overdue {
            return InterestCalculation {
                original_amount: amount,
                interest: Money::ZERO,
                total_amount: amount,
                is_overdue: false,
                months_overdue: Decimal::ZERO,
            };
        }

        let days_overdue = (now - due_date).num_days();
        let months_overdue = Decimal::from(days_overdue) / Decimal::from(self.policy.month_length_days);

        // interest from the unrounded months, then each output rounded on its own
        let interest = round2(amount.as_decimal() * self.policy.monthly_rate.as_decimal() * months_overdue);
        let total = round2(amount.as_decimal() + interest);

        InterestCalculation {
            original_amount: amount,
            interest: Money::from_decimal(interest),
            total_amount: Money::from_decimal(total),
            is_overdue: true,
            months_overdue: round2(months_overdue),
        }
    }
}

/// compute overdue interest under the default policy (10% per 30 days)
pub fn calculate_interest(amount: Money, due_date: DateTime<Utc>, now: DateTime<Utc>) -> InterestCalculation {
    InterestEngine::default().calculate(amount, due_date, now)
}
