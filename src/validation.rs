use chrono::{DateTime, Months, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::decimal::Money;
use crate::errors::BillingError;
use crate::types::CustomerId;

/// largest amount a single charge may carry
const MAX_CHARGE_AMOUNT: Decimal = dec!(999999.99);

/// a single input violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// accumulated violations for one input
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(ValidationError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}", error)?;
            first = false;
        }
        Ok(())
    }
}

/// outcome of validating an input: the parsed value or everything wrong
/// with it
#[derive(Debug, Clone, PartialEq)]
pub enum Validated<T> {
    Valid(T),
    Invalid(ValidationErrors),
}

impl<T> Validated<T> {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validated::Valid(_))
    }

    pub fn into_result(self) -> Result<T, BillingError> {
        match self {
            Validated::Valid(value) => Ok(value),
            Validated::Invalid(errors) => Err(BillingError::Validation(errors)),
        }
    }
}

/// raw input for opening a charge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeDraft {
    pub customer_id: CustomerId,
    pub amount: Decimal,
    pub due_date: DateTime<Utc>,
}

/// a charge draft that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct NewCharge {
    pub customer_id: CustomerId,
    pub amount: Money,
    pub due_date: DateTime<Utc>,
}

/// raw input for correcting an open charge
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChargePatch {
    pub amount: Option<Decimal>,
    pub due_date: Option<DateTime<Utc>>,
}

/// a validated charge correction
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeCorrection {
    pub amount: Option<Money>,
    pub due_date: Option<DateTime<Utc>>,
}

/// validate a charge draft against the creation rules
///
/// All violations are reported together. Due-date bounds compare at day
/// granularity: due today is fine, due more than one year out is not.
pub fn validate_charge_draft(draft: &ChargeDraft, now: DateTime<Utc>) -> Validated<NewCharge> {
    let mut errors = ValidationErrors::default();

    check_amount(draft.amount, &mut errors);
    check_due_date(draft.due_date, now, &mut errors);

    if errors.is_empty() {
        Validated::Valid(NewCharge {
            customer_id: draft.customer_id,
            amount: Money::from_decimal(draft.amount),
            due_date: draft.due_date,
        })
    } else {
        Validated::Invalid(errors)
    }
}

/// validate a correction to an open charge; absent fields are untouched
pub fn validate_charge_patch(patch: &ChargePatch, now: DateTime<Utc>) -> Validated<ChargeCorrection> {
    let mut errors = ValidationErrors::default();

    if let Some(amount) = patch.amount {
        check_amount(amount, &mut errors);
    }
    if let Some(due_date) = patch.due_date {
        check_due_date(due_date, now, &mut errors);
    }

    if errors.is_empty() {
        Validated::Valid(ChargeCorrection {
            amount: patch.amount.map(Money::from_decimal),
            due_date: patch.due_date,
        })
    } else {
        Validated::Invalid(errors)
    }
}

/// validate a payment attempt amount
pub fn validate_payment_amount(amount: Decimal) -> Validated<Money> {
    if amount <= Decimal::ZERO {
        let mut errors = ValidationErrors::default();
        errors.push("amount", "must be greater than zero");
        return Validated::Invalid(errors);
    }
    Validated::Valid(Money::from_decimal(amount))
}

fn check_amount(amount: Decimal, errors: &mut ValidationErrors) {
    if amount < dec!(0.01) {
        errors.push("amount", "must be at least 0.01");
    } else if amount > MAX_CHARGE_AMOUNT {
        errors.push("amount", "must not exceed 999999.99");
    }
}

fn check_due_date(due_date: DateTime<Utc>, now: DateTime<Utc>, errors: &mut ValidationErrors) {
    let today = now.date_naive();
    let due = due_date.date_naive();

    if due < today {
        errors.push("due_date", "must be today or a future date");
    } else if due > today + Months::new(12) {
        errors.push("due_date", "must be at most one year from today");
    }
}
