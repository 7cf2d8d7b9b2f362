use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::charge::{Charge, Payment};
use crate::config::SettlementPolicy;
use crate::decimal::Money;
use crate::errors::BillingError;
use crate::interest::{InterestCalculation, InterestEngine};
use crate::types::{ChargeId, ChargeStatus, PaymentMethod};

/// a payment attempt against a charge
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentAttempt {
    pub charge_id: ChargeId,
    pub amount: Money,
    pub method: PaymentMethod,
}

/// effects of an accepted settlement
///
/// The status change and the payment record must be persisted together;
/// the storage collaborator owns the transaction boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    pub charge_id: ChargeId,
    pub new_status: ChargeStatus,
    pub payment: Payment,
    pub assessment: InterestCalculation,
}

/// why a settlement attempt was turned down
///
/// These are decisions, not faults; callers surface them as conflict or
/// input errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RejectionReason {
    #[error("charge {charge_id} already has a payment registered")]
    AlreadyPaid {
        charge_id: ChargeId,
    },

    #[error("charge not payable: current status is {status}")]
    NotPayable {
        status: ChargeStatus,
    },

    #[error("payment amount {attempted} does not match expected {expected} (original {original} + interest {interest})")]
    AmountMismatch {
        attempted: Money,
        expected: Money,
        original: Money,
        interest: Money,
    },
}

impl From<RejectionReason> for BillingError {
    fn from(reason: RejectionReason) -> Self {
        match reason {
            RejectionReason::AlreadyPaid { charge_id } => BillingError::AlreadyPaid { id: charge_id },
            RejectionReason::NotPayable { status } => BillingError::NotPayable { status },
            RejectionReason::AmountMismatch {
                attempted,
                expected,
                original,
                interest,
            } => BillingError::InvalidAmount {
                attempted,
                expected,
                original,
                interest,
            },
        }
    }
}

/// outcome of a settlement authorization
#[derive(Debug, Clone, PartialEq)]
pub enum SettlementDecision {
    Accepted(Settlement),
    Rejected(RejectionReason),
}

impl SettlementDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SettlementDecision::Accepted(_))
    }

    /// convert a rejection into the matching typed error
    pub fn into_result(self) -> Result<Settlement, BillingError> {
        match self {
            SettlementDecision::Accepted(settlement) => Ok(settlement),
            SettlementDecision::Rejected(reason) => Err(reason.into()),
        }
    }
}

/// engine deciding whether a payment attempt may settle a charge
///
/// Synchronous and side-effect free; nothing here touches storage. The
/// uniqueness check on the existing payment is a fast path only; the
/// store's unique constraint on `Payment.charge_id` is the authoritative
/// guard under concurrency.
#[derive(Debug, Clone, Default)]
pub struct SettlementEngine {
    pub policy: SettlementPolicy,
}

impl SettlementEngine {
    pub fn new(policy: SettlementPolicy) -> Self {
        Self { policy }
    }

    /// authorize a payment attempt against the charge's current state
    ///
    /// Check order matters: a registered payment rejects before any amount
    /// validation.
    pub fn authorize(
        &self,
        charge: &Charge,
        existing_payment: Option<&Payment>,
        attempt: &PaymentAttempt,
        now: DateTime<Utc>,
    ) -> SettlementDecision {
        if existing_payment.is_some() {
            return SettlementDecision::Rejected(RejectionReason::AlreadyPaid {
                charge_id: charge.id,
            });
        }

        if charge.status.is_terminal() {
            return SettlementDecision::Rejected(RejectionReason::NotPayable {
                status: charge.status,
            });
        }

        let assessment = InterestEngine::new(self.policy.interest).calculate(charge.amount, charge.due_date, now);
        let expected = assessment.total_amount;

        if (attempt.amount - expected).abs() > self.policy.tolerance {
            return SettlementDecision::Rejected(RejectionReason::AmountMismatch {
                attempted: attempt.amount,
                expected,
                original: assessment.original_amount,
                interest: assessment.interest,
            });
        }

        SettlementDecision::Accepted(Settlement {
            charge_id: charge.id,
            new_status: ChargeStatus::Pago,
            payment: Payment::new(charge.id, attempt.amount, attempt.method, now),
            assessment,
        })
    }
}
