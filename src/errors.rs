use thiserror::Error;

use crate::decimal::Money;
use crate::types::{ChargeId, ChargeStatus, CustomerId};
use crate::validation::ValidationErrors;

#[derive(Error, Debug)]
pub enum BillingError {
    #[error("charge not found: {id}")]
    ChargeNotFound {
        id: ChargeId,
    },

    #[error("customer not found: {id}")]
    CustomerNotFound {
        id: CustomerId,
    },

    #[error("charge {id} already has a payment registered")]
    AlreadyPaid {
        id: ChargeId,
    },

    #[error("invalid payment amount: attempted {attempted}, expected {expected} (original {original} + interest {interest})")]
    InvalidAmount {
        attempted: Money,
        expected: Money,
        original: Money,
        interest: Money,
    },

    #[error("charge not payable: current status is {status}")]
    NotPayable {
        status: ChargeStatus,
    },

    #[error("invalid status: current {current}, expected {expected}")]
    InvalidStatus {
        current: ChargeStatus,
        expected: ChargeStatus,
    },

    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("storage failure: {message}")]
    Storage {
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, BillingError>;
