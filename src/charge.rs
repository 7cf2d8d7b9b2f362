use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::types::{ChargeId, ChargeStatus, CustomerId, PaymentId, PaymentMethod};

/// a billable obligation owed by a customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Charge {
    pub id: ChargeId,
    pub customer_id: CustomerId,
    pub amount: Money,
    pub due_date: DateTime<Utc>,
    /// stored status; overdue is derived, see [`Charge::display_status`]
    pub status: ChargeStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Charge {
    /// open a new pending charge
    pub fn open(customer_id: CustomerId, amount: Money, due_date: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_id,
            amount,
            due_date,
            status: ChargeStatus::Pendente,
            created_at: now,
            updated_at: now,
        }
    }

    /// status as reported to readers
    ///
    /// A pending charge past its due instant reads as `Vencido`; nothing is
    /// written back.
    pub fn display_status(&self, now: DateTime<Utc>) -> ChargeStatus {
        if self.status == ChargeStatus::Pendente && now > self.due_date {
            ChargeStatus::Vencido
        } else {
            self.status
        }
    }

    /// check if the charge still accepts corrections and payments
    pub fn is_open(&self) -> bool {
        self.status == ChargeStatus::Pendente
    }

    /// transition the stored status
    pub fn update_status(&mut self, new_status: ChargeStatus, now: DateTime<Utc>) {
        self.status = new_status;
        self.updated_at = now;
    }
}

/// the settlement record for exactly one charge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    /// unique across all payments; a charge settles at most once
    pub charge_id: ChargeId,
    pub amount: Money,
    pub method: PaymentMethod,
    pub paid_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(charge_id: ChargeId, amount: Money, method: PaymentMethod, paid_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            charge_id,
            amount,
            method,
            paid_at,
        }
    }
}
