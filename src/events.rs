use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{ChargeId, ChargeStatus, CustomerId, PaymentId, PaymentMethod};

/// all events emitted by billing operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // charge lifecycle
    ChargeCreated {
        charge_id: ChargeId,
        customer_id: CustomerId,
        amount: Money,
        due_date: DateTime<Utc>,
        timestamp: DateTime<Utc>,
    },
    ChargeCorrected {
        charge_id: ChargeId,
        amount: Money,
        due_date: DateTime<Utc>,
        timestamp: DateTime<Utc>,
    },
    ChargeCancelled {
        charge_id: ChargeId,
        timestamp: DateTime<Utc>,
    },
    StatusChanged {
        charge_id: ChargeId,
        old_status: ChargeStatus,
        new_status: ChargeStatus,
        timestamp: DateTime<Utc>,
    },

    // settlement
    PaymentSettled {
        charge_id: ChargeId,
        payment_id: PaymentId,
        amount: Money,
        method: PaymentMethod,
        interest: Money,
        months_overdue: Decimal,
        timestamp: DateTime<Utc>,
    },
    PaymentRejected {
        charge_id: ChargeId,
        attempted: Money,
        reason: String,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
