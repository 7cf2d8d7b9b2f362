use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::charge::{Charge, Payment};
use crate::types::{ChargeId, ChargeStatus, Customer, CustomerId};

/// failure of an atomic settlement commit
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommitError {
    /// the unique payment-per-charge constraint fired; callers report this
    /// as an already-settled charge
    #[error("a payment already references charge {charge_id}")]
    ConstraintViolation {
        charge_id: ChargeId,
    },

    #[error("charge {charge_id} missing at commit time")]
    ChargeMissing {
        charge_id: ChargeId,
    },

    #[error("backend failure: {message}")]
    Backend {
        message: String,
    },
}

/// the storage collaborator behind every billing operation
///
/// One seam for any backing store. `commit_settlement` is all-or-nothing:
/// the status change and the payment row land together or not at all.
/// Payment-per-charge uniqueness MUST be enforced here; the engine's
/// pre-check is only a fast path.
pub trait ChargeStore {
    fn find_charge(&self, id: ChargeId) -> Option<Charge>;
    fn find_payment_by_charge(&self, charge_id: ChargeId) -> Option<Payment>;
    fn insert_charge(&mut self, charge: Charge);
    /// replace a stored charge wholesale
    fn update_charge(&mut self, charge: Charge);
    fn list_charges(&self) -> Vec<Charge>;
    fn list_payments(&self) -> Vec<Payment>;
    fn insert_customer(&mut self, customer: Customer);
    fn find_customer(&self, id: CustomerId) -> Option<Customer>;
    fn commit_settlement(
        &mut self,
        charge_id: ChargeId,
        new_status: ChargeStatus,
        payment: Payment,
    ) -> Result<(), CommitError>;
}

/// in-memory store
///
/// Payments are keyed by charge id; the map key is the unique index.
#[derive(Debug, Default)]
pub struct MemoryStore {
    charges: HashMap<ChargeId, Charge>,
    payments: HashMap<ChargeId, Payment>,
    customers: HashMap<CustomerId, Customer>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// serialize the full store state to JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        let snapshot = StoreSnapshot {
            charges: self.charges.values().cloned().collect(),
            payments: self.payments.values().cloned().collect(),
            customers: self.customers.values().cloned().collect(),
        };
        serde_json::to_string_pretty(&snapshot)
    }

    /// rebuild a store from a JSON snapshot
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let snapshot: StoreSnapshot = serde_json::from_str(json)?;
        let mut store = Self::new();
        for customer in snapshot.customers {
            store.customers.insert(customer.id, customer);
        }
        for charge in snapshot.charges {
            store.charges.insert(charge.id, charge);
        }
        for payment in snapshot.payments {
            store.payments.insert(payment.charge_id, payment);
        }
        Ok(store)
    }
}

impl ChargeStore for MemoryStore {
    fn find_charge(&self, id: ChargeId) -> Option<Charge> {
        self.charges.get(&id).cloned()
    }

    fn find_payment_by_charge(&self, charge_id: ChargeId) -> Option<Payment> {
        self.payments.get(&charge_id).cloned()
    }

    fn insert_charge(&mut self, charge: Charge) {
        self.charges.insert(charge.id, charge);
    }

    fn update_charge(&mut self, charge: Charge) {
        self.charges.insert(charge.id, charge);
    }

    fn list_charges(&self) -> Vec<Charge> {
        self.charges.values().cloned().collect()
    }

    fn list_payments(&self) -> Vec<Payment> {
        self.payments.values().cloned().collect()
    }

    fn insert_customer(&mut self, customer: Customer) {
        self.customers.insert(customer.id, customer);
    }

    fn find_customer(&self, id: CustomerId) -> Option<Customer> {
        self.customers.get(&id).cloned()
    }

    fn commit_settlement(
        &mut self,
        charge_id: ChargeId,
        new_status: ChargeStatus,
        payment: Payment,
    ) -> Result<(), CommitError> {
        if self.payments.contains_key(&charge_id) {
            return Err(CommitError::ConstraintViolation { charge_id });
        }
        let charge = self
            .charges
            .get_mut(&charge_id)
            .ok_or(CommitError::ChargeMissing { charge_id })?;

        // checks passed; both writes now land together
        charge.status = new_status;
        charge.updated_at = payment.paid_at;
        self.payments.insert(charge_id, payment);
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct StoreSnapshot {
    charges: Vec<Charge>,
    payments: Vec<Payment>,
    customers: Vec<Customer>,
}
