pub mod charge;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod interest;
pub mod service;
pub mod settlement;
pub mod store;
pub mod types;
pub mod validation;

// re-export key types
pub use charge::{Charge, Payment};
pub use config::{InterestPolicy, SettlementPolicy};
pub use decimal::{Money, Rate};
pub use errors::{BillingError, Result};
pub use events::{Event, EventStore};
pub use interest::{calculate_interest, InterestCalculation, InterestEngine};
pub use service::{
    BillingService, BillingStatistics, ChargeFilter, ChargeView, Page, PageRequest,
};
pub use settlement::{
    PaymentAttempt, RejectionReason, Settlement, SettlementDecision, SettlementEngine,
};
pub use store::{ChargeStore, CommitError, MemoryStore};
pub use types::{
    ChargeId, ChargeStatus, Customer, CustomerId, PaymentId, PaymentMethod,
};
pub use validation::{
    validate_charge_draft, validate_charge_patch, validate_payment_amount, ChargeDraft,
    ChargePatch, Validated, ValidationError, ValidationErrors,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
