use hourglass_rs::SafeTimeProvider;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::charge::{Charge, Payment};
use crate::config::SettlementPolicy;
use crate::decimal::Money;
use crate::errors::{BillingError, Result};
use crate::events::{Event, EventStore};
use crate::interest::{InterestCalculation, InterestEngine};
use crate::settlement::{PaymentAttempt, SettlementDecision, SettlementEngine};
use crate::store::{ChargeStore, CommitError};
use crate::types::{ChargeId, ChargeStatus, Customer, CustomerId, PaymentMethod};
use crate::validation::{
    validate_charge_draft, validate_charge_patch, validate_payment_amount, ChargeDraft, ChargePatch,
};

/// charge listing filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChargeFilter {
    /// matches the status as displayed, so `Vencido` finds pending charges
    /// past their due instant
    pub status: Option<ChargeStatus>,
    pub customer_id: Option<CustomerId>,
}

/// pagination request, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

/// one page of results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: usize,
    pub page: u32,
    pub limit: u32,
    pub total_pages: usize,
}

/// a charge with its status as displayed at the query instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeView {
    pub charge: Charge,
    pub status: ChargeStatus,
}

/// aggregate numbers over the whole book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingStatistics {
    pub total: usize,
    pub pending: usize,
    pub paid: usize,
    pub overdue: usize,
    pub cancelled: usize,
    pub total_amount: Money,
    pub pending_amount: Money,
    pub amount_paid: Money,
}

/// billing orchestration over an injected store
///
/// Owns the settlement engine and the event trail; every "now" comes from
/// the caller's time provider.
pub struct BillingService<S: ChargeStore> {
    store: S,
    engine: SettlementEngine,
    pub events: EventStore,
}

impl<S: ChargeStore> BillingService<S> {
    pub fn new(store: S) -> Self {
        Self::with_policy(store, SettlementPolicy::default())
    }

    pub fn with_policy(store: S, policy: SettlementPolicy) -> Self {
        Self {
            store,
            engine: SettlementEngine::new(policy),
            events: EventStore::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// register a customer
    pub fn register_customer(&mut self, name: String, document: String) -> Customer {
        let customer = Customer {
            id: Uuid::new_v4(),
            name,
            document,
        };
        self.store.insert_customer(customer.clone());
        customer
    }

    pub fn customer(&self, id: CustomerId) -> Result<Customer> {
        self.store
            .find_customer(id)
            .ok_or(BillingError::CustomerNotFound { id })
    }

    /// open a new pending charge
    pub fn create_charge(&mut self, draft: ChargeDraft, time: &SafeTimeProvider) -> Result<Charge> {
        let now = time.now();
        let new_charge = validate_charge_draft(&draft, now).into_result()?;

        if self.store.find_customer(new_charge.customer_id).is_none() {
            return Err(BillingError::CustomerNotFound {
                id: new_charge.customer_id,
            });
        }

        let charge = Charge::open(new_charge.customer_id, new_charge.amount, new_charge.due_date, now);
        self.store.insert_charge(charge.clone());

        self.events.emit(Event::ChargeCreated {
            charge_id: charge.id,
            customer_id: charge.customer_id,
            amount: charge.amount,
            due_date: charge.due_date,
            timestamp: now,
        });

        Ok(charge)
    }

    /// fetch one charge with its displayed status
    pub fn charge(&self, id: ChargeId, time: &SafeTimeProvider) -> Result<ChargeView> {
        let charge = self.store.find_charge(id).ok_or(BillingError::ChargeNotFound { id })?;
        let status = charge.display_status(time.now());
        Ok(ChargeView { charge, status })
    }

    /// list charges ordered by due date, filtered and paginated
    pub fn list_charges(
        &self,
        filter: &ChargeFilter,
        page: PageRequest,
        time: &SafeTimeProvider,
    ) -> Page<ChargeView> {
        let now = time.now();

        let mut views: Vec<ChargeView> = self
            .store
            .list_charges()
            .into_iter()
            .map(|charge| {
                let status = charge.display_status(now);
                ChargeView { charge, status }
            })
            .filter(|view| {
                filter.status.map_or(true, |wanted| view.status == wanted)
                    && filter.customer_id.map_or(true, |c| view.charge.customer_id == c)
            })
            .collect();
        views.sort_by_key(|view| (view.charge.due_date, view.charge.id));

        let limit = page.limit.max(1) as usize;
        let current = page.page.max(1);
        let total = views.len();
        let total_pages = total.div_ceil(limit);

        let data = views
            .into_iter()
            .skip((current as usize - 1) * limit)
            .take(limit)
            .collect();

        Page {
            data,
            total,
            page: current,
            limit: limit as u32,
            total_pages,
        }
    }

    /// correct an open charge's amount or due date
    pub fn correct_charge(&mut self, id: ChargeId, patch: &ChargePatch, time: &SafeTimeProvider) -> Result<Charge> {
        let now = time.now();
        let mut charge = self.store.find_charge(id).ok_or(BillingError::ChargeNotFound { id })?;

        if !charge.is_open() {
            return Err(BillingError::InvalidStatus {
                current: charge.status,
                expected: ChargeStatus::Pendente,
            });
        }

        let correction = validate_charge_patch(patch, now).into_result()?;
        if let Some(amount) = correction.amount {
            charge.amount = amount;
        }
        if let Some(due_date) = correction.due_date {
            charge.due_date = due_date;
        }
        charge.updated_at = now;
        self.store.update_charge(charge.clone());

        self.events.emit(Event::ChargeCorrected {
            charge_id: charge.id,
            amount: charge.amount,
            due_date: charge.due_date,
            timestamp: now,
        });

        Ok(charge)
    }

    /// void an open charge
    pub fn cancel_charge(&mut self, id: ChargeId, time: &SafeTimeProvider) -> Result<Charge> {
        let now = time.now();
        let mut charge = self.store.find_charge(id).ok_or(BillingError::ChargeNotFound { id })?;

        if !charge.is_open() {
            return Err(BillingError::InvalidStatus {
                current: charge.status,
                expected: ChargeStatus::Pendente,
            });
        }

        let old_status = charge.status;
        charge.update_status(ChargeStatus::Cancelado, now);
        self.store.update_charge(charge.clone());

        self.events.emit(Event::StatusChanged {
            charge_id: charge.id,
            old_status,
            new_status: ChargeStatus::Cancelado,
            timestamp: now,
        });
        self.events.emit(Event::ChargeCancelled {
            charge_id: charge.id,
            timestamp: now,
        });

        Ok(charge)
    }

    /// preview what settles the charge right now
    pub fn payment_quote(&self, id: ChargeId, time: &SafeTimeProvider) -> Result<InterestCalculation> {
        let charge = self.store.find_charge(id).ok_or(BillingError::ChargeNotFound { id })?;

        if self.store.find_payment_by_charge(id).is_some() {
            return Err(BillingError::AlreadyPaid { id });
        }
        if charge.status.is_terminal() {
            return Err(BillingError::NotPayable { status: charge.status });
        }

        let engine = InterestEngine::new(self.engine.policy.interest);
        Ok(engine.calculate(charge.amount, charge.due_date, time.now()))
    }

    /// settle a charge with a payment attempt
    ///
    /// The store's unique constraint is the final word under concurrency; a
    /// constraint violation at commit reports as already paid.
    pub fn register_payment(
        &mut self,
        charge_id: ChargeId,
        amount: Decimal,
        method: PaymentMethod,
        time: &SafeTimeProvider,
    ) -> Result<Payment> {
        let now = time.now();
        let amount = validate_payment_amount(amount).into_result()?;

        let charge = self
            .store
            .find_charge(charge_id)
            .ok_or(BillingError::ChargeNotFound { id: charge_id })?;
        let existing = self.store.find_payment_by_charge(charge_id);

        let attempt = PaymentAttempt {
            charge_id,
            amount,
            method,
        };

        let settlement = match self.engine.authorize(&charge, existing.as_ref(), &attempt, now) {
            SettlementDecision::Accepted(settlement) => settlement,
            SettlementDecision::Rejected(reason) => {
                self.events.emit(Event::PaymentRejected {
                    charge_id,
                    attempted: amount,
                    reason: reason.to_string(),
                    timestamp: now,
                });
                return Err(reason.into());
            }
        };

        self.store
            .commit_settlement(charge_id, settlement.new_status, settlement.payment.clone())
            .map_err(|err| match err {
                CommitError::ConstraintViolation { charge_id } => BillingError::AlreadyPaid { id: charge_id },
                CommitError::ChargeMissing { charge_id } => BillingError::ChargeNotFound { id: charge_id },
                CommitError::Backend { message } => BillingError::Storage { message },
            })?;

        self.events.emit(Event::StatusChanged {
            charge_id,
            old_status: charge.status,
            new_status: settlement.new_status,
            timestamp: now,
        });
        self.events.emit(Event::PaymentSettled {
            charge_id,
            payment_id: settlement.payment.id,
            amount: settlement.payment.amount,
            method: settlement.payment.method,
            interest: settlement.assessment.interest,
            months_overdue: settlement.assessment.months_overdue,
            timestamp: now,
        });

        Ok(settlement.payment)
    }

    /// all payments, most recent first
    pub fn payments(&self) -> Vec<Payment> {
        let mut payments = self.store.list_payments();
        payments.sort_by_key(|p| std::cmp::Reverse((p.paid_at, p.id)));
        payments
    }

    /// aggregate counts and amounts by displayed status
    pub fn statistics(&self, time: &SafeTimeProvider) -> BillingStatistics {
        let now = time.now();
        let mut stats = BillingStatistics {
            total: 0,
            pending: 0,
            paid: 0,
            overdue: 0,
            cancelled: 0,
            total_amount: Money::ZERO,
            pending_amount: Money::ZERO,
            amount_paid: Money::ZERO,
        };

        for charge in self.store.list_charges() {
            stats.total += 1;
            stats.total_amount += charge.amount;
            match charge.display_status(now) {
                ChargeStatus::Pendente => {
                    stats.pending += 1;
                    stats.pending_amount += charge.amount;
                }
                ChargeStatus::Vencido => {
                    stats.overdue += 1;
                    stats.pending_amount += charge.amount;
                }
                ChargeStatus::Pago => stats.paid += 1,
                ChargeStatus::Cancelado => stats.cancelled += 1,
            }
        }
        for payment in self.store.list_payments() {
            stats.amount_paid += payment.amount;
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::{Duration, TimeZone, Utc};
    use hourglass_rs::TimeSource;
    use rust_decimal_macros::dec;

    fn service_at(start: chrono::DateTime<Utc>) -> (BillingService<MemoryStore>, SafeTimeProvider, Customer) {
        let time = SafeTimeProvider::new(TimeSource::Test(start));
        let mut service = BillingService::new(MemoryStore::new());
        let customer = service.register_customer("Maria Souza".to_string(), "123.456.789-00".to_string());
        (service, time, customer)
    }

    fn start() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 2, 9, 0, 0).unwrap()
    }

    fn draft(customer: &Customer, amount: Decimal, due: chrono::DateTime<Utc>) -> ChargeDraft {
        ChargeDraft {
            customer_id: customer.id,
            amount,
            due_date: due,
        }
    }

    #[test]
    fn test_create_charge_starts_pending() {
        let (mut service, time, customer) = service_at(start());

        let charge = service
            .create_charge(draft(&customer, dec!(100), start() + Duration::days(10)), &time)
            .unwrap();

        assert_eq!(charge.status, ChargeStatus::Pendente);
        assert_eq!(charge.amount, Money::from_major(100));
        assert!(matches!(service.events.events()[0], Event::ChargeCreated { .. }));
    }

    #[test]
    fn test_create_charge_requires_known_customer() {
        let (mut service, time, _) = service_at(start());
        let stranger = Uuid::new_v4();

        let err = service
            .create_charge(
                ChargeDraft {
                    customer_id: stranger,
                    amount: dec!(100),
                    due_date: start() + Duration::days(10),
                },
                &time,
            )
            .unwrap_err();

        assert!(matches!(err, BillingError::CustomerNotFound { id } if id == stranger));
    }

    #[test]
    fn test_create_charge_rejects_invalid_draft() {
        let (mut service, time, customer) = service_at(start());

        let err = service
            .create_charge(draft(&customer, dec!(0), start() - Duration::days(3)), &time)
            .unwrap_err();

        match err {
            BillingError::Validation(errors) => assert_eq!(errors.0.len(), 2),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_settlement_end_to_end_with_interest() {
        let (mut service, time, customer) = service_at(start());
        let control = time.test_control().unwrap();

        // due 2026-01-12, paid 2026-02-11: 30 days overdue
        let due = Utc.with_ymd_and_hms(2026, 1, 12, 0, 0, 0).unwrap();
        let charge = service.create_charge(draft(&customer, dec!(100), due), &time).unwrap();

        control.advance(Utc.with_ymd_and_hms(2026, 2, 11, 0, 0, 0).unwrap() - start());

        let quote = service.payment_quote(charge.id, &time).unwrap();
        assert!(quote.is_overdue);
        assert_eq!(quote.total_amount, Money::from_major(110));

        let payment = service
            .register_payment(charge.id, dec!(110.00), PaymentMethod::Pix, &time)
            .unwrap();
        assert_eq!(payment.amount, Money::from_major(110));
        assert_eq!(payment.method, PaymentMethod::Pix);

        let view = service.charge(charge.id, &time).unwrap();
        assert_eq!(view.charge.status, ChargeStatus::Pago);
        assert_eq!(view.status, ChargeStatus::Pago);

        let events = service.events.events();
        assert!(events.iter().any(|e| matches!(e, Event::PaymentSettled { .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::StatusChanged { new_status: ChargeStatus::Pago, .. })));
    }

    #[test]
    fn test_second_payment_conflicts() {
        let (mut service, time, customer) = service_at(start());
        let charge = service
            .create_charge(draft(&customer, dec!(100), start() + Duration::days(10)), &time)
            .unwrap();

        service
            .register_payment(charge.id, dec!(100), PaymentMethod::Pix, &time)
            .unwrap();
        let err = service
            .register_payment(charge.id, dec!(100), PaymentMethod::Boleto, &time)
            .unwrap_err();

        assert!(matches!(err, BillingError::AlreadyPaid { id } if id == charge.id));
    }

    #[test]
    fn test_payment_for_unknown_charge() {
        let (mut service, time, _) = service_at(start());
        let ghost = Uuid::new_v4();

        let err = service
            .register_payment(ghost, dec!(100), PaymentMethod::Pix, &time)
            .unwrap_err();

        assert!(matches!(err, BillingError::ChargeNotFound { id } if id == ghost));
    }

    #[test]
    fn test_rejected_payment_emits_event_and_changes_nothing() {
        let (mut service, time, customer) = service_at(start());
        let charge = service
            .create_charge(draft(&customer, dec!(100), start() + Duration::days(10)), &time)
            .unwrap();

        let err = service
            .register_payment(charge.id, dec!(50), PaymentMethod::Pix, &time)
            .unwrap_err();
        assert!(matches!(err, BillingError::InvalidAmount { .. }));

        let view = service.charge(charge.id, &time).unwrap();
        assert_eq!(view.charge.status, ChargeStatus::Pendente);
        assert!(service
            .events
            .events()
            .iter()
            .any(|e| matches!(e, Event::PaymentRejected { .. })));
    }

    #[test]
    fn test_quote_after_payment_conflicts() {
        let (mut service, time, customer) = service_at(start());
        let charge = service
            .create_charge(draft(&customer, dec!(100), start() + Duration::days(10)), &time)
            .unwrap();
        service
            .register_payment(charge.id, dec!(100), PaymentMethod::Pix, &time)
            .unwrap();

        let err = service.payment_quote(charge.id, &time).unwrap_err();
        assert!(matches!(err, BillingError::AlreadyPaid { .. }));
    }

    #[test]
    fn test_cancel_then_pay_is_rejected() {
        let (mut service, time, customer) = service_at(start());
        let charge = service
            .create_charge(draft(&customer, dec!(100), start() + Duration::days(10)), &time)
            .unwrap();

        service.cancel_charge(charge.id, &time).unwrap();
        let err = service
            .register_payment(charge.id, dec!(100), PaymentMethod::Pix, &time)
            .unwrap_err();

        assert!(matches!(
            err,
            BillingError::NotPayable {
                status: ChargeStatus::Cancelado
            }
        ));
    }

    #[test]
    fn test_cancel_twice_is_rejected() {
        let (mut service, time, customer) = service_at(start());
        let charge = service
            .create_charge(draft(&customer, dec!(100), start() + Duration::days(10)), &time)
            .unwrap();

        service.cancel_charge(charge.id, &time).unwrap();
        let err = service.cancel_charge(charge.id, &time).unwrap_err();

        assert!(matches!(err, BillingError::InvalidStatus { .. }));
    }

    #[test]
    fn test_correct_charge_before_payment() {
        let (mut service, time, customer) = service_at(start());
        let charge = service
            .create_charge(draft(&customer, dec!(100), start() + Duration::days(10)), &time)
            .unwrap();

        let patch = ChargePatch {
            amount: Some(dec!(150.75)),
            due_date: None,
        };
        let updated = service.correct_charge(charge.id, &patch, &time).unwrap();
        assert_eq!(updated.amount, Money::from_str_exact("150.75").unwrap());
        assert_eq!(updated.due_date, charge.due_date);
    }

    #[test]
    fn test_correct_paid_charge_is_rejected() {
        let (mut service, time, customer) = service_at(start());
        let charge = service
            .create_charge(draft(&customer, dec!(100), start() + Duration::days(10)), &time)
            .unwrap();
        service
            .register_payment(charge.id, dec!(100), PaymentMethod::Pix, &time)
            .unwrap();

        let patch = ChargePatch {
            amount: Some(dec!(1)),
            due_date: None,
        };
        let err = service.correct_charge(charge.id, &patch, &time).unwrap_err();
        assert!(matches!(
            err,
            BillingError::InvalidStatus {
                current: ChargeStatus::Pago,
                ..
            }
        ));
    }

    #[test]
    fn test_listing_filters_and_paginates() {
        let (mut service, time, customer) = service_at(start());
        let control = time.test_control().unwrap();

        // three charges: one due soon, one due later, one already due
        let soon = service
            .create_charge(draft(&customer, dec!(10), start() + Duration::days(5)), &time)
            .unwrap();
        let later = service
            .create_charge(draft(&customer, dec!(20), start() + Duration::days(60)), &time)
            .unwrap();
        let due_now = service
            .create_charge(draft(&customer, dec!(30), start() + Duration::days(1)), &time)
            .unwrap();

        // two days on, the third charge reads as overdue
        control.advance(Duration::days(2));

        let all = service.list_charges(&ChargeFilter::default(), PageRequest::default(), &time);
        assert_eq!(all.total, 3);
        assert_eq!(all.total_pages, 1);
        // ordered by due date
        assert_eq!(all.data[0].charge.id, due_now.id);
        assert_eq!(all.data[0].status, ChargeStatus::Vencido);
        assert_eq!(all.data[1].charge.id, soon.id);
        assert_eq!(all.data[2].charge.id, later.id);

        let overdue_only = service.list_charges(
            &ChargeFilter {
                status: Some(ChargeStatus::Vencido),
                ..Default::default()
            },
            PageRequest::default(),
            &time,
        );
        assert_eq!(overdue_only.total, 1);
        assert_eq!(overdue_only.data[0].charge.id, due_now.id);

        let paged = service.list_charges(
            &ChargeFilter::default(),
            PageRequest { page: 2, limit: 2 },
            &time,
        );
        assert_eq!(paged.total, 3);
        assert_eq!(paged.total_pages, 2);
        assert_eq!(paged.data.len(), 1);
        assert_eq!(paged.data[0].charge.id, later.id);
    }

    #[test]
    fn test_statistics_by_displayed_status() {
        let (mut service, time, customer) = service_at(start());
        let control = time.test_control().unwrap();

        let paid = service
            .create_charge(draft(&customer, dec!(100), start() + Duration::days(5)), &time)
            .unwrap();
        service
            .register_payment(paid.id, dec!(100), PaymentMethod::Pix, &time)
            .unwrap();

        let cancelled = service
            .create_charge(draft(&customer, dec!(40), start() + Duration::days(5)), &time)
            .unwrap();
        service.cancel_charge(cancelled.id, &time).unwrap();

        service
            .create_charge(draft(&customer, dec!(50), start() + Duration::days(1)), &time)
            .unwrap();
        service
            .create_charge(draft(&customer, dec!(60), start() + Duration::days(30)), &time)
            .unwrap();

        // overdue line: the 50 charge is now past due
        control.advance(Duration::days(3));
        let stats = service.statistics(&time);

        assert_eq!(stats.total, 4);
        assert_eq!(stats.paid, 1);
        assert_eq!(stats.cancelled, 1);
        assert_eq!(stats.overdue, 1);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.total_amount, Money::from_major(250));
        assert_eq!(stats.pending_amount, Money::from_major(110));
        assert_eq!(stats.amount_paid, Money::from_major(100));
    }

    #[test]
    fn test_payments_listing_most_recent_first() {
        let (mut service, time, customer) = service_at(start());
        let control = time.test_control().unwrap();

        let first = service
            .create_charge(draft(&customer, dec!(10), start() + Duration::days(5)), &time)
            .unwrap();
        service
            .register_payment(first.id, dec!(10), PaymentMethod::Pix, &time)
            .unwrap();

        control.advance(Duration::days(1));
        let second = service
            .create_charge(draft(&customer, dec!(20), start() + Duration::days(5)), &time)
            .unwrap();
        service
            .register_payment(second.id, dec!(20), PaymentMethod::Boleto, &time)
            .unwrap();

        let payments = service.payments();
        assert_eq!(payments.len(), 2);
        assert_eq!(payments[0].charge_id, second.id);
        assert_eq!(payments[1].charge_id, first.id);
    }
}
