/// quick start - open a charge and settle it before the due date
use chrono::{Duration, TimeZone, Utc};
use cobranca_rs::{
    BillingService, ChargeDraft, Decimal, MemoryStore, PaymentMethod, SafeTimeProvider, TimeSource,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2026, 1, 2, 9, 0, 0).unwrap(),
    ));

    let mut billing = BillingService::new(MemoryStore::new());
    let customer = billing.register_customer("Maria Souza".to_string(), "123.456.789-00".to_string());

    // R$ 100.00 due in ten days
    let charge = billing.create_charge(
        ChargeDraft {
            customer_id: customer.id,
            amount: Decimal::from(100),
            due_date: time.now() + Duration::days(10),
        },
        &time,
    )?;
    println!("charge {} opened, status {}", charge.id, charge.status);

    // pay the face amount while still pending
    let payment = billing.register_payment(charge.id, Decimal::from(100), PaymentMethod::Pix, &time)?;
    println!("settled by payment {} via {}", payment.id, payment.method);

    let view = billing.charge(charge.id, &time)?;
    println!("final status: {}", view.status);

    Ok(())
}
