/// overdue settlement - interest accrues while time advances
use chrono::{Duration, TimeZone, Utc};
use cobranca_rs::{
    BillingService, ChargeDraft, Decimal, MemoryStore, PaymentMethod, SafeTimeProvider, TimeSource,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2026, 1, 2, 9, 0, 0).unwrap(),
    ));
    let control = time.test_control().unwrap();

    let mut billing = BillingService::new(MemoryStore::new());
    let customer = billing.register_customer("João Lima".to_string(), "987.654.321-00".to_string());

    let charge = billing.create_charge(
        ChargeDraft {
            customer_id: customer.id,
            amount: Decimal::from(100),
            due_date: Utc.with_ymd_and_hms(2026, 1, 12, 0, 0, 0).unwrap(),
        },
        &time,
    )?;

    // jump 30 days past the due date
    control.advance(Duration::days(40));
    let view = billing.charge(charge.id, &time)?;
    println!("status now reads {}", view.status);

    let quote = billing.payment_quote(charge.id, &time)?;
    println!(
        "expected {} ({} original + {} interest, {} months overdue)",
        quote.total_amount, quote.original_amount, quote.interest, quote.months_overdue
    );

    // the face amount no longer settles
    match billing.register_payment(charge.id, Decimal::from(100), PaymentMethod::Boleto, &time) {
        Err(err) => println!("face amount rejected: {}", err),
        Ok(_) => unreachable!(),
    }

    // the interest-adjusted total does
    let payment = billing.register_payment(
        charge.id,
        quote.total_amount.as_decimal(),
        PaymentMethod::Boleto,
        &time,
    )?;
    println!("settled with {} via {}", payment.amount, payment.method);

    Ok(())
}
