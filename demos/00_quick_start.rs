/// quick start - plan a schedule and allocate a payment without a loan aggregate
use installment_loans_rs::chrono::NaiveDate;
use installment_loans_rs::{allocate, plan, CurrencyCode, Money, ScheduledInstallment, Uuid};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("bad date")?;
    let usd = CurrencyCode::parse("USD")?;

    // $10.00 over three months
    let planned = plan(Money::from_minor(1000), 3, start)?;
    for row in &planned {
        println!("#{} due {}: {}", row.sequence, row.due_date, row.amount);
    }

    let loan_id = Uuid::new_v4();
    let installments: Vec<ScheduledInstallment> = planned
        .iter()
        .map(|p| ScheduledInstallment::from_planned(loan_id, usd.clone(), p))
        .collect();

    // a payment that covers the first installment and part of the second
    let allocation = allocate(&installments, Money::from_minor(400))?;
    for application in &allocation.applications {
        println!(
            "applied {} to #{} ({:?} -> {:?})",
            application.applied,
            application.sequence,
            application.old_status,
            application.new_status
        );
    }
    println!("loan outstanding: {} ({:?})", allocation.loan_outstanding, allocation.loan_status);

    Ok(())
}
