/// lifecycle - originate a loan, repay it in pieces, then overpay the rest
use installment_loans_rs::chrono::{NaiveDate, TimeZone, Utc};
use installment_loans_rs::{Event, EventStore, Loan, Money, SafeTimeProvider, TimeSource};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let now = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).single().ok_or("bad time")?;
    let time = SafeTimeProvider::new(TimeSource::Test(now));
    let mut events = EventStore::new();

    let mut loan = Loan::builder()
        .principal(Money::from_minor(120_000))
        .currency("EUR")
        .terms(12)
        .processed_at(NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("bad date")?)
        .borrower("customer-42")
        .build(&time, &mut events)?;

    for amount in [10_000, 10_000, 5_000] {
        let outcome = loan.apply_repayment_now(Money::from_minor(amount), &time, &mut events)?;
        println!("paid {}, outstanding {}", amount, outcome.outstanding);
    }

    let as_of = NaiveDate::from_ymd_opt(2024, 6, 15).ok_or("bad date")?;
    println!("arrears on {}: {}", as_of, loan.arrears(as_of)?);

    let outcome = loan.apply_repayment_now(Money::from_minor(100_000), &time, &mut events)?;
    println!(
        "final payment applied {}, returned {}, status {:?}",
        outcome.receipt.applied, outcome.receipt.unapplied, outcome.status
    );

    let repaid = events
        .events()
        .iter()
        .any(|e| matches!(e, Event::LoanRepaid { .. }));
    println!("{} events recorded, loan repaid: {}", events.len(), repaid);

    Ok(())
}
