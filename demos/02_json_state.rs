/// json state - load origination terms from json and print the loan view
use installment_loans_rs::{EventStore, Loan, LoanConfig, Money, SafeTimeProvider, TimeSource};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = LoanConfig::from_json(
        r#"{
            "principal": 100001,
            "currency": "jpy",
            "terms": 6,
            "processed_at": "2024-01-31",
            "remainder_placement": "Trailing"
        }"#,
    )?;

    let time = SafeTimeProvider::new(TimeSource::System);
    let mut events = EventStore::new();
    let mut loan = Loan::originate(config, "customer-7", &time, &mut events)?;

    loan.apply_repayment_now(Money::from_minor(20_000), &time, &mut events)?;

    println!("{}", loan.json());

    Ok(())
}
