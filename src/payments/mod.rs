pub mod amortization;
pub mod waterfall;

use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};

use crate::errors::{LoanError, Result};
use crate::money::{CurrencyCode, Money};

pub use amortization::{plan, AmortizationPlanner, AmortizationSchedule, PlannedInstallment};
pub use waterfall::{allocate, Allocation, InstallmentApplication, RepaymentAllocator};

/// incoming repayment as handed over by the payment-ingestion workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepaymentRequest {
    pub amount: Money,
    pub currency: CurrencyCode,
    /// recorded on the receipt, never used in the arithmetic
    pub received_at: DateTime<Utc>,
}

impl RepaymentRequest {
    pub fn new(amount: Money, currency: CurrencyCode, received_at: DateTime<Utc>) -> Self {
        Self {
            amount,
            currency,
            received_at,
        }
    }

    /// stamp the request with the provider's current time
    pub fn received_now(
        amount: Money,
        currency: CurrencyCode,
        time_provider: &SafeTimeProvider,
    ) -> Self {
        Self::new(amount, currency, time_provider.now())
    }

    /// check amount and currency against the loan being repaid
    pub fn validate_for(&self, loan_currency: &CurrencyCode) -> Result<()> {
        if &self.currency != loan_currency {
            return Err(LoanError::CurrencyMismatch {
                expected: loan_currency.clone(),
                provided: self.currency.clone(),
            });
        }

        if !self.amount.is_positive() {
            return Err(LoanError::InvalidAmount { amount: self.amount });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hourglass_rs::TimeSource;

    #[test]
    fn test_repayment_request_validation() {
        let usd = CurrencyCode::parse("USD").unwrap();
        let gbp = CurrencyCode::parse("GBP").unwrap();
        let time = SafeTimeProvider::new(TimeSource::Test(Utc::now()));

        let request = RepaymentRequest::received_now(Money::from_minor(500), usd.clone(), &time);
        assert_eq!(request.received_at, time.now());
        assert!(request.validate_for(&usd).is_ok());

        assert_eq!(
            request.validate_for(&gbp),
            Err(LoanError::CurrencyMismatch { expected: gbp, provided: usd.clone() })
        );

        let zero = RepaymentRequest::received_now(Money::ZERO, usd.clone(), &time);
        assert_eq!(zero.validate_for(&usd), Err(LoanError::InvalidAmount { amount: Money::ZERO }));
    }
}
