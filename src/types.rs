use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money::Money;

/// unique identifier for a loan
pub type LoanId = Uuid;

/// unique identifier for a scheduled installment
pub type InstallmentId = Uuid;

/// unique identifier for a received repayment
pub type RepaymentId = Uuid;

/// loan status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanStatus {
    /// some installment still has an outstanding amount
    Due,
    /// every installment is settled
    Repaid,
}

impl LoanStatus {
    /// status implied by the loan's outstanding amount
    pub fn from_outstanding(outstanding: Money) -> Self {
        if outstanding.is_positive() {
            LoanStatus::Due
        } else {
            LoanStatus::Repaid
        }
    }
}

/// scheduled installment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstallmentStatus {
    /// nothing paid yet
    Due,
    /// paid-so-far strictly between zero and the amount
    Partial,
    /// fully settled, terminal
    Paid,
}

impl InstallmentStatus {
    pub fn from_progress(paid: Money, amount: Money) -> Self {
        if paid >= amount {
            InstallmentStatus::Paid
        } else if paid.is_positive() {
            InstallmentStatus::Partial
        } else {
            InstallmentStatus::Due
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, InstallmentStatus::Paid)
    }
}

/// which installments carry the extra minor unit when the principal
/// does not divide evenly by the term count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RemainderPlacement {
    /// the first `remainder` installments are one unit larger
    #[default]
    Leading,
    /// the last `remainder` installments are one unit larger
    Trailing,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_installment_status_from_progress() {
        let amount = Money::from_minor(333);
        let status = |paid: i64| InstallmentStatus::from_progress(Money::from_minor(paid), amount);

        assert_eq!(status(0), InstallmentStatus::Due);
        assert_eq!(status(1), InstallmentStatus::Partial);
        assert_eq!(status(333), InstallmentStatus::Paid);

        // nothing owed means nothing left to pay
        assert_eq!(
            InstallmentStatus::from_progress(Money::ZERO, Money::ZERO),
            InstallmentStatus::Paid
        );
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_string(&LoanStatus::Repaid).unwrap(), "\"REPAID\"");
        assert_eq!(serde_json::to_string(&InstallmentStatus::Partial).unwrap(), "\"PARTIAL\"");
        assert_eq!(LoanStatus::from_outstanding(Money::ZERO), LoanStatus::Repaid);
        assert_eq!(LoanStatus::from_outstanding(Money::from_minor(1)), LoanStatus::Due);
    }
}
