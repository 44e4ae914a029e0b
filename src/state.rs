use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money::{CurrencyCode, Money};
use crate::payments::amortization::PlannedInstallment;
use crate::types::{InstallmentId, InstallmentStatus, LoanId, RepaymentId};

/// one installment of a loan's repayment schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledInstallment {
    pub id: InstallmentId,
    pub loan_id: LoanId,
    /// 1-based creation order, breaks due-date ties
    pub sequence: u32,
    pub currency: CurrencyCode,
    /// original amount due
    pub amount: Money,
    /// accumulated payments, never decreases
    pub paid: Money,
    pub due_date: NaiveDate,
    pub status: InstallmentStatus,
}

impl ScheduledInstallment {
    /// attach a planned row to a loan
    pub fn from_planned(
        loan_id: LoanId,
        currency: CurrencyCode,
        planned: &PlannedInstallment,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            loan_id,
            sequence: planned.sequence,
            currency,
            amount: planned.amount,
            paid: Money::ZERO,
            due_date: planned.due_date,
            status: InstallmentStatus::from_progress(Money::ZERO, planned.amount),
        }
    }

    /// amount still owed on this installment
    pub fn outstanding(&self) -> Money {
        (self.amount - self.paid).max(Money::ZERO)
    }

    pub fn is_settled(&self) -> bool {
        self.outstanding().is_zero()
    }

    /// unsettled and due strictly before `as_of`
    pub fn is_overdue(&self, as_of: NaiveDate) -> bool {
        !self.is_settled() && self.due_date < as_of
    }

    /// apply up to `available` to this installment, returning what was taken
    pub(crate) fn apply(&mut self, available: Money) -> Money {
        let applied = self.outstanding().min(available).max(Money::ZERO);
        self.paid += applied;
        self.status = InstallmentStatus::from_progress(self.paid, self.amount);
        applied
    }
}

/// immutable receipt of one incoming repayment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceivedRepayment {
    pub id: RepaymentId,
    pub loan_id: LoanId,
    pub amount: Money,
    pub currency: CurrencyCode,
    pub received_at: DateTime<Utc>,
    /// portion of `amount` that reached an installment
    pub applied: Money,
    /// surplus handed back to the caller
    pub unapplied: Money,
}
