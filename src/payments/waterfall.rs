use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::{LoanError, Result};
use crate::money::{CurrencyCode, Money};
use crate::state::ScheduledInstallment;
use crate::types::{InstallmentId, InstallmentStatus, LoanStatus};

/// how much of a payment one installment absorbed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentApplication {
    pub installment_id: InstallmentId,
    pub sequence: u32,
    pub due_date: NaiveDate,
    pub applied: Money,
    pub outstanding_after: Money,
    pub old_status: InstallmentStatus,
    pub new_status: InstallmentStatus,
}

/// result of running one payment through the schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    /// installments after the payment, in the order they were supplied
    pub installments: Vec<ScheduledInstallment>,
    /// touched installments, in the order they were paid
    pub applications: Vec<InstallmentApplication>,
    pub payment: Money,
    pub total_applied: Money,
    pub remainder_unapplied: Money,
    pub loan_outstanding: Money,
    pub loan_status: LoanStatus,
}

impl Allocation {
    pub fn is_overpaid(&self) -> bool {
        self.remainder_unapplied.is_positive()
    }
}

/// earliest-due-first repayment waterfall
#[derive(Debug, Clone, Copy, Default)]
pub struct RepaymentAllocator;

impl RepaymentAllocator {
    pub fn new() -> Self {
        Self
    }

    /// allocate a payment across installments by ascending due date.
    ///
    /// The input is left untouched; the updated installments come back in
    /// the returned [`Allocation`]. Settled installments are skipped, each
    /// other one takes `min(outstanding, remaining)`, and whatever is left
    /// after the last installment is reported as `remainder_unapplied`.
    pub fn allocate(
        &self,
        installments: &[ScheduledInstallment],
        payment: Money,
    ) -> Result<Allocation> {
        if !payment.is_positive() {
            return Err(LoanError::InvalidAmount { amount: payment });
        }
        for installment in installments {
            if installment.amount.is_negative() {
                return Err(LoanError::InvalidAmount { amount: installment.amount });
            }
            if installment.paid.is_negative() {
                return Err(LoanError::InvalidAmount { amount: installment.paid });
            }
        }

        let mut updated = installments.to_vec();

        // stable, so equal (due_date, sequence) pairs keep input order
        let mut order: Vec<usize> = (0..updated.len()).collect();
        order.sort_by_key(|&idx| (updated[idx].due_date, updated[idx].sequence));

        let mut remaining = payment;
        let mut applications = Vec::new();

        for idx in order {
            if remaining.is_zero() {
                break;
            }

            let installment = &mut updated[idx];
            if installment.is_settled() {
                continue;
            }

            let old_status = installment.status;
            let applied = installment.apply(remaining);
            remaining -= applied;

            debug!(
                installment = %installment.id,
                sequence = installment.sequence,
                applied = applied.minor(),
                outstanding = installment.outstanding().minor(),
                status = ?installment.status,
                "applied payment to installment"
            );

            applications.push(InstallmentApplication {
                installment_id: installment.id,
                sequence: installment.sequence,
                due_date: installment.due_date,
                applied,
                outstanding_after: installment.outstanding(),
                old_status,
                new_status: installment.status,
            });
        }

        let loan_outstanding = Money::checked_sum(updated.iter().map(|i| i.outstanding()))?;
        let loan_status = LoanStatus::from_outstanding(loan_outstanding);

        info!(
            payment = payment.minor(),
            applied = (payment - remaining).minor(),
            unapplied = remaining.minor(),
            loan_outstanding = loan_outstanding.minor(),
            "allocated repayment"
        );

        Ok(Allocation {
            installments: updated,
            applications,
            payment,
            total_applied: payment - remaining,
            remainder_unapplied: remaining,
            loan_outstanding,
            loan_status,
        })
    }

    /// allocate a payment made in `currency`, rejecting any installment
    /// denominated in another currency
    pub fn allocate_in(
        &self,
        installments: &[ScheduledInstallment],
        payment: Money,
        currency: &CurrencyCode,
    ) -> Result<Allocation> {
        if let Some(other) = installments.iter().find(|i| &i.currency != currency) {
            return Err(LoanError::CurrencyMismatch {
                expected: other.currency.clone(),
                provided: currency.clone(),
            });
        }
        self.allocate(installments, payment)
    }
}

/// allocate with the default allocator
pub fn allocate(installments: &[ScheduledInstallment], payment: Money) -> Result<Allocation> {
    RepaymentAllocator::new().allocate(installments, payment)
}
