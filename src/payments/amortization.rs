use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{LoanError, Result};
use crate::money::Money;
use crate::types::RemainderPlacement;

/// one row of a planned schedule, before it is attached to a loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedInstallment {
    /// 1-based position in the schedule
    pub sequence: u32,
    pub amount: Money,
    pub due_date: NaiveDate,
}

/// splits a principal into even monthly installments
#[derive(Debug, Clone, Copy, Default)]
pub struct AmortizationPlanner {
    placement: RemainderPlacement,
}

impl AmortizationPlanner {
    pub fn new(placement: RemainderPlacement) -> Self {
        Self { placement }
    }

    /// plan `terms` installments summing exactly to `principal`.
    ///
    /// Every installment gets `principal / terms`; the `principal % terms`
    /// leftover units go one each to the leading or trailing installments,
    /// so amounts never differ by more than one minor unit. Installment `i`
    /// is due `i + 1` calendar months after `start_date`, clamped to the
    /// last day of the month when the start day does not exist there.
    pub fn plan(
        &self,
        principal: Money,
        terms: u32,
        start_date: NaiveDate,
    ) -> Result<Vec<PlannedInstallment>> {
        if terms == 0 {
            return Err(LoanError::InvalidTerms { terms });
        }
        if principal.is_negative() {
            return Err(LoanError::InvalidAmount { amount: principal });
        }

        let count = i64::from(terms);
        let base = principal.minor() / count;
        let remainder = principal.minor() % count;

        debug!(
            principal = principal.minor(),
            terms,
            base,
            remainder,
            placement = ?self.placement,
            "planning installment schedule"
        );

        // the last due date bounds every earlier one
        add_months(start_date, terms)?;

        let mut installments = Vec::with_capacity(terms as usize);
        for i in 0..count {
            let carries_extra = match self.placement {
                RemainderPlacement::Leading => i < remainder,
                RemainderPlacement::Trailing => i >= count - remainder,
            };
            let amount = if carries_extra { base + 1 } else { base };
            let sequence = (i + 1) as u32;

            installments.push(PlannedInstallment {
                sequence,
                amount: Money::from_minor(amount),
                due_date: add_months(start_date, sequence)?,
            });
        }

        Ok(installments)
    }
}

/// plan with the default leading remainder placement
pub fn plan(
    principal: Money,
    terms: u32,
    start_date: NaiveDate,
) -> Result<Vec<PlannedInstallment>> {
    AmortizationPlanner::default().plan(principal, terms, start_date)
}

/// planned schedule together with the inputs that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub principal: Money,
    pub terms: u32,
    pub start_date: NaiveDate,
    pub placement: RemainderPlacement,
    pub installments: Vec<PlannedInstallment>,
}

impl AmortizationSchedule {
    /// generate payment schedule
    pub fn generate(
        principal: Money,
        terms: u32,
        start_date: NaiveDate,
        placement: RemainderPlacement,
    ) -> Result<Self> {
        let installments = AmortizationPlanner::new(placement).plan(principal, terms, start_date)?;

        Ok(Self {
            principal,
            terms,
            start_date,
            placement,
            installments,
        })
    }

    /// get installment by 1-based sequence number
    pub fn installment(&self, sequence: u32) -> Option<&PlannedInstallment> {
        sequence
            .checked_sub(1)
            .and_then(|idx| self.installments.get(idx as usize))
    }

    pub fn total(&self) -> Money {
        self.installments.iter().map(|i| i.amount).sum()
    }

    /// due date of the last installment
    pub fn maturity_date(&self) -> Option<NaiveDate> {
        self.installments.last().map(|i| i.due_date)
    }

    /// spread between the largest and smallest installment
    pub fn spread(&self) -> Money {
        let max = self.installments.iter().map(|i| i.amount).max();
        let min = self.installments.iter().map(|i| i.amount).min();
        match (max, min) {
            (Some(max), Some(min)) => max - min,
            _ => Money::ZERO,
        }
    }
}

/// add calendar months, clamping to month end
pub(crate) fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| LoanError::InvalidDate {
            message: format!("{} plus {} months is out of range", date, months),
        })
}
