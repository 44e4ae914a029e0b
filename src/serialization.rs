/// serialization support for loans
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::loan::Loan;
use crate::money::Money;
use crate::types::{InstallmentStatus, LoanId, LoanStatus, RepaymentId};

/// serializable view of a loan's state
#[derive(Debug, Serialize, Deserialize)]
pub struct LoanView {
    pub id: LoanId,
    pub borrower_id: String,
    pub status: LoanStatus,
    pub currency: String,
    pub processed_at: NaiveDate,
    pub financial: FinancialView,
    pub schedule: Vec<InstallmentView>,
    pub repayments: Vec<RepaymentView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FinancialView {
    pub principal: Money,
    pub outstanding: Money,
    pub total_paid: Money,
    pub total_received: Money,
    /// the same figures in major units
    pub principal_major: Decimal,
    pub outstanding_major: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InstallmentView {
    pub sequence: u32,
    pub due_date: NaiveDate,
    pub amount: Money,
    pub paid: Money,
    pub outstanding: Money,
    pub status: InstallmentStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RepaymentView {
    pub id: RepaymentId,
    pub amount: Money,
    pub applied: Money,
    pub unapplied: Money,
    pub received_at: DateTime<Utc>,
}

impl LoanView {
    pub fn from_loan(loan: &Loan) -> Result<Self> {
        Ok(LoanView {
            id: loan.id,
            borrower_id: loan.borrower_id.clone(),
            status: loan.status,
            currency: loan.currency.to_string(),
            processed_at: loan.processed_at,
            financial: FinancialView {
                principal: loan.principal,
                outstanding: loan.outstanding,
                total_paid: loan.total_paid()?,
                total_received: loan.total_received()?,
                principal_major: loan.principal.to_major(&loan.currency),
                outstanding_major: loan.outstanding.to_major(&loan.currency),
            },
            schedule: loan
                .installments
                .iter()
                .map(|i| InstallmentView {
                    sequence: i.sequence,
                    due_date: i.due_date,
                    amount: i.amount,
                    paid: i.paid,
                    outstanding: i.outstanding(),
                    status: i.status,
                })
                .collect(),
            repayments: loan
                .repayments
                .iter()
                .map(|r| RepaymentView {
                    id: r.id,
                    amount: r.amount,
                    applied: r.applied,
                    unapplied: r.unapplied,
                    received_at: r.received_at,
                })
                .collect(),
        })
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
