use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::{CurrencyCode, Money};
use crate::types::{InstallmentId, InstallmentStatus, LoanId, LoanStatus, RepaymentId};

/// all events that can be emitted by a loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // lifecycle events
    LoanOriginated {
        loan_id: LoanId,
        borrower_id: String,
        principal: Money,
        currency: CurrencyCode,
        terms: u32,
        processed_at: NaiveDate,
        timestamp: DateTime<Utc>,
    },
    InstallmentScheduled {
        loan_id: LoanId,
        installment_id: InstallmentId,
        sequence: u32,
        amount: Money,
        due_date: NaiveDate,
    },
    LoanRepaid {
        loan_id: LoanId,
        final_repayment_id: RepaymentId,
        timestamp: DateTime<Utc>,
    },

    // repayment events
    RepaymentReceived {
        loan_id: LoanId,
        repayment_id: RepaymentId,
        amount: Money,
        applied: Money,
        unapplied: Money,
        timestamp: DateTime<Utc>,
    },
    InstallmentPaymentApplied {
        loan_id: LoanId,
        installment_id: InstallmentId,
        applied: Money,
        outstanding: Money,
        old_status: InstallmentStatus,
        new_status: InstallmentStatus,
    },
    OverpaymentUnapplied {
        loan_id: LoanId,
        repayment_id: RepaymentId,
        amount: Money,
        timestamp: DateTime<Utc>,
    },

    // status change events
    StatusChanged {
        loan_id: LoanId,
        old_status: LoanStatus,
        new_status: LoanStatus,
        reason: String,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
