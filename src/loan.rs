use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::config::LoanConfig;
use crate::errors::{LoanError, Result};
use crate::events::{Event, EventStore};
use crate::money::{CurrencyCode, Money};
use crate::payments::{InstallmentApplication, RepaymentAllocator, RepaymentRequest};
use crate::state::{ReceivedRepayment, ScheduledInstallment};
use crate::types::{LoanId, LoanStatus, RemainderPlacement};

/// installment loan with its schedule and repayment receipts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub borrower_id: String,
    pub principal: Money,
    pub currency: CurrencyCode,
    pub terms: u32,
    pub processed_at: NaiveDate,
    pub outstanding: Money,
    pub status: LoanStatus,
    pub installments: Vec<ScheduledInstallment>,
    pub repayments: Vec<ReceivedRepayment>,
}

/// what one repayment did to the loan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepaymentOutcome {
    pub receipt: ReceivedRepayment,
    pub applications: Vec<InstallmentApplication>,
    pub outstanding: Money,
    pub status: LoanStatus,
}

impl Loan {
    /// originate a loan and its full schedule in one step
    pub fn originate(
        config: LoanConfig,
        borrower_id: impl Into<String>,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Result<Self> {
        let schedule = config.schedule()?;
        let loan_id = Uuid::new_v4();

        let installments: Vec<ScheduledInstallment> = schedule
            .installments
            .iter()
            .map(|planned| {
                ScheduledInstallment::from_planned(loan_id, config.currency.clone(), planned)
            })
            .collect();
        let outstanding = Money::checked_sum(installments.iter().map(|i| i.outstanding()))?;

        let loan = Self {
            id: loan_id,
            borrower_id: borrower_id.into(),
            principal: config.principal,
            currency: config.currency,
            terms: config.terms,
            processed_at: config.processed_at,
            outstanding,
            status: LoanStatus::from_outstanding(outstanding),
            installments,
            repayments: Vec::new(),
        };

        events.emit(Event::LoanOriginated {
            loan_id,
            borrower_id: loan.borrower_id.clone(),
            principal: loan.principal,
            currency: loan.currency.clone(),
            terms: loan.terms,
            processed_at: loan.processed_at,
            timestamp: time_provider.now(),
        });
        for installment in &loan.installments {
            events.emit(Event::InstallmentScheduled {
                loan_id,
                installment_id: installment.id,
                sequence: installment.sequence,
                amount: installment.amount,
                due_date: installment.due_date,
            });
        }

        info!(
            loan = %loan_id,
            principal = loan.principal.minor(),
            currency = %loan.currency,
            terms = loan.terms,
            "originated loan"
        );

        Ok(loan)
    }

    /// builder for creating loans
    pub fn builder() -> LoanBuilder {
        LoanBuilder::new()
    }

    /// apply a received repayment earliest-due-first.
    ///
    /// Nothing on the loan changes unless the whole allocation succeeds. A
    /// receipt is recorded for every accepted repayment, including ones
    /// that leave a surplus; the surplus is reported, not kept.
    pub fn apply_repayment(
        &mut self,
        request: RepaymentRequest,
        events: &mut EventStore,
    ) -> Result<RepaymentOutcome> {
        request.validate_for(&self.currency)?;

        let allocation = RepaymentAllocator::new().allocate_in(
            &self.installments,
            request.amount,
            &request.currency,
        )?;

        let receipt = ReceivedRepayment {
            id: Uuid::new_v4(),
            loan_id: self.id,
            amount: request.amount,
            currency: request.currency,
            received_at: request.received_at,
            applied: allocation.total_applied,
            unapplied: allocation.remainder_unapplied,
        };

        let old_status = self.status;
        self.installments = allocation.installments;
        self.outstanding = allocation.loan_outstanding;
        self.status = allocation.loan_status;
        self.repayments.push(receipt.clone());

        events.emit(Event::RepaymentReceived {
            loan_id: self.id,
            repayment_id: receipt.id,
            amount: receipt.amount,
            applied: receipt.applied,
            unapplied: receipt.unapplied,
            timestamp: receipt.received_at,
        });
        for application in &allocation.applications {
            events.emit(Event::InstallmentPaymentApplied {
                loan_id: self.id,
                installment_id: application.installment_id,
                applied: application.applied,
                outstanding: application.outstanding_after,
                old_status: application.old_status,
                new_status: application.new_status,
            });
        }
        if receipt.unapplied.is_positive() {
            events.emit(Event::OverpaymentUnapplied {
                loan_id: self.id,
                repayment_id: receipt.id,
                amount: receipt.unapplied,
                timestamp: receipt.received_at,
            });
        }
        if old_status != self.status {
            events.emit(Event::StatusChanged {
                loan_id: self.id,
                old_status,
                new_status: self.status,
                reason: "outstanding amount settled".to_string(),
                timestamp: receipt.received_at,
            });
            if self.status == LoanStatus::Repaid {
                events.emit(Event::LoanRepaid {
                    loan_id: self.id,
                    final_repayment_id: receipt.id,
                    timestamp: receipt.received_at,
                });
            }
        }

        Ok(RepaymentOutcome {
            receipt,
            applications: allocation.applications,
            outstanding: self.outstanding,
            status: self.status,
        })
    }

    /// apply a repayment in the loan's currency received now
    pub fn apply_repayment_now(
        &mut self,
        amount: Money,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Result<RepaymentOutcome> {
        let request = RepaymentRequest::received_now(amount, self.currency.clone(), time_provider);
        self.apply_repayment(request, events)
    }

    pub fn is_repaid(&self) -> bool {
        self.status == LoanStatus::Repaid
    }

    /// total applied to installments so far
    pub fn total_paid(&self) -> Result<Money> {
        Money::checked_sum(self.installments.iter().map(|i| i.paid))
    }

    /// total of all receipts, including unapplied surplus
    pub fn total_received(&self) -> Result<Money> {
        Money::checked_sum(self.repayments.iter().map(|r| r.amount))
    }

    /// earliest unsettled installment
    pub fn next_due_installment(&self) -> Option<&ScheduledInstallment> {
        self.installments
            .iter()
            .filter(|i| !i.is_settled())
            .min_by_key(|i| (i.due_date, i.sequence))
    }

    /// unsettled installments due before `as_of`, earliest first
    pub fn overdue_installments(&self, as_of: NaiveDate) -> Vec<&ScheduledInstallment> {
        let mut overdue: Vec<&ScheduledInstallment> =
            self.installments.iter().filter(|i| i.is_overdue(as_of)).collect();
        overdue.sort_by_key(|i| (i.due_date, i.sequence));
        overdue
    }

    /// outstanding amount of the overdue installments
    pub fn arrears(&self, as_of: NaiveDate) -> Result<Money> {
        Money::checked_sum(self.overdue_installments(as_of).iter().map(|i| i.outstanding()))
    }

    /// get json representation of current state
    pub fn to_json_pretty(&self) -> String {
        use crate::serialization::LoanView;

        LoanView::from_loan(self)
            .map_err(|e| e.to_string())
            .and_then(|view| view.to_json_pretty().map_err(|e| e.to_string()))
            .unwrap_or_else(|e| format!("JSON error: {}", e))
    }

    /// short alias for json output
    pub fn json(&self) -> String {
        self.to_json_pretty()
    }
}

/// builder for loans
#[derive(Debug, Default)]
pub struct LoanBuilder {
    principal: Option<Money>,
    currency: Option<String>,
    terms: Option<u32>,
    processed_at: Option<NaiveDate>,
    placement: RemainderPlacement,
    borrower_id: Option<String>,
}

impl LoanBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn principal(mut self, principal: Money) -> Self {
        self.principal = Some(principal);
        self
    }

    pub fn currency(mut self, code: &str) -> Self {
        self.currency = Some(code.to_string());
        self
    }

    pub fn terms(mut self, terms: u32) -> Self {
        self.terms = Some(terms);
        self
    }

    pub fn processed_at(mut self, date: NaiveDate) -> Self {
        self.processed_at = Some(date);
        self
    }

    pub fn remainder_placement(mut self, placement: RemainderPlacement) -> Self {
        self.placement = placement;
        self
    }

    pub fn borrower(mut self, borrower_id: impl Into<String>) -> Self {
        self.borrower_id = Some(borrower_id.into());
        self
    }

    /// assemble the origination terms, defaulting the processing date to today
    pub fn config(&self, time_provider: &SafeTimeProvider) -> Result<LoanConfig> {
        let principal = self.principal.ok_or_else(|| missing("principal"))?;
        let currency = self.currency.as_deref().ok_or_else(|| missing("currency"))?;
        let terms = self.terms.ok_or_else(|| missing("terms"))?;
        let processed_at = self
            .processed_at
            .unwrap_or_else(|| time_provider.now().date_naive());

        let config = LoanConfig::new(principal, CurrencyCode::parse(currency)?, terms, processed_at)
            .with_remainder_placement(self.placement);
        config.validate()?;
        Ok(config)
    }

    pub fn build(self, time_provider: &SafeTimeProvider, events: &mut EventStore) -> Result<Loan> {
        let config = self.config(time_provider)?;
        let borrower_id = self.borrower_id.unwrap_or_default();
        Loan::originate(config, borrower_id, time_provider, events)
    }
}

fn missing(field: &str) -> LoanError {
    LoanError::InvalidConfiguration {
        message: format!("{} is required", field),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::InstallmentStatus;
    use chrono::{TimeZone, Utc};
    use hourglass_rs::TimeSource;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn test_time() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()))
    }

    fn sample_loan(events: &mut EventStore) -> Loan {
        Loan::builder()
            .principal(Money::from_minor(1000))
            .currency("USD")
            .terms(3)
            .processed_at(date(2024, 1, 1))
            .borrower("borrower-1")
            .build(&test_time(), events)
            .unwrap()
    }

    #[test]
    fn test_originate_builds_schedule() {
        let mut events = EventStore::new();
        let loan = sample_loan(&mut events);

        assert_eq!(loan.outstanding, Money::from_minor(1000));
        assert_eq!(loan.status, LoanStatus::Due);
        assert_eq!(loan.installments.len(), 3);
        assert!(loan.installments.iter().all(|i| i.loan_id == loan.id));
        assert!(loan.installments.iter().all(|i| i.status == InstallmentStatus::Due));
        assert_eq!(
            loan.installments.iter().map(|i| i.amount).sum::<Money>(),
            loan.principal
        );

        // origination plus one event per installment
        assert_eq!(events.len(), 4);
        assert!(matches!(events.events()[0], Event::LoanOriginated { terms: 3, .. }));
    }

    #[test]
    fn test_repay_first_installment() {
        let mut events = EventStore::new();
        let mut loan = sample_loan(&mut events);
        events.clear();

        let outcome = loan
            .apply_repayment_now(Money::from_minor(334), &test_time(), &mut events)
            .unwrap();

        assert_eq!(outcome.outstanding, Money::from_minor(666));
        assert_eq!(outcome.status, LoanStatus::Due);
        assert_eq!(outcome.receipt.applied, Money::from_minor(334));
        assert_eq!(outcome.receipt.unapplied, Money::ZERO);
        assert_eq!(loan.installments[0].status, InstallmentStatus::Paid);
        assert_eq!(loan.installments[1].status, InstallmentStatus::Due);
        assert_eq!(loan.repayments.len(), 1);
        assert_eq!(loan.next_due_installment().map(|i| i.sequence), Some(2));

        assert!(events
            .events()
            .iter()
            .all(|e| !matches!(e, Event::LoanRepaid { .. } | Event::OverpaymentUnapplied { .. })));
    }

    #[test]
    fn test_overpayment_repays_loan() {
        let mut events = EventStore::new();
        let mut loan = sample_loan(&mut events);
        events.clear();

        let outcome = loan
            .apply_repayment_now(Money::from_minor(1200), &test_time(), &mut events)
            .unwrap();

        assert_eq!(outcome.receipt.unapplied, Money::from_minor(200));
        assert_eq!(loan.outstanding, Money::ZERO);
        assert!(loan.is_repaid());
        assert!(loan.next_due_installment().is_none());
        assert_eq!(loan.total_paid(), Ok(Money::from_minor(1000)));
        assert_eq!(loan.total_received(), Ok(Money::from_minor(1200)));

        let emitted = events.take_events();
        assert!(emitted.iter().any(|e| matches!(
            e,
            Event::OverpaymentUnapplied { amount, .. } if *amount == Money::from_minor(200)
        )));
        assert!(emitted.iter().any(|e| matches!(e, Event::LoanRepaid { .. })));
        assert!(emitted.iter().any(|e| matches!(
            e,
            Event::StatusChanged { old_status: LoanStatus::Due, new_status: LoanStatus::Repaid, .. }
        )));
    }

    #[test]
    fn test_repayment_on_repaid_loan_records_receipt() {
        let mut events = EventStore::new();
        let mut loan = sample_loan(&mut events);
        loan.apply_repayment_now(Money::from_minor(1000), &test_time(), &mut events)
            .unwrap();
        let settled = loan.installments.clone();
        events.clear();

        let outcome = loan
            .apply_repayment_now(Money::from_minor(50), &test_time(), &mut events)
            .unwrap();

        assert!(outcome.applications.is_empty());
        assert_eq!(outcome.receipt.applied, Money::ZERO);
        assert_eq!(outcome.receipt.unapplied, Money::from_minor(50));
        assert_eq!(outcome.status, LoanStatus::Repaid);
        assert_eq!(loan.installments, settled);
        assert_eq!(loan.repayments.len(), 2);
        assert_eq!(loan.repayments[1], outcome.receipt);

        let emitted = events.take_events();
        assert_eq!(emitted.len(), 2);
        assert!(matches!(emitted[0], Event::RepaymentReceived { .. }));
        assert!(matches!(emitted[1], Event::OverpaymentUnapplied { .. }));
    }

    #[test]
    fn test_receipt_totals_report_overflow() {
        let mut events = EventStore::new();
        let mut loan = sample_loan(&mut events);

        for _ in 0..2 {
            loan.apply_repayment_now(Money::from_minor(i64::MAX), &test_time(), &mut events)
                .unwrap();
        }

        assert!(matches!(loan.total_received(), Err(LoanError::CalculationError { .. })));
        assert_eq!(loan.total_paid(), Ok(Money::from_minor(1000)));
        assert!(loan.json().starts_with("JSON error: calculation error"));
    }

    #[test]
    fn test_currency_mismatch_leaves_loan_untouched() {
        let mut events = EventStore::new();
        let mut loan = sample_loan(&mut events);
        let before = loan.clone();
        events.clear();

        let request = RepaymentRequest::new(
            Money::from_minor(334),
            CurrencyCode::parse("EUR").unwrap(),
            test_time().now(),
        );
        let err = loan.apply_repayment(request, &mut events).unwrap_err();

        assert!(matches!(err, LoanError::CurrencyMismatch { .. }));
        assert_eq!(loan, before);
        assert!(events.is_empty());
    }

    #[test]
    fn test_invalid_repayment_amount() {
        let mut events = EventStore::new();
        let mut loan = sample_loan(&mut events);
        let before = loan.clone();

        assert!(matches!(
            loan.apply_repayment_now(Money::ZERO, &test_time(), &mut events),
            Err(LoanError::InvalidAmount { .. })
        ));
        assert_eq!(loan, before);
    }

    #[test]
    fn test_overdue_and_arrears() {
        let mut events = EventStore::new();
        let mut loan = sample_loan(&mut events);

        loan.apply_repayment_now(Money::from_minor(100), &test_time(), &mut events)
            .unwrap();

        let as_of = date(2024, 3, 15);
        let overdue: Vec<u32> = loan
            .overdue_installments(as_of)
            .iter()
            .map(|i| i.sequence)
            .collect();
        assert_eq!(overdue, vec![1, 2]);
        assert_eq!(loan.arrears(as_of), Ok(Money::from_minor(234 + 333)));
        assert!(loan.overdue_installments(date(2024, 2, 1)).is_empty());
    }

    #[test]
    fn test_zero_principal_loan_is_repaid() {
        let mut events = EventStore::new();
        let loan = Loan::builder()
            .principal(Money::ZERO)
            .currency("usd")
            .terms(2)
            .build(&test_time(), &mut events)
            .unwrap();

        assert!(loan.is_repaid());
        assert_eq!(loan.processed_at, date(2024, 1, 1));
        assert!(loan.installments.iter().all(|i| i.status == InstallmentStatus::Paid));
    }

    #[test]
    fn test_builder_requires_fields() {
        let mut events = EventStore::new();
        let result = Loan::builder().currency("USD").terms(3).build(&test_time(), &mut events);

        assert!(matches!(result, Err(LoanError::InvalidConfiguration { .. })));
        assert!(events.is_empty());

        let zero_terms = Loan::builder()
            .principal(Money::from_minor(1000))
            .currency("USD")
            .terms(0)
            .build(&test_time(), &mut events);
        assert_eq!(zero_terms.unwrap_err(), LoanError::InvalidTerms { terms: 0 });
    }
}
