use thiserror::Error;

use crate::money::{CurrencyCode, Money};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoanError {
    #[error("invalid terms: {terms}, a loan needs at least one installment")]
    InvalidTerms {
        terms: u32,
    },

    #[error("invalid amount: {amount}")]
    InvalidAmount {
        amount: Money,
    },

    #[error("currency mismatch: expected {expected}, provided {provided}")]
    CurrencyMismatch {
        expected: CurrencyCode,
        provided: CurrencyCode,
    },

    #[error("invalid currency code: {code:?}")]
    InvalidCurrencyCode {
        code: String,
    },

    #[error("invalid date: {message}")]
    InvalidDate {
        message: String,
    },

    #[error("calculation error: {message}")]
    CalculationError {
        message: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, LoanError>;
