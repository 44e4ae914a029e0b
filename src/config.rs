use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::{LoanError, Result};
use crate::money::{CurrencyCode, Money};
use crate::payments::AmortizationSchedule;
use crate::types::RemainderPlacement;

/// origination terms of an installment loan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanConfig {
    /// principal in minor units
    pub principal: Money,
    pub currency: CurrencyCode,
    /// number of monthly installments
    pub terms: u32,
    /// processing date, the first installment falls due one month later
    pub processed_at: NaiveDate,
    #[serde(default)]
    pub remainder_placement: RemainderPlacement,
}

impl LoanConfig {
    pub fn new(
        principal: Money,
        currency: CurrencyCode,
        terms: u32,
        processed_at: NaiveDate,
    ) -> Self {
        Self {
            principal,
            currency,
            terms,
            processed_at,
            remainder_placement: RemainderPlacement::default(),
        }
    }

    pub fn with_remainder_placement(mut self, placement: RemainderPlacement) -> Self {
        self.remainder_placement = placement;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.terms == 0 {
            return Err(LoanError::InvalidTerms { terms: self.terms });
        }
        if self.principal.is_negative() {
            return Err(LoanError::InvalidAmount { amount: self.principal });
        }
        Ok(())
    }

    /// parse and validate terms from json
    pub fn from_json(json: &str) -> Result<Self> {
        let config: LoanConfig =
            serde_json::from_str(json).map_err(|e| LoanError::InvalidConfiguration {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| LoanError::InvalidConfiguration {
            message: e.to_string(),
        })
    }

    /// plan the schedule these terms produce
    pub fn schedule(&self) -> Result<AmortizationSchedule> {
        self.validate()?;
        AmortizationSchedule::generate(
            self.principal,
            self.terms,
            self.processed_at,
            self.remainder_placement,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "principal": 1000,
            "currency": "usd",
            "terms": 3,
            "processed_at": "2024-01-01"
        }"#;

        let config = LoanConfig::from_json(json).unwrap();
        assert_eq!(config.principal, Money::from_minor(1000));
        assert_eq!(config.currency.as_str(), "USD");
        assert_eq!(config.remainder_placement, RemainderPlacement::Leading);

        let schedule = config.schedule().unwrap();
        assert_eq!(schedule.installments[0].amount, Money::from_minor(334));
    }

    #[test]
    fn test_config_round_trips_placement() {
        let config = LoanConfig::new(
            Money::from_minor(1000),
            CurrencyCode::parse("EUR").unwrap(),
            3,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
        .with_remainder_placement(RemainderPlacement::Trailing);

        let parsed = LoanConfig::from_json(&config.to_json_pretty().unwrap()).unwrap();
        assert_eq!(parsed, config);
        assert_eq!(parsed.schedule().unwrap().installments[2].amount, Money::from_minor(334));
    }

    #[test]
    fn test_config_rejects_bad_input() {
        let zero_terms =
            r#"{"principal": 1000, "currency": "USD", "terms": 0, "processed_at": "2024-01-01"}"#;
        assert_eq!(LoanConfig::from_json(zero_terms), Err(LoanError::InvalidTerms { terms: 0 }));

        let bad_currency =
            r#"{"principal": 1000, "currency": "US", "terms": 3, "processed_at": "2024-01-01"}"#;
        assert!(matches!(
            LoanConfig::from_json(bad_currency),
            Err(LoanError::InvalidConfiguration { .. })
        ));

        let negative =
            r#"{"principal": -1, "currency": "USD", "terms": 3, "processed_at": "2024-01-01"}"#;
        assert!(matches!(LoanConfig::from_json(negative), Err(LoanError::InvalidAmount { .. })));

        assert!(LoanConfig::from_json("not json").is_err());
    }
}
