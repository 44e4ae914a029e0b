use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;

use crate::errors::{LoanError, Result};

/// Money as an integer count of minor units (cents, pence, yen)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// create from minor units
    pub const fn from_minor(amount: i64) -> Self {
        Money(amount)
    }

    /// get minor units
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// convert to major units using the currency exponent
    pub fn to_major(&self, currency: &CurrencyCode) -> Decimal {
        Decimal::new(self.0, currency.exponent())
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn min(self, other: Self) -> Self {
        Money(self.0.min(other.0))
    }

    pub fn max(self, other: Self) -> Self {
        Money(self.0.max(other.0))
    }

    /// addition that reports overflow instead of wrapping
    pub fn checked_add(self, other: Self) -> Result<Self> {
        self.0
            .checked_add(other.0)
            .map(Money)
            .ok_or_else(|| LoanError::CalculationError {
                message: format!("overflow adding {} and {}", self, other),
            })
    }

    /// subtraction that reports overflow instead of wrapping
    pub fn checked_sub(self, other: Self) -> Result<Self> {
        self.0
            .checked_sub(other.0)
            .map(Money)
            .ok_or_else(|| LoanError::CalculationError {
                message: format!("overflow subtracting {} from {}", other, self),
            })
    }

    /// sum a sequence, failing on overflow
    pub fn checked_sum<I>(iter: I) -> Result<Self>
    where
        I: IntoIterator<Item = Money>,
    {
        iter.into_iter()
            .try_fold(Money::ZERO, |acc, amount| acc.checked_add(amount))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Money {
    fn from(amount: i64) -> Self {
        Money(amount)
    }
}

// plain operators are for values already bounded by a larger amount;
// anything summed from caller input goes through the checked variants
impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Money) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Money) {
        self.0 -= other.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, x| acc + x)
    }
}

/// ISO-4217 style currency code, three uppercase ascii letters
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// parse and normalise a code such as "usd" or "EUR"
    pub fn parse(code: &str) -> Result<Self> {
        let trimmed = code.trim();
        if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(LoanError::InvalidCurrencyCode {
                code: code.to_string(),
            });
        }
        Ok(CurrencyCode(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// number of minor-unit digits
    pub fn exponent(&self) -> u32 {
        match self.0.as_str() {
            "BIF" | "CLP" | "DJF" | "GNF" | "ISK" | "JPY" | "KMF" | "KRW" | "PYG" | "RWF"
            | "UGX" | "VND" | "VUV" | "XAF" | "XOF" | "XPF" => 0,
            "BHD" | "IQD" | "JOD" | "KWD" | "LYD" | "OMR" | "TND" => 3,
            _ => 2,
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CurrencyCode {
    type Err = LoanError;

    fn from_str(s: &str) -> Result<Self> {
        CurrencyCode::parse(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = LoanError;

    fn try_from(value: String) -> Result<Self> {
        CurrencyCode::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_major_unit_conversion() {
        let usd = CurrencyCode::parse("USD").unwrap();
        let jpy = CurrencyCode::parse("JPY").unwrap();
        let kwd = CurrencyCode::parse("KWD").unwrap();

        assert_eq!(Money::from_minor(12_345).to_major(&usd), dec!(123.45));
        assert_eq!(Money::from_minor(12_345).to_major(&jpy), dec!(12345));
        assert_eq!(Money::from_minor(1_500).to_major(&kwd), dec!(1.500));
    }

    #[test]
    fn test_checked_arithmetic() {
        assert_eq!(
            Money::from_minor(10).checked_add(Money::from_minor(5)).unwrap(),
            Money::from_minor(15)
        );
        assert!(Money::from_minor(i64::MAX).checked_add(Money::from_minor(1)).is_err());
        assert!(Money::from_minor(i64::MIN).checked_sub(Money::from_minor(1)).is_err());

        let total = Money::checked_sum(vec![Money::from_minor(1), Money::from_minor(2)]).unwrap();
        assert_eq!(total, Money::from_minor(3));
        let overflow = vec![Money::from_minor(i64::MAX), Money::from_minor(1)];
        assert!(Money::checked_sum(overflow).is_err());
    }

    #[test]
    fn test_currency_code_parsing() {
        assert_eq!(CurrencyCode::parse("usd").unwrap().as_str(), "USD");
        assert_eq!(CurrencyCode::parse(" eur ").unwrap().as_str(), "EUR");
        assert!(CurrencyCode::parse("US").is_err());
        assert!(CurrencyCode::parse("US1").is_err());
        assert!(CurrencyCode::parse("DOLLAR").is_err());
    }

    #[test]
    fn test_currency_code_serde() {
        let code: CurrencyCode = serde_json::from_str("\"vnd\"").unwrap();
        assert_eq!(code.as_str(), "VND");
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"VND\"");
        assert!(serde_json::from_str::<CurrencyCode>("\"xx\"").is_err());

        let money: Money = serde_json::from_str("334").unwrap();
        assert_eq!(money, Money::from_minor(334));
    }
}
