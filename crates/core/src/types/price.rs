//! Money formatting for display.
//!
//! Amounts travel as [`Decimal`] everywhere; [`Price`] only pairs one with a
//! currency so the view layer can print it.

use core::fmt;
use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// An amount with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let sign = if rounded.is_sign_negative() { "-" } else { "" };
        let abs = rounded.abs();
        let whole = abs.trunc().to_string();
        let cents = ((abs - abs.trunc()) * Decimal::ONE_HUNDRED).trunc().to_string();

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        write!(
            f,
            "{sign}{}{grouped}.{cents:0>2}",
            self.currency_code.symbol()
        )
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// Display symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }
}

impl FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            "CAD" => Ok(Self::CAD),
            "AUD" => Ok(Self::AUD),
            other => Err(format!("unsupported currency: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_groups_thousands() {
        let price = Price::new(Decimal::new(1_234_567, 2), CurrencyCode::USD);
        assert_eq!(price.to_string(), "$12,345.67");
    }

    #[test]
    fn test_display_pads_cents() {
        let price = Price::new(Decimal::new(250, 0), CurrencyCode::EUR);
        assert_eq!(price.to_string(), "€250.00");
    }

    #[test]
    fn test_display_rounds_half_up() {
        let price = Price::new(Decimal::new(10_005, 3), CurrencyCode::GBP);
        assert_eq!(price.to_string(), "£10.01");
    }

    #[test]
    fn test_currency_parse() {
        assert_eq!("cad".parse::<CurrencyCode>(), Ok(CurrencyCode::CAD));
        assert!("XYZ".parse::<CurrencyCode>().is_err());
    }
}
