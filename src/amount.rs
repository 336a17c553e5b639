//! # Amount
//!
//! `amount` is a module for parsing currency formatted load amounts such as `"$3318.47"`.

use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

/// Malformed load amount
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseAmountError {
    #[error("amount is empty")]
    Empty,
    #[error("invalid amount {0:?}")]
    Invalid(String),
    #[error("negative amount {0}")]
    Negative(Decimal),
}

/// Parse a load amount, with or without a leading `$`
pub fn parse_amount(raw: &str) -> Result<Decimal, ParseAmountError> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix('$').unwrap_or(trimmed);
    if digits.is_empty() {
        return Err(ParseAmountError::Empty);
    }
    let amount =
        Decimal::from_str(digits).map_err(|_| ParseAmountError::Invalid(raw.to_owned()))?;
    if amount < Decimal::ZERO {
        return Err(ParseAmountError::Negative(amount));
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn dollar_amount_works() {
        assert_eq!(parse_amount("$3318.47"), Ok(dec!(3318.47)));
    }

    #[test]
    fn bare_amount_works() {
        assert_eq!(parse_amount(" 250 "), Ok(dec!(250)));
    }

    #[test]
    fn zero_amount_works() {
        assert_eq!(parse_amount("$0.00"), Ok(dec!(0)));
    }

    #[test]
    fn amount_keeps_exact_cents() {
        let amount = parse_amount("$0.10").unwrap() + parse_amount("$0.20").unwrap();
        assert_eq!(amount, dec!(0.30));
    }

    #[test]
    fn empty_amount_fails() {
        assert_eq!(parse_amount("$"), Err(ParseAmountError::Empty));
        assert_eq!(parse_amount(""), Err(ParseAmountError::Empty));
    }

    #[test]
    fn garbage_amount_fails() {
        assert_eq!(
            parse_amount("$12abc"),
            Err(ParseAmountError::Invalid("$12abc".to_owned()))
        );
        assert!(matches!(
            parse_amount("USD 5"),
            Err(ParseAmountError::Invalid(_))
        ));
    }

    #[test]
    fn negative_amount_fails() {
        assert_eq!(
            parse_amount("$-5.00"),
            Err(ParseAmountError::Negative(dec!(-5.00)))
        );
    }
}
