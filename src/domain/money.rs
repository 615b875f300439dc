use std::fmt;

use rust_decimal::Decimal;

/// Amounts are exact decimals; they are only ever text at the edges
/// (JSON payloads and the `amount` column). Never convert through `f64`.
pub type Amount = Decimal;

/// Parse a caller-supplied amount.
/// Example: "100.00" -> 100.00, " 12.5 " -> 12.5, "-40" -> -40
///
/// Zero in any spelling ("0", "0.00", "-0.0") is rejected. Negative
/// amounts are accepted. More than 28 fractional digits is an error, not
/// a rounding.
pub fn parse_amount(input: &str) -> Result<Amount, ParseAmountError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ParseAmountError::Empty);
    }

    let amount = Decimal::from_str_exact(input).map_err(|_| ParseAmountError::InvalidFormat)?;
    if amount.is_zero() {
        return Err(ParseAmountError::Zero);
    }
    Ok(amount)
}

/// Fold `(is_credit, amount)` pairs into a balance: credits minus debits.
///
/// Returns `None` when the running total leaves the `Decimal` range.
pub fn fold_balance<I>(movements: I) -> Option<Amount>
where
    I: IntoIterator<Item = (bool, Amount)>,
{
    movements
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, (is_credit, amount)| {
            if is_credit {
                acc.checked_add(amount)
            } else {
                acc.checked_sub(amount)
            }
        })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseAmountError {
    Empty,
    InvalidFormat,
    Zero,
}

impl fmt::Display for ParseAmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseAmountError::Empty => write!(f, "amount is required"),
            ParseAmountError::InvalidFormat => write!(f, "amount is not a valid decimal"),
            ParseAmountError::Zero => write!(f, "amount must not be zero"),
        }
    }
}

impl std::error::Error for ParseAmountError {}
