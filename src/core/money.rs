use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of decimal places every stored monetary amount carries.
pub const MONEY_SCALE: u32 = 2;

/// Tolerance used when comparing sums that came out of rounding.
pub const MONEY_TOLERANCE: Decimal = dec!(0.01);

/// ISO 4217-style currency code.
///
/// A settlement is denominated in exactly one currency; the code is carried
/// for display and never converted.
///
/// # Examples
///
/// ```
/// use expense_settlement::core::money::CurrencyCode;
///
/// let usd = CurrencyCode::new("USD");
/// let eur = CurrencyCode::new("EUR");
/// assert_ne!(usd, eur);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::new("USD")
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CurrencyCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Round to cents, halves away from zero.
///
/// ```
/// use expense_settlement::core::money::round_money;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(round_money(dec!(33.335)), dec!(33.34));
/// assert_eq!(round_money(dec!(10)), dec!(10.00));
/// ```
pub fn round_money(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_SCALE);
    rounded
}

/// Truncate to cents towards negative infinity.
pub fn floor_money(amount: Decimal) -> Decimal {
    let mut floored = amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::ToNegativeInfinity);
    floored.rescale(MONEY_SCALE);
    floored
}

/// True when `a` and `b` differ by no more than [`MONEY_TOLERANCE`].
pub fn within_tolerance(a: Decimal, b: Decimal) -> bool {
    within(a, b, MONEY_TOLERANCE)
}

/// True when `a` and `b` differ by no more than `tolerance`.
///
/// A difference that overflows is never within tolerance.
pub fn within(a: Decimal, b: Decimal, tolerance: Decimal) -> bool {
    a.checked_sub(b).map_or(false, |diff| diff.abs() <= tolerance)
}

/// Sum of `amounts`, or `None` if the running total overflows.
pub fn checked_sum(amounts: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount))
}

/// True when the amount has no precision beyond cents.
pub fn is_cent_precise(amount: Decimal) -> bool {
    amount.normalize().scale() <= MONEY_SCALE
}
