use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of minor-unit digits kept for every priced amount.
pub const DECIMAL_PLACES: u32 = 2;

/// A non-negative monetary amount in fixed-point decimal.
///
/// Wraps `rust_decimal::Decimal` so prices never go through binary floating point.
/// Derived amounts (line totals, order totals) are rounded half-away-from-zero to
/// [`DECIMAL_PLACES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates a `Money` from a catalog price. Negative values are rejected.
    pub fn try_new(value: Decimal) -> Option<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// `self * quantity`, rounded. `None` if the product does not fit in a `Decimal`.
    pub fn checked_times(self, quantity: u64) -> Option<Self> {
        self.0
            .checked_mul(Decimal::from(quantity))
            .map(|value| Self(round(value)))
    }

    /// Sums then rounds once, so totals follow the same rule as line totals.
    pub fn checked_sum<'a>(amounts: impl IntoIterator<Item = &'a Money>) -> Option<Self> {
        amounts
            .into_iter()
            .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount.0))
            .map(|value| Self(round(value)))
    }
}

fn round(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
