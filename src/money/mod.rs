use crate::utils::errors::{EngineError, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::Display;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};
use std::str::FromStr;

/// # Money
/// An exact-decimal monetary amount. Arithmetic never goes through binary
/// floating point: construction from a string or integer parses straight into
/// [`rust_decimal::Decimal`], and a value accepted as `f64` is first
/// stringified so its bit pattern never reaches a computation. `raw` carries
/// full precision through a chain of operations; `real` is `raw` rounded
/// half-up to 2 decimal places and is what equality, ordering, and `Display`
/// use.
/// # Examples
/// ```
/// use loancore::money::Money;
/// let a = Money::from_cents(1050);
/// let b = Money::from_cents(50);
/// assert_eq!((a - b).cents(), 1000);
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Money {
    raw: Decimal,
}

impl Money {
    /// Builds a `Money` from an already-parsed `Decimal`. Fails if the value
    /// is not finite (NaN/Infinity are unrepresentable in `Decimal` itself,
    /// but this guards the boundary for values that arrived via a checked
    /// conversion from `f64`).
    pub fn new(raw: Decimal) -> Result<Money> {
        Ok(Money { raw })
    }

    /// Parses a decimal string into a `Money`. The canonical construction
    /// path: never touches binary floating point.
    pub fn from_str_exact(value: &str) -> Result<Money> {
        let raw = Decimal::from_str(value)
            .map_err(|e| EngineError::InvalidInput(format!("invalid money literal: {e}")))?;
        Money::new(raw)
    }

    /// Accepts an `f64` by first formatting it to a string (so no binary
    /// rounding reaches the decimal parser) and rejects non-finite values.
    pub fn from_f64(value: f64) -> Result<Money> {
        if !value.is_finite() {
            return Err(EngineError::InvalidInput(
                "non-finite value cannot become Money".to_string(),
            ));
        }
        Money::from_str_exact(&format!("{value}"))
    }

    /// Builds a `Money` from an integer number of cents (e.g. `1050` → `10.50`).
    #[must_use]
    pub fn from_cents(cents: i64) -> Money {
        Money {
            raw: Decimal::new(cents, 2),
        }
    }

    /// Zero value.
    #[must_use]
    pub fn zero() -> Money {
        Money { raw: dec!(0) }
    }

    /// Full, unrounded precision as accumulated through arithmetic.
    #[must_use]
    pub const fn raw(&self) -> Decimal {
        self.raw
    }

    /// `raw` rounded half-up to 2 decimal places. Equality, ordering, and
    /// `Display` all operate on this value.
    #[must_use]
    pub fn real(&self) -> Decimal {
        self.raw.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Integer number of cents in `real`.
    #[must_use]
    pub fn cents(&self) -> i64 {
        (self.real() * dec!(100))
            .to_i64()
            .unwrap_or(i64::MAX)
    }

    /// Multiplies by a decimal scalar, preserving raw precision.
    #[must_use]
    pub fn mul_scalar(&self, scalar: Decimal) -> Money {
        Money {
            raw: self.raw * scalar,
        }
    }

    /// Divides by a decimal scalar, preserving raw precision.
    pub fn div_scalar(&self, scalar: Decimal) -> Result<Money> {
        if scalar.is_zero() {
            return Err(EngineError::InvalidInput("division by zero".to_string()));
        }
        Ok(Money {
            raw: self.raw / scalar,
        })
    }

    /// Absolute value.
    #[must_use]
    pub fn abs(&self) -> Money {
        Money { raw: self.raw.abs() }
    }

    #[must_use]
    /// Accessor.
    pub fn is_zero(&self) -> bool {
        self.real().is_zero()
    }

    #[must_use]
    /// Accessor.
    pub fn is_positive(&self) -> bool {
        self.real().is_sign_positive() && !self.is_zero()
    }

    #[must_use]
    /// Accessor.
    pub fn is_negative(&self) -> bool {
        self.real().is_sign_negative() && !self.is_zero()
    }

    /// The larger of two amounts, compared on `real`.
    #[must_use]
    pub fn max(self, other: Money) -> Money {
        if self.real() >= other.real() {
            self
        } else {
            other
        }
    }

    /// `self` clamped to be no smaller than zero.
    #[must_use]
    pub fn clamp_min_zero(self) -> Money {
        if self.is_negative() {
            Money::zero()
        } else {
            self
        }
    }
}

impl PartialEq for Money {
    fn eq(&self, other: &Self) -> bool {
        self.real() == other.real()
    }
}
impl Eq for Money {}

impl PartialOrd for Money {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Money {
    fn cmp(&self, other: &Self) -> Ordering {
        self.real().cmp(&other.real())
    }
}

impl PartialEq<Decimal> for Money {
    fn eq(&self, other: &Decimal) -> bool {
        self.real() == *other
    }
}
impl PartialOrd<Decimal> for Money {
    fn partial_cmp(&self, other: &Decimal) -> Option<Ordering> {
        self.real().partial_cmp(other)
    }
}

impl Add for Money {
    type Output = Money;
    fn add(self, rhs: Money) -> Money {
        Money {
            raw: self.raw + rhs.raw,
        }
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.raw += rhs.raw;
    }
}

impl Sub for Money {
    type Output = Money;
    fn sub(self, rhs: Money) -> Money {
        Money {
            raw: self.raw - rhs.raw,
        }
    }
}

impl Neg for Money {
    type Output = Money;
    fn neg(self) -> Money {
        Money { raw: -self.raw }
    }
}

impl Mul<Decimal> for Money {
    type Output = Money;
    fn mul(self, rhs: Decimal) -> Money {
        self.mul_scalar(rhs)
    }
}

impl Div<Decimal> for Money {
    type Output = Money;
    fn div(self, rhs: Decimal) -> Money {
        Money {
            raw: self.raw / rhs,
        }
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let real = self.real();
        let negative = real.is_sign_negative();
        let abs = real.abs();
        let cents = (abs.fract() * dec!(100)).round().to_i64().unwrap_or(0);
        let whole = abs.trunc().to_i64().unwrap_or(0);

        let digits: String = whole.to_string();
        let mut grouped = String::new();
        for (i, ch) in digits.chars().rev().enumerate() {
            if i > 0 && i % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        let grouped: String = grouped.chars().rev().collect();

        if negative {
            write!(f, "-{grouped}.{cents:02}")
        } else {
            write!(f, "{grouped}.{cents:02}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_then_subtract_is_identity() {
        let a = Money::from_cents(100_00);
        let b = Money::from_cents(37_00);
        assert_eq!(a + b - b, a);
    }

    #[test]
    fn from_cents_round_trips() {
        let m = Money::from_cents(12345);
        assert_eq!(m.cents(), 12345);
    }

    #[test]
    fn rejects_non_finite_f64() {
        assert!(Money::from_f64(f64::NAN).is_err());
        assert!(Money::from_f64(f64::INFINITY).is_err());
    }

    #[test]
    fn display_groups_thousands() {
        let m = Money::from_cents(1_000_000_00);
        assert_eq!(m.to_string(), "1,000,000.00");
    }

    #[test]
    fn real_rounds_half_up() {
        let m = Money::new(dec!(10.005)).unwrap();
        assert_eq!(m.real(), dec!(10.01));
    }

    #[test]
    fn ordering_uses_real_not_raw() {
        let a = Money::new(dec!(1.001)).unwrap();
        let b = Money::new(dec!(1.002)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn clamp_min_zero_floors_negative() {
        let m = Money::from_cents(-500);
        assert_eq!(m.clamp_min_zero(), Money::zero());
    }
}
