use crate::money::Money;
use crate::rates::enums::{DisplayStyle, Frequency, YearBasis};
use crate::utils::errors::{EngineError, Result};
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// # InterestRate
/// An immutable period rate together with the frequency and day-count
/// convention it is quoted in. The canonical intermediate form used for every
/// conversion is the **effective annual rate**; `to_daily`/`to_monthly`/
/// `to_quarterly`/`to_annual`/`to_periodic` all pass through it, so any two
/// conversions of the same rate commute up to the configured `precision`.
///
/// `accrue` compounds a principal at the *daily* rate over an integer number
/// of days using repeated exact decimal multiplication — never `f64` — so the
/// monetary leg of this calculation never introduces binary-float rounding.
/// Only the rate-conversion arithmetic itself (fractional exponents) goes
/// through `rust_decimal`'s `f64`-backed `powd`/`ln`/`exp`.
/// # Examples
/// ```
/// use loancore::rates::interestrate::InterestRate;
/// use loancore::rates::enums::{Frequency, YearBasis};
/// use rust_decimal_macros::dec;
///
/// let rate = InterestRate::new(dec!(0.12), Frequency::Annual, YearBasis::Commercial365, None);
/// let monthly = rate.to_monthly().unwrap();
/// assert_eq!(monthly.frequency(), Frequency::Monthly);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterestRate {
    rate: Decimal,
    frequency: Frequency,
    year_basis: YearBasis,
    precision: Option<u32>,
    display_style: DisplayStyle,
}

impl InterestRate {
    #[must_use]
    /// Constructs a new value.
    pub fn new(
        rate: Decimal,
        frequency: Frequency,
        year_basis: YearBasis,
        precision: Option<u32>,
    ) -> InterestRate {
        InterestRate {
            rate,
            frequency,
            year_basis,
            precision,
            display_style: DisplayStyle::Long,
        }
    }

    #[must_use]
    /// Accessor.
    pub const fn rate(&self) -> Decimal {
        self.rate
    }

    #[must_use]
    /// Accessor.
    pub const fn frequency(&self) -> Frequency {
        self.frequency
    }

    #[must_use]
    /// Accessor.
    pub const fn year_basis(&self) -> YearBasis {
        self.year_basis
    }

    #[must_use]
    /// Accessor.
    pub const fn precision(&self) -> Option<u32> {
        self.precision
    }

    #[must_use]
    /// Accessor.
    pub const fn display_style(&self) -> DisplayStyle {
        self.display_style
    }

    fn quantize(&self, value: Decimal) -> Decimal {
        match self.precision {
            Some(p) => value.round_dp(p),
            None => value,
        }
    }

    /// The single annual rate producing the same one-year growth as this
    /// rate's configured compounding. Every conversion passes through this.
    pub fn effective_annual(&self) -> Result<Decimal> {
        let one = Decimal::ONE;
        let raw = match self.frequency {
            Frequency::Continuous => self.rate.exp() - one,
            _ => {
                let n = self.frequency.periods_per_year(self.year_basis);
                let base = one + self.rate;
                base.powd(n) - one
            }
        };
        Ok(self.quantize(raw))
    }

    /// Converts to the equivalent rate at `target` frequency, passing through
    /// the effective-annual hub.
    pub fn to_periodic(&self, target: Frequency) -> Result<InterestRate> {
        let eff = self.effective_annual()?;
        let one = Decimal::ONE;
        let rate = match target {
            Frequency::Continuous => (one + eff).ln(),
            _ => {
                let n = target.periods_per_year(self.year_basis);
                (one + eff).powd(one / n) - one
            }
        };
        Ok(InterestRate {
            rate,
            frequency: target,
            year_basis: self.year_basis,
            precision: self.precision,
            display_style: self.display_style,
        })
    }

    /// Accessor.
    pub fn to_daily(&self) -> Result<InterestRate> {
        self.to_periodic(Frequency::Daily)
    }

    /// Accessor.
    pub fn to_monthly(&self) -> Result<InterestRate> {
        self.to_periodic(Frequency::Monthly)
    }

    /// Accessor.
    pub fn to_quarterly(&self) -> Result<InterestRate> {
        self.to_periodic(Frequency::Quarterly)
    }

    /// Accessor.
    pub fn to_annual(&self) -> Result<InterestRate> {
        self.to_periodic(Frequency::Annual)
    }

    /// Daily rate derived from the effective annual rate:
    /// `daily = (1 + eff_annual)^(1/year_size) - 1`.
    pub fn daily_rate(&self) -> Result<Decimal> {
        Ok(self.to_daily()?.rate)
    }

    /// `(1 + daily)^days`, by repeated exact decimal multiplication (never
    /// `f64`) so every monetary use of this factor is exact.
    pub fn compound_factor(&self, days: i64) -> Result<Decimal> {
        if days < 0 {
            return Err(EngineError::InvalidInput(
                "compound_factor requires a non-negative day count".to_string(),
            ));
        }
        let daily = self.daily_rate()?;
        let base = Decimal::ONE + daily;
        let mut factor = Decimal::ONE;
        for _ in 0..days {
            factor *= base;
        }
        Ok(factor)
    }

    /// `1 / (1 + daily)^days`.
    pub fn discount_factor(&self, days: i64) -> Result<Decimal> {
        Ok(Decimal::ONE / self.compound_factor(days)?)
    }

    /// `principal * (1 + daily)^days`, compounded by repeated exact decimal
    /// multiplication (never `f64`) so the monetary result is exact.
    pub fn accrue(&self, principal: Money, days: i64) -> Result<Money> {
        Ok(principal.mul_scalar(self.compound_factor(days)?))
    }

    /// Parses strings of the form `<number>[%] <period>`, e.g. `"12% a.m."`
    /// or `"0.05 annual"`. A trailing `%` means the number is a percentage;
    /// its absence means a decimal fraction. Abbreviated period tokens
    /// (`a`, `m`, `d`, `q`, `s`, `a.a.`, `a.m.`, `a.d.`, `a.t.`, `a.s.`) set
    /// the display style to `Abbreviated`; the long words set it to `Long`.
    pub fn parse(input: &str, year_basis: YearBasis, precision: Option<u32>) -> Result<InterestRate> {
        let trimmed = input.trim();
        let (number_part, period_part) = trimmed
            .split_once(char::is_whitespace)
            .ok_or_else(|| EngineError::InvalidInput(format!("unparseable rate string: {trimmed}")))?;

        let percentage = number_part.trim_end().ends_with('%');
        let number_str = number_part.trim_end_matches('%');
        let parsed = Decimal::from_str(number_str)
            .map_err(|e| EngineError::InvalidInput(format!("unparseable rate number: {e}")))?;
        let rate = if percentage {
            parsed / Decimal::from(100)
        } else {
            parsed
        };

        let (frequency, display_style) = period_token(period_part.trim())?;

        Ok(InterestRate {
            rate,
            frequency,
            year_basis,
            precision,
            display_style,
        })
    }
}

fn period_token(token: &str) -> Result<(Frequency, DisplayStyle)> {
    let lower = token.to_lowercase();
    let pair = match lower.as_str() {
        "annual" => (Frequency::Annual, DisplayStyle::Long),
        "a" | "a.a." => (Frequency::Annual, DisplayStyle::Abbreviated),
        "monthly" => (Frequency::Monthly, DisplayStyle::Long),
        "m" | "a.m." => (Frequency::Monthly, DisplayStyle::Abbreviated),
        "daily" => (Frequency::Daily, DisplayStyle::Long),
        "d" | "a.d." => (Frequency::Daily, DisplayStyle::Abbreviated),
        "quarterly" => (Frequency::Quarterly, DisplayStyle::Long),
        "q" | "a.t." => (Frequency::Quarterly, DisplayStyle::Abbreviated),
        "semi_annual" => (Frequency::SemiAnnual, DisplayStyle::Long),
        "s" | "a.s." => (Frequency::SemiAnnual, DisplayStyle::Abbreviated),
        _ => {
            return Err(EngineError::InvalidInput(format!(
                "unrecognized rate period token: {token}"
            )))
        }
    };
    Ok(pair)
}

fn long_token(frequency: Frequency) -> &'static str {
    match frequency {
        Frequency::Daily => "daily",
        Frequency::Monthly => "monthly",
        Frequency::Quarterly => "quarterly",
        Frequency::SemiAnnual => "semi_annual",
        Frequency::Annual => "annual",
        Frequency::Continuous => "continuous",
    }
}

fn abbreviated_token(frequency: Frequency) -> &'static str {
    match frequency {
        Frequency::Daily => "a.d.",
        Frequency::Monthly => "a.m.",
        Frequency::Quarterly => "a.t.",
        Frequency::SemiAnnual => "a.s.",
        Frequency::Annual => "a.a.",
        Frequency::Continuous => "continuous",
    }
}

impl Display for InterestRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let percent = (self.rate * Decimal::from(100)).normalize();
        let token = match self.display_style {
            DisplayStyle::Long => long_token(self.frequency),
            DisplayStyle::Abbreviated => abbreviated_token(self.frequency),
        };
        write!(f, "{percent}% {token}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const EPSILON: Decimal = dec!(0.0000001);

    #[test]
    fn parse_reads_percentage_and_abbreviated_period() {
        let rate = InterestRate::parse("12% a.m.", YearBasis::Commercial365, None).unwrap();
        assert_eq!(rate.rate(), dec!(0.12));
        assert_eq!(rate.frequency(), Frequency::Monthly);
        assert_eq!(rate.display_style(), DisplayStyle::Abbreviated);
    }

    #[test]
    fn parse_reads_decimal_and_long_period() {
        let rate = InterestRate::parse("0.05 annual", YearBasis::Commercial365, None).unwrap();
        assert_eq!(rate.rate(), dec!(0.05));
        assert_eq!(rate.frequency(), Frequency::Annual);
        assert_eq!(rate.display_style(), DisplayStyle::Long);
    }

    #[test]
    fn round_trip_abbreviated_display() {
        let rate = InterestRate::parse("12% a.m.", YearBasis::Commercial365, None).unwrap();
        assert_eq!(rate.to_string(), "12% a.m.");
    }

    #[test]
    fn conversion_lattice_commutes() {
        let annual = InterestRate::new(dec!(0.12), Frequency::Annual, YearBasis::Commercial365, Some(10));
        let via_monthly = annual.to_monthly().unwrap().to_annual().unwrap();
        let direct = annual.to_annual().unwrap();
        assert!((via_monthly.rate() - direct.rate()).abs() < EPSILON);
    }

    #[test]
    fn accrue_zero_days_is_identity() {
        let rate = InterestRate::new(dec!(0.12), Frequency::Annual, YearBasis::Commercial365, None);
        let principal = Money::from_cents(10_000_00);
        assert_eq!(rate.accrue(principal, 0).unwrap(), principal);
    }

    #[test]
    fn accrue_is_additive_over_days() {
        let rate = InterestRate::new(dec!(0.12), Frequency::Annual, YearBasis::Commercial365, None);
        let principal = Money::from_cents(10_000_00);
        let combined = rate.accrue(principal, 40).unwrap();
        let split = rate.accrue(rate.accrue(principal, 25).unwrap(), 15).unwrap();
        assert_eq!(combined, split);
    }

    #[test]
    fn accrue_rejects_negative_days() {
        let rate = InterestRate::new(dec!(0.12), Frequency::Annual, YearBasis::Commercial365, None);
        assert!(rate.accrue(Money::from_cents(100_00), -1).is_err());
    }
}
