use serde::{Deserialize, Serialize};

/// Compounding cadence an [`super::interestrate::InterestRate`] is quoted at.
/// `DAILY` and `CONTINUOUS` never need a conversion through the annual hub;
/// the rest convert via the effective-annual rate.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    /// Variant value.
    Daily,
    /// Variant value.
    Monthly,
    /// Variant value.
    Quarterly,
    /// Variant value.
    SemiAnnual,
    /// Variant value.
    Annual,
    /// Variant value.
    Continuous,
}

impl Frequency {
    /// Number of periods of this frequency that fit in one year, for a given
    /// year-size convention. `Continuous` has no periods-per-year and panics
    /// if asked; callers must special-case it before reaching here.
    #[must_use]
    pub fn periods_per_year(self, year_size: YearBasis) -> rust_decimal::Decimal {
        use rust_decimal_macros::dec;
        match self {
            Frequency::Daily => rust_decimal::Decimal::from(year_size.days()),
            Frequency::Monthly => dec!(12),
            Frequency::Quarterly => dec!(4),
            Frequency::SemiAnnual => dec!(2),
            Frequency::Annual => dec!(1),
            Frequency::Continuous => dec!(1),
        }
    }
}

/// Day-count convention used to size a year when converting to/from a daily
/// rate: commercial (calendar, 365) or banker's (360).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum YearBasis {
    /// Variant value.
    Commercial365,
    /// Variant value.
    Banker360,
}

impl YearBasis {
    #[must_use]
    /// Accessor.
    pub const fn days(self) -> i64 {
        match self {
            YearBasis::Commercial365 => 365,
            YearBasis::Banker360 => 360,
        }
    }
}

/// How an [`super::interestrate::InterestRate`] renders itself: the full word
/// (`monthly`) or the abbreviated token it was parsed from (`m`). Parsing an
/// abbreviated token sets this so formatting round-trips.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayStyle {
    /// Variant value.
    Long,
    /// Variant value.
    Abbreviated,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn periods_per_year_matches_frequency() {
        assert_eq!(Frequency::Monthly.periods_per_year(YearBasis::Commercial365), rust_decimal_macros::dec!(12));
        assert_eq!(Frequency::Daily.periods_per_year(YearBasis::Commercial365), rust_decimal::Decimal::from(365));
        assert_eq!(Frequency::Daily.periods_per_year(YearBasis::Banker360), rust_decimal::Decimal::from(360));
    }
}
