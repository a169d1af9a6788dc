use super::enums::TimeUnit;
use std::ops::{Add, Neg};

/// # Period
/// A length of calendar time (`5 Days`, `1 Months`, ...) used to step a
/// [`super::date::Date`] forward. [`crate::time::dategen::DateGen`] turns a cadence
/// (monthly, bi-weekly, ...) into a `Period` and repeatedly adds it to the anchor date.
/// # Examples
/// ```
/// use loancore::time::period::Period;
/// use loancore::time::enums::TimeUnit;
///
/// let p = Period::new(5, TimeUnit::Days);
/// assert_eq!(p.length(), 5);
/// assert_eq!(p.units(), TimeUnit::Days);
/// ```
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Period {
    length: i32,
    units: TimeUnit,
}

impl Period {
    #[must_use]
    /// Constructs a new value.
    pub const fn new(length: i32, units: TimeUnit) -> Self {
        Self { length, units }
    }

    #[must_use]
    /// Accessor.
    pub const fn length(&self) -> i32 {
        self.length
    }

    #[must_use]
    /// Accessor.
    pub const fn units(&self) -> TimeUnit {
        self.units
    }
}

impl Neg for Period {
    type Output = Period;

    fn neg(self) -> Self::Output {
        Period::new(-self.length, self.units)
    }
}

impl Add for Period {
    type Output = Period;

    /// Only defined for periods sharing a unit; mixed-unit addition belongs to a
    /// calendar library this crate does not attempt to be.
    fn add(self, rhs: Period) -> Self::Output {
        assert_eq!(self.units, rhs.units, "cannot add periods of mixed units");
        Period::new(self.length + rhs.length, self.units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_new_reports_length_and_units() {
        let p = Period::new(5, TimeUnit::Days);
        assert_eq!(p.length(), 5);
        assert_eq!(p.units(), TimeUnit::Days);
    }

    #[test]
    fn negation_flips_sign_of_length() {
        let p = Period::new(3, TimeUnit::Weeks);
        assert_eq!(-p, Period::new(-3, TimeUnit::Weeks));
    }

    #[test]
    fn addition_requires_matching_units() {
        let a = Period::new(1, TimeUnit::Months);
        let b = Period::new(2, TimeUnit::Months);
        assert_eq!(a + b, Period::new(3, TimeUnit::Months));
    }
}
