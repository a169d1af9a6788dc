use super::enums::TimeUnit;
use super::period::Period;
use crate::utils::errors::Result;
use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// Extends `chrono::NaiveDate` with calendar arithmetic used by the amortization
/// grid (anchored month stepping, leap-year aware month lengths).
pub trait NaiveDateExt {
    /// Accessor.
    fn days_in_month(&self) -> i32;
    /// Accessor.
    fn days_in_year(&self) -> i32;
    /// Accessor.
    fn date_has_leap_year(&self) -> bool;
    /// Accessor.
    fn advance(&self, n: i32, units: TimeUnit) -> NaiveDate;
    /// Constructs a new value.
    fn end_of_month(date: NaiveDate) -> NaiveDate;
}

impl NaiveDateExt for NaiveDate {
    fn days_in_month(&self) -> i32 {
        match self.month() {
            1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
            4 | 6 | 9 | 11 => 30,
            2 => {
                if self.date_has_leap_year() {
                    29
                } else {
                    28
                }
            }
            month => panic!("Invalid month: {month}"),
        }
    }

    fn days_in_year(&self) -> i32 {
        if self.date_has_leap_year() {
            366
        } else {
            365
        }
    }

    fn date_has_leap_year(&self) -> bool {
        let year = self.year();
        year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
    }

    fn advance(&self, n: i32, units: TimeUnit) -> NaiveDate {
        let date = *self;
        let forward = n >= 0;
        match units {
            TimeUnit::Days => date + Duration::days(n as i64),
            TimeUnit::Weeks => date + Duration::days(7 * n as i64),
            TimeUnit::Months => {
                if forward {
                    date + Months::new(n as u32)
                } else {
                    date - Months::new((-n) as u32)
                }
            }
            TimeUnit::Years => {
                if forward {
                    date + Months::new(12 * n as u32)
                } else {
                    date - Months::new((-12 * n) as u32)
                }
            }
        }
    }

    fn end_of_month(date: NaiveDate) -> NaiveDate {
        let first_of_next = NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
            .unwrap()
            + Months::new(1);
        first_of_next - Duration::days(1)
    }
}

impl Add<Period> for NaiveDate {
    type Output = NaiveDate;

    fn add(self, rhs: Period) -> Self::Output {
        self.advance(rhs.length(), rhs.units())
    }
}

impl Sub<Period> for NaiveDate {
    type Output = NaiveDate;

    fn sub(self, rhs: Period) -> Self::Output {
        self.advance(-rhs.length(), rhs.units())
    }
}

/// # Date
/// A calendar date (no time-of-day, no timezone) used for due dates, disbursement
/// dates, and schedule grids. Wraps `chrono::NaiveDate` with the "anchored month"
/// arithmetic amortization grids need (the 31st of January plus one month is the
/// last day of February, not March 3rd).
/// # Examples
/// ```
/// use loancore::time::date::Date;
/// let date = Date::new(2020, 2, 15);
/// assert_eq!(date.day(), 15);
/// assert_eq!(date.month(), 2);
/// assert_eq!(date.year(), 2020);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Date {
    base_date: NaiveDate,
}

impl From<NaiveDate> for Date {
    fn from(base_date: NaiveDate) -> Self {
        Date { base_date }
    }
}

impl Serialize for Date {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Date {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Date, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Date::from_str(&s, "%Y-%m-%d").map_err(serde::de::Error::custom)
    }
}

impl Date {
    #[must_use]
    /// Constructs a new value.
    pub fn new(year: i32, month: u32, day: u32) -> Date {
        match NaiveDate::from_ymd_opt(year, month, day) {
            Some(base_date) => Date::from(base_date),
            None => panic!("Invalid date: {year}-{month}-{day}"),
        }
    }

    /// Constructs a new value.
    pub fn from_str(date: &str, fmt: &str) -> Result<Date> {
        let base_date = NaiveDate::parse_from_str(date, fmt)?;
        Ok(Date::from(base_date))
    }

    #[must_use]
    /// Accessor.
    pub fn to_str(&self, fmt: &str) -> String {
        self.base_date.format(fmt).to_string()
    }

    #[must_use]
    /// Accessor.
    pub const fn base_date(&self) -> NaiveDate {
        self.base_date
    }

    #[must_use]
    /// Accessor.
    pub fn day(&self) -> u32 {
        self.base_date.day()
    }

    #[must_use]
    /// Accessor.
    pub fn month(&self) -> u32 {
        self.base_date.month()
    }

    #[must_use]
    /// Accessor.
    pub fn year(&self) -> i32 {
        self.base_date.year()
    }

    #[must_use]
    /// Accessor.
    pub fn days_in_month(&self) -> i32 {
        self.base_date.days_in_month()
    }

    /// Number of calendar days between `self` and `other`, clamped to zero when
    /// `other` precedes `self`. `present_value` relies on this clamp for flows
    /// dated before the valuation date.
    #[must_use]
    pub fn days_until_clamped(&self, other: Date) -> i64 {
        (other - *self).max(0)
    }

    #[must_use]
    /// Accessor.
    pub fn advance(&self, n: i32, units: TimeUnit) -> Date {
        Date::from(self.base_date.advance(n, units))
    }

    #[must_use]
    /// Accessor.
    pub fn add_period(&self, period: Period) -> Date {
        Date::from(self.base_date + period)
    }

    #[must_use]
    /// Constructs a new value.
    pub fn end_of_month(date: Date) -> Date {
        Date::from(NaiveDate::end_of_month(date.base_date))
    }
}

impl Sub for Date {
    type Output = i64;

    fn sub(self, rhs: Self) -> Self::Output {
        (self.base_date - rhs.base_date).num_days()
    }
}

impl Add<Period> for Date {
    type Output = Date;

    fn add(self, rhs: Period) -> Self::Output {
        Date::from(self.base_date + rhs)
    }
}

impl Sub<Period> for Date {
    type Output = Date;

    fn sub(self, rhs: Period) -> Self::Output {
        Date::from(self.base_date - rhs)
    }
}

impl Add<i64> for Date {
    type Output = Date;

    fn add(self, rhs: i64) -> Self::Output {
        Date::from(self.base_date + Duration::days(rhs))
    }
}

impl AddAssign<i64> for Date {
    fn add_assign(&mut self, rhs: i64) {
        self.base_date += Duration::days(rhs);
    }
}

impl Sub<i64> for Date {
    type Output = Date;

    fn sub(self, rhs: i64) -> Self::Output {
        Date::from(self.base_date - Duration::days(rhs))
    }
}

impl SubAssign<i64> for Date {
    fn sub_assign(&mut self, rhs: i64) {
        self.base_date -= Duration::days(rhs);
    }
}

impl Display for Date {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.base_date.format("%Y-%m-%d"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn days_in_month_handles_leap_years() {
        let date = NaiveDate::from_ymd_opt(2020, 2, 15).unwrap();
        assert_eq!(date.days_in_month(), 29);
        let date = NaiveDate::from_ymd_opt(2021, 2, 15).unwrap();
        assert_eq!(date.days_in_month(), 28);
    }

    #[test]
    fn advance_months_anchors_to_month_end() {
        let date = Date::new(2024, 1, 31);
        assert_eq!(date.advance(1, TimeUnit::Months), Date::new(2024, 2, 29));
    }

    #[test]
    fn subtraction_yields_day_count() {
        let date1 = Date::new(2020, 2, 15);
        let date2 = Date::new(2020, 2, 10);
        assert_eq!(date1 - date2, 5);
    }

    #[test]
    fn days_until_clamped_floors_at_zero() {
        let later = Date::new(2024, 3, 1);
        let earlier = Date::new(2024, 1, 1);
        assert_eq!(later.days_until_clamped(earlier), 0);
        assert_eq!(earlier.days_until_clamped(later), 60);
    }

    #[test]
    fn end_of_month_lands_on_last_day() {
        let date = Date::new(2023, 8, 15);
        assert_eq!(Date::end_of_month(date).day(), 31);
    }

    #[test]
    fn deserialize_roundtrips_display_format() {
        let date = Date::from_str("2020-01-15", "%Y-%m-%d").unwrap();
        assert_eq!(date, Date::new(2020, 1, 15));
        assert_eq!(date.to_string(), "2020-01-15");
    }
}
