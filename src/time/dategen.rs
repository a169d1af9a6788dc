use crate::time::date::Date;
use crate::time::enums::TimeUnit;
use crate::time::period::Period;
use crate::utils::errors::{EngineError, Result};

/// # DateGen
/// Generates a periodic sequence of due dates from an anchor date and a
/// cadence (monthly, bi-weekly, ...), using [`Date`]'s anchored month
/// arithmetic so a monthly generator anchored on the 31st lands on the last
/// day of every shorter month instead of drifting.
/// # Examples
/// ```
/// use loancore::time::dategen::DateGen;
/// use loancore::time::date::Date;
///
/// let due_dates = DateGen::monthly(Date::new(2024, 1, 31), 3).unwrap();
/// assert_eq!(due_dates[0], Date::new(2024, 2, 29));
/// assert_eq!(due_dates[2], Date::new(2024, 4, 30));
/// ```
pub struct DateGen;

impl DateGen {
    /// Generates `num_payments` dates spaced by `period`, starting at
    /// `first_due` (inclusive). `num_payments >= 1` is required.
    pub fn periodic(first_due: Date, num_payments: u32, period: Period) -> Result<Vec<Date>> {
        if num_payments < 1 {
            return Err(EngineError::InvalidInput(
                "num_payments must be at least 1".to_string(),
            ));
        }
        Ok((0..num_payments)
            .map(|k| {
                let step = Period::new(period.length() * k as i32, period.units());
                first_due.add_period(step)
            })
            .collect())
    }

    /// Monthly due dates, anchored on `first_due`'s day of month.
    pub fn monthly(first_due: Date, num_payments: u32) -> Result<Vec<Date>> {
        Self::periodic(first_due, num_payments, Period::new(1, TimeUnit::Months))
    }

    /// Bi-weekly (14-day) due dates.
    pub fn biweekly(first_due: Date, num_payments: u32) -> Result<Vec<Date>> {
        Self::periodic(first_due, num_payments, Period::new(14, TimeUnit::Days))
    }

    /// Weekly due dates.
    pub fn weekly(first_due: Date, num_payments: u32) -> Result<Vec<Date>> {
        Self::periodic(first_due, num_payments, Period::new(1, TimeUnit::Weeks))
    }

    /// Due dates spaced by a fixed number of calendar days.
    pub fn every_n_days(first_due: Date, num_payments: u32, interval_days: i32) -> Result<Vec<Date>> {
        if interval_days < 1 {
            return Err(EngineError::InvalidInput(
                "interval_days must be at least 1".to_string(),
            ));
        }
        Self::periodic(first_due, num_payments, Period::new(interval_days, TimeUnit::Days))
    }

    /// Quarterly due dates.
    pub fn quarterly(first_due: Date, num_payments: u32) -> Result<Vec<Date>> {
        Self::periodic(first_due, num_payments, Period::new(3, TimeUnit::Months))
    }

    /// Annual due dates.
    pub fn annual(first_due: Date, num_payments: u32) -> Result<Vec<Date>> {
        Self::periodic(first_due, num_payments, Period::new(1, TimeUnit::Years))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monthly_anchors_to_month_end() {
        let dates = DateGen::monthly(Date::new(2024, 1, 31), 3).unwrap();
        assert_eq!(dates, vec![
            Date::new(2024, 1, 31),
            Date::new(2024, 2, 29),
            Date::new(2024, 3, 31),
        ]);
    }

    #[test]
    fn rejects_zero_num_payments() {
        assert!(DateGen::monthly(Date::new(2024, 1, 1), 0).is_err());
    }

    #[test]
    fn rejects_non_positive_interval() {
        assert!(DateGen::every_n_days(Date::new(2024, 1, 1), 3, 0).is_err());
    }

    #[test]
    fn biweekly_steps_fourteen_days() {
        let dates = DateGen::biweekly(Date::new(2024, 1, 1), 2).unwrap();
        assert_eq!(dates[1] - dates[0], 14);
    }
}
