use crate::money::Money;
use crate::rates::interestrate::InterestRate;
use crate::schedule::entry::{PaymentSchedule, PaymentScheduleEntry};
use crate::schedule::traits::Scheduler;
use crate::time::date::Date;
use crate::utils::errors::{EngineError, Result};
use rust_decimal::Decimal;

/// # InvertedPriceScheduler
/// Constant-amortization (SAC) schedule: every period repays the same slice
/// of principal (`principal / n`) and interest shrinks with the declining
/// balance. The last principal payment absorbs whatever residual is left so
/// `ending_balance[last] == 0` exactly.
pub struct InvertedPriceScheduler;

impl Scheduler for InvertedPriceScheduler {
    fn generate(
        &self,
        principal: Money,
        rate: InterestRate,
        due_dates: &[Date],
        disbursement_date: Date,
    ) -> Result<PaymentSchedule> {
        if due_dates.is_empty() {
            return Err(EngineError::InvalidInput(
                "a schedule requires at least one due date".to_string(),
            ));
        }
        let n = Decimal::from(due_dates.len());
        let flat_principal = principal.div_scalar(n)?;

        let mut entries = Vec::with_capacity(due_dates.len());
        let mut beginning_balance = principal;
        let mut previous_date = disbursement_date;

        for (idx, due) in due_dates.iter().enumerate() {
            let days_in_period = *due - previous_date;
            let is_last = idx + 1 == due_dates.len();

            let accrued = rate.accrue(beginning_balance, days_in_period)?;
            let interest_payment = accrued - beginning_balance;

            let principal_payment = if is_last { beginning_balance } else { flat_principal };
            let payment_amount = principal_payment + interest_payment;
            let ending_balance = (beginning_balance - principal_payment).clamp_min_zero();

            entries.push(PaymentScheduleEntry::new(
                u32::try_from(idx + 1).unwrap_or(u32::MAX),
                *due,
                days_in_period,
                beginning_balance,
                payment_amount,
                principal_payment,
                interest_payment,
                ending_balance,
            ));

            beginning_balance = ending_balance;
            previous_date = *due;
        }

        Ok(PaymentSchedule::new(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::enums::{Frequency, YearBasis};
    use rust_decimal_macros::dec;

    #[test]
    fn principal_payments_are_equal_except_last() {
        let rate = InterestRate::new(dec!(0.06), Frequency::Annual, YearBasis::Commercial365, None);
        let due_dates = vec![Date::new(2024, 2, 1), Date::new(2024, 3, 1), Date::new(2024, 4, 1)];
        let schedule = InvertedPriceScheduler
            .generate(Money::from_cents(10_000_00), rate, &due_dates, Date::new(2024, 1, 1))
            .unwrap();
        let entries = schedule.entries();
        assert_eq!(entries[0].principal_payment(), entries[1].principal_payment());
        assert_eq!(schedule.total_principal(), Money::from_cents(10_000_00));
        assert_eq!(entries.last().unwrap().ending_balance(), Money::zero());
    }

    #[test]
    fn interest_declines_with_balance() {
        let rate = InterestRate::new(dec!(0.06), Frequency::Annual, YearBasis::Commercial365, None);
        let due_dates = vec![Date::new(2024, 2, 1), Date::new(2024, 3, 1), Date::new(2024, 4, 1)];
        let schedule = InvertedPriceScheduler
            .generate(Money::from_cents(10_000_00), rate, &due_dates, Date::new(2024, 1, 1))
            .unwrap();
        let entries = schedule.entries();
        assert!(entries[0].interest_payment() >= entries[2].interest_payment());
    }
}
