use crate::money::Money;
use crate::rates::interestrate::InterestRate;
use crate::schedule::entry::{PaymentSchedule, PaymentScheduleEntry};
use crate::schedule::traits::Scheduler;
use crate::time::date::Date;
use crate::utils::errors::{EngineError, Result};

/// # PriceScheduler
/// French / constant-payment amortization. The payment identity
/// `P · Σ_k (1+r)^(−d_k) = principal` is linear in `P` given the daily rate
/// `r` and the day grid, so `P` is solved directly by division — no
/// root-finder needed here (unlike [`crate::tax::grossup`] and
/// [`crate::tvm::irr`], whose identities are not linear in the unknown).
/// # Examples
/// ```
/// use loancore::schedule::price::PriceScheduler;
/// use loancore::schedule::traits::Scheduler;
/// use loancore::rates::interestrate::InterestRate;
/// use loancore::rates::enums::{Frequency, YearBasis};
/// use loancore::time::date::Date;
/// use loancore::money::Money;
/// use rust_decimal_macros::dec;
///
/// let rate = InterestRate::new(dec!(0.0), Frequency::Annual, YearBasis::Commercial365, None);
/// let due_dates = vec![Date::new(2024, 2, 1), Date::new(2024, 3, 1)];
/// let schedule = PriceScheduler.generate(Money::from_cents(10_000_00), rate, &due_dates, Date::new(2024, 1, 1)).unwrap();
/// assert_eq!(schedule.entries().last().unwrap().ending_balance(), Money::zero());
/// ```
pub struct PriceScheduler;

impl Scheduler for PriceScheduler {
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

        let mut discount_sum = rust_decimal::Decimal::ZERO;
        for due in due_dates {
            let days = *due - disbursement_date;
            discount_sum += rate.discount_factor(days)?;
        }
        if discount_sum.is_zero() {
            return Err(EngineError::InvalidInput(
                "schedule discount sum collapsed to zero".to_string(),
            ));
        }
        let payment = principal.div_scalar(discount_sum)?;

        let mut entries = Vec::with_capacity(due_dates.len());
        let mut beginning_balance = principal;
        let mut previous_date = disbursement_date;

        for (idx, due) in due_dates.iter().enumerate() {
            let days_in_period = *due - previous_date;
            let is_last = idx + 1 == due_dates.len();

            let accrued = rate.accrue(beginning_balance, days_in_period)?;
            let interest_payment = accrued - beginning_balance;

            let (payment_amount, principal_payment) = if is_last {
                (beginning_balance + interest_payment, beginning_balance)
            } else {
                (payment, payment - interest_payment)
            };

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
    fn zero_rate_splits_principal_evenly() {
        let rate = InterestRate::new(dec!(0.0), Frequency::Annual, YearBasis::Commercial365, None);
        let due_dates: Vec<Date> = (1..=12)
            .map(|m| Date::new(2024, 1, 1).advance(m, crate::time::enums::TimeUnit::Months))
            .collect();
        let schedule = PriceScheduler
            .generate(Money::from_cents(10_000_00), rate, &due_dates, Date::new(2024, 1, 1))
            .unwrap();
        let entries = schedule.entries();
        for entry in &entries[..11] {
            assert_eq!(entry.payment_amount(), Money::from_cents(83333));
        }
        assert_eq!(schedule.total_principal(), Money::from_cents(10_000_00));
        assert_eq!(entries.last().unwrap().ending_balance(), Money::zero());
    }

    #[test]
    fn beginning_balance_chains_from_previous_ending_balance() {
        let rate = InterestRate::new(dec!(0.06), Frequency::Annual, YearBasis::Commercial365, None);
        let due_dates = vec![Date::new(2024, 2, 1), Date::new(2024, 3, 1), Date::new(2024, 4, 1)];
        let schedule = PriceScheduler
            .generate(Money::from_cents(10_000_00), rate, &due_dates, Date::new(2024, 1, 1))
            .unwrap();
        let entries = schedule.entries();
        for w in entries.windows(2) {
            assert_eq!(w[0].ending_balance(), w[1].beginning_balance());
        }
        assert_eq!(entries.last().unwrap().ending_balance(), Money::zero());
    }

    #[test]
    fn single_payment_covers_full_principal_and_accrued_interest() {
        let rate = InterestRate::new(dec!(0.06), Frequency::Annual, YearBasis::Commercial365, None);
        let due_dates = vec![Date::new(2024, 2, 1)];
        let schedule = PriceScheduler
            .generate(Money::from_cents(10_000_00), rate, &due_dates, Date::new(2024, 1, 1))
            .unwrap();
        let entry = &schedule.entries()[0];
        assert_eq!(entry.principal_payment(), Money::from_cents(10_000_00));
        assert_eq!(entry.ending_balance(), Money::zero());
    }
}
