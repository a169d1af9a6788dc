use crate::cashflows::entry::CashFlowEntry;
use crate::money::Money;
use crate::rates::interestrate::InterestRate;
use crate::time::date::Date;
use crate::utils::errors::Result;

/// The number of calendar days between the valuation date and an entry's
/// date, clamped to zero for entries on or before the valuation date (they
/// are treated as already realized, never discounted into the future).
fn days_from(valuation_date: Date, entry: &CashFlowEntry) -> i64 {
    valuation_date.days_until_clamped(Date::from(entry.datetime().date()))
}

/// Present value of a set of cash flows at `rate`, discounting each entry
/// from `valuation_date` (defaulting to the earliest entry's date when
/// `None`). This is also the engine's NPV: the two names denote the same
/// computation applied to different flow sets.
pub fn present_value(
    entries: &[CashFlowEntry],
    rate: InterestRate,
    valuation_date: Option<Date>,
) -> Result<Money> {
    let valuation_date = match valuation_date {
        Some(d) => d,
        None => entries
            .iter()
            .map(|e| Date::from(e.datetime().date()))
            .min()
            .unwrap_or_else(|| Date::new(1970, 1, 1)),
    };

    let mut total = Money::zero();
    for entry in entries {
        let days = days_from(valuation_date, entry);
        let factor = rate.discount_factor(days)?;
        total += entry.amount().mul_scalar(factor);
    }
    Ok(total)
}

/// Present value of a level `payment` received every `period_days` for
/// `num_periods` periods, the first one `period_days` after the valuation
/// date.
pub fn present_value_of_annuity(
    payment: Money,
    rate: InterestRate,
    period_days: i64,
    num_periods: u32,
) -> Result<Money> {
    let mut total = Money::zero();
    for k in 1..=i64::from(num_periods) {
        let factor = rate.discount_factor(period_days * k)?;
        total += payment.mul_scalar(factor);
    }
    Ok(total)
}

/// Present value of a level `payment` received every `period_days` forever:
/// `payment / periodic_rate`, where `periodic_rate` is the rate compounded
/// over one `period_days` span.
pub fn present_value_of_perpetuity(payment: Money, rate: InterestRate, period_days: i64) -> Result<Money> {
    let periodic_rate = rate.compound_factor(period_days)? - rust_decimal::Decimal::ONE;
    payment.div_scalar(periodic_rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cashflows::entry::Category;
    use crate::rates::enums::{Frequency, YearBasis};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn dt(y: i32, m: u32, d: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    #[test]
    fn zero_rate_present_value_equals_sum_of_flows() {
        let rate = InterestRate::new(dec!(0), Frequency::Annual, YearBasis::Commercial365, None);
        let entries = vec![
            CashFlowEntry::new(Money::from_cents(100_00), dt(2024, 2, 1), "a", Category::ExpectedPrincipal),
            CashFlowEntry::new(Money::from_cents(200_00), dt(2024, 3, 1), "b", Category::ExpectedPrincipal),
        ];
        let pv = present_value(&entries, rate, Some(Date::new(2024, 1, 1))).unwrap();
        assert_eq!(pv, Money::from_cents(300_00));
    }

    #[test]
    fn past_flows_are_not_discounted() {
        let rate = InterestRate::new(dec!(0.12), Frequency::Annual, YearBasis::Commercial365, None);
        let entries = vec![CashFlowEntry::new(
            Money::from_cents(100_00),
            dt(2024, 1, 1),
            "a",
            Category::ExpectedPrincipal,
        )];
        let pv = present_value(&entries, rate, Some(Date::new(2024, 6, 1))).unwrap();
        assert_eq!(pv, Money::from_cents(100_00));
    }

    #[test]
    fn positive_rate_discounts_future_flows_below_face_value() {
        let rate = InterestRate::new(dec!(0.12), Frequency::Annual, YearBasis::Commercial365, None);
        let entries = vec![CashFlowEntry::new(
            Money::from_cents(100_00),
            dt(2025, 1, 1),
            "a",
            Category::ExpectedPrincipal,
        )];
        let pv = present_value(&entries, rate, Some(Date::new(2024, 1, 1))).unwrap();
        assert!(pv < Money::from_cents(100_00));
    }
}
