use crate::money::Money;
use crate::schedule::entry::PaymentSchedule;
use crate::tax::traits::{BaseTax, TaxInstallment, TaxResult};
use crate::time::date::Date;
use crate::utils::errors::Result;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// How the two IOF components are rounded before summing into a per
/// installment tax amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IofRounding {
    /// Round the sum of both components once.
    Precise,
    /// Round each component to the cent independently, then sum.
    PerComponent,
}

const MAX_DAILY_DAYS: i64 = 365;

/// # IOF
/// Brazilian-style transaction tax: a daily rate applied to principal times
/// days outstanding (capped at `max_daily_days`), plus a flat additional
/// rate, per installment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IOF {
    daily_rate: Decimal,
    additional_rate: Decimal,
    rounding: IofRounding,
}

impl IOF {
    #[must_use]
    /// Constructs a new value.
    pub fn new(daily_rate: Decimal, additional_rate: Decimal, rounding: IofRounding) -> IOF {
        IOF { daily_rate, additional_rate, rounding }
    }

    /// Jurisdictional defaults for a natural-person borrower.
    #[must_use]
    pub fn individual() -> IOF {
        IOF::new(dec!(0.000082), dec!(0.0038), IofRounding::Precise)
    }

    /// Jurisdictional defaults for a corporate borrower.
    #[must_use]
    pub fn corporate() -> IOF {
        IOF::new(dec!(0.000041), dec!(0.0038), IofRounding::Precise)
    }

    fn installment_tax(&self, principal: Money, days: i64) -> Money {
        let capped_days = Decimal::from(days.clamp(0, MAX_DAILY_DAYS));
        let daily_component = principal.mul_scalar(self.daily_rate * capped_days);
        let additional_component = principal.mul_scalar(self.additional_rate);
        match self.rounding {
            IofRounding::Precise => {
                let combined = Money::new(daily_component.raw() + additional_component.raw()).unwrap_or(Money::zero());
                Money::from_cents(combined.cents())
            }
            IofRounding::PerComponent => {
                Money::from_cents(daily_component.cents()) + Money::from_cents(additional_component.cents())
            }
        }
    }
}

impl BaseTax for IOF {
    fn calculate(&self, schedule: &PaymentSchedule, disbursement_date: Date) -> Result<TaxResult> {
        let mut total = Money::zero();
        let mut per_installment = Vec::with_capacity(schedule.entries().len());
        for entry in schedule.entries() {
            let days = entry.due_date() - disbursement_date;
            let tax_amount = self.installment_tax(entry.principal_payment(), days);
            total += tax_amount;
            per_installment.push(TaxInstallment {
                payment_number: entry.payment_number(),
                due_date: entry.due_date(),
                principal_payment: entry.principal_payment(),
                tax_amount,
            });
        }
        Ok(TaxResult { total, per_installment })
    }

    fn clone_box(&self) -> Box<dyn BaseTax> {
        Box::new(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::enums::{Frequency, YearBasis};
    use crate::rates::interestrate::InterestRate;
    use crate::schedule::price::PriceScheduler;
    use crate::schedule::traits::Scheduler;

    fn sample_schedule() -> PaymentSchedule {
        let rate = InterestRate::new(dec!(0.01), Frequency::Monthly, YearBasis::Commercial365, None);
        let due_dates = vec![Date::new(2024, 2, 1), Date::new(2024, 3, 1)];
        PriceScheduler.generate(Money::from_cents(10_000_00), rate, &due_dates, Date::new(2024, 1, 1)).unwrap()
    }

    #[test]
    fn precise_rounding_rounds_the_sum_once() {
        let iof = IOF::new(dec!(0.0001), dec!(0.0038), IofRounding::Precise);
        let schedule = sample_schedule();
        let result = iof.calculate(&schedule, Date::new(2024, 1, 1)).unwrap();
        assert!(result.total.is_positive());
        assert_eq!(result.per_installment.len(), 2);
    }

    #[test]
    fn per_component_rounds_each_piece_independently() {
        let iof = IOF::new(dec!(0.0001), dec!(0.0038), IofRounding::PerComponent);
        let schedule = sample_schedule();
        let result = iof.calculate(&schedule, Date::new(2024, 1, 1)).unwrap();
        assert!(result.total.is_positive());
    }

    #[test]
    fn days_are_capped_at_max_daily_days() {
        let iof = IOF::individual();
        let far_future_tax = iof.installment_tax(Money::from_cents(100_000_00), 10_000);
        let capped_tax = iof.installment_tax(Money::from_cents(100_000_00), MAX_DAILY_DAYS);
        assert_eq!(far_future_tax, capped_tax);
    }
}
