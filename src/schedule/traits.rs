use crate::money::Money;
use crate::rates::interestrate::InterestRate;
use crate::schedule::entry::PaymentSchedule;
use crate::time::date::Date;
use crate::utils::errors::Result;

/// Capability shared by every amortization scheduler: produce a
/// [`PaymentSchedule`] from a principal, a rate, a due-date grid, and a
/// disbursement date.
pub trait Scheduler {
    /// Accessor.
    fn generate(
        &self,
        principal: Money,
        rate: InterestRate,
        due_dates: &[Date],
        disbursement_date: Date,
    ) -> Result<PaymentSchedule>;
}
