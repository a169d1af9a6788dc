/// Frozen `PaymentScheduleEntry` rows and the `PaymentSchedule` they form.
pub mod entry;
/// Constant-amortization (SAC) scheduler.
pub mod inverted_price;
/// French / constant-payment scheduler.
pub mod price;
/// The `Scheduler` capability trait shared by both scheduler kinds.
pub mod traits;

use crate::money::Money;
use crate::rates::interestrate::InterestRate;
use crate::schedule::entry::PaymentSchedule;
use crate::schedule::inverted_price::InvertedPriceScheduler;
use crate::schedule::price::PriceScheduler;
use crate::schedule::traits::Scheduler;
use crate::time::date::Date;
use crate::utils::errors::Result;
use serde::{Deserialize, Serialize};

/// Sum type over the two scheduler kinds a `Loan` can be configured with.
/// Preferred over an open-world trait-object hierarchy since the set of
/// scheduler kinds is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedulerKind {
    /// Variant value.
    Price,
    /// Variant value.
    InvertedPrice,
}

impl SchedulerKind {
    /// Accessor.
    pub fn generate(
        self,
        principal: Money,
        rate: InterestRate,
        due_dates: &[Date],
        disbursement_date: Date,
    ) -> Result<PaymentSchedule> {
        match self {
            SchedulerKind::Price => PriceScheduler.generate(principal, rate, due_dates, disbursement_date),
            SchedulerKind::InvertedPrice => {
                InvertedPriceScheduler.generate(principal, rate, due_dates, disbursement_date)
            }
        }
    }
}
