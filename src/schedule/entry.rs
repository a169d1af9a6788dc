use crate::money::Money;
use crate::time::date::Date;
use serde::{Deserialize, Serialize};

/// # PaymentScheduleEntry
/// One frozen row of an amortization schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaymentScheduleEntry {
    payment_number: u32,
    due_date: Date,
    days_in_period: i64,
    beginning_balance: Money,
    payment_amount: Money,
    principal_payment: Money,
    interest_payment: Money,
    ending_balance: Money,
}

impl PaymentScheduleEntry {
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    /// Constructs a new value.
    pub const fn new(
        payment_number: u32,
        due_date: Date,
        days_in_period: i64,
        beginning_balance: Money,
        payment_amount: Money,
        principal_payment: Money,
        interest_payment: Money,
        ending_balance: Money,
    ) -> PaymentScheduleEntry {
        PaymentScheduleEntry {
            payment_number,
            due_date,
            days_in_period,
            beginning_balance,
            payment_amount,
            principal_payment,
            interest_payment,
            ending_balance,
        }
    }

    #[must_use]
    /// Accessor.
    pub const fn payment_number(&self) -> u32 {
        self.payment_number
    }

    #[must_use]
    /// Accessor.
    pub const fn due_date(&self) -> Date {
        self.due_date
    }

    #[must_use]
    /// Accessor.
    pub const fn days_in_period(&self) -> i64 {
        self.days_in_period
    }

    #[must_use]
    /// Accessor.
    pub const fn beginning_balance(&self) -> Money {
        self.beginning_balance
    }

    #[must_use]
    /// Accessor.
    pub const fn payment_amount(&self) -> Money {
        self.payment_amount
    }

    #[must_use]
    /// Accessor.
    pub const fn principal_payment(&self) -> Money {
        self.principal_payment
    }

    #[must_use]
    /// Accessor.
    pub const fn interest_payment(&self) -> Money {
        self.interest_payment
    }

    #[must_use]
    /// Accessor.
    pub const fn ending_balance(&self) -> Money {
        self.ending_balance
    }
}

/// # PaymentSchedule
/// An ordered list of [`PaymentScheduleEntry`] rows plus aggregate totals.
/// Invariant: `beginning_balance[k+1] == ending_balance[k]`,
/// `sum(principal_payment) == original principal` to the cent, and
/// `ending_balance[last] == 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSchedule {
    entries: Vec<PaymentScheduleEntry>,
}

impl PaymentSchedule {
    #[must_use]
    /// Constructs a new value.
    pub const fn new(entries: Vec<PaymentScheduleEntry>) -> PaymentSchedule {
        PaymentSchedule { entries }
    }

    #[must_use]
    /// Accessor.
    pub fn entries(&self) -> &[PaymentScheduleEntry] {
        &self.entries
    }

    #[must_use]
    /// Accessor.
    pub fn total_payments(&self) -> Money {
        self.entries.iter().fold(Money::zero(), |acc, e| acc + e.payment_amount())
    }

    #[must_use]
    /// Accessor.
    pub fn total_interest(&self) -> Money {
        self.entries.iter().fold(Money::zero(), |acc, e| acc + e.interest_payment())
    }

    #[must_use]
    /// Accessor.
    pub fn total_principal(&self) -> Money {
        self.entries.iter().fold(Money::zero(), |acc, e| acc + e.principal_payment())
    }
}
