use crate::money::Money;
use crate::time::date::Date;

/// # SettlementAllocation
/// How much of one payment landed on a single installment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettlementAllocation {
    /// Field value.
    pub installment_number: u32,
    /// Field value.
    pub principal: Money,
    /// Field value.
    pub interest: Money,
    /// Field value.
    pub mora: Money,
    /// Field value.
    pub fine: Money,
    /// Field value.
    pub is_fully_covered: bool,
}

/// # Settlement
/// The allocation result of one recorded payment. Always reconstructed from
/// the cash-flow stream at read time; never stored separately on `Loan`.
#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    /// Field value.
    pub payment_amount: Money,
    /// Field value.
    pub payment_date: Date,
    /// Field value.
    pub fine_paid: Money,
    /// Field value.
    pub interest_paid: Money,
    /// Field value.
    pub mora_paid: Money,
    /// Field value.
    pub principal_paid: Money,
    /// Field value.
    pub remaining_balance: Money,
    /// Field value.
    pub allocations: Vec<SettlementAllocation>,
}

/// # Installment
/// A derived view of one scheduled period, as of the loan's current time.
/// `allocations` lists every recorded-payment slice that landed any amount
/// on this installment, in the order those payments were recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct Installment {
    /// Field value.
    pub number: u32,
    /// Field value.
    pub due_date: Date,
    /// Field value.
    pub days_in_period: i64,
    /// Field value.
    pub expected_payment: Money,
    /// Field value.
    pub expected_principal: Money,
    /// Field value.
    pub expected_interest: Money,
    /// Field value.
    pub expected_mora: Money,
    /// Field value.
    pub expected_fine: Money,
    /// Field value.
    pub principal_paid: Money,
    /// Field value.
    pub interest_paid: Money,
    /// Field value.
    pub mora_paid: Money,
    /// Field value.
    pub fine_paid: Money,
    /// Field value.
    pub allocations: Vec<SettlementAllocation>,
}

impl Installment {
    #[must_use]
    /// Accessor.
    pub fn expected_total(&self) -> Money {
        self.expected_payment + self.expected_mora + self.expected_fine
    }

    #[must_use]
    /// Accessor.
    pub fn paid_total(&self) -> Money {
        self.principal_paid + self.interest_paid + self.mora_paid + self.fine_paid
    }

    /// `expected_total - paid_total`, clamped to zero.
    #[must_use]
    pub fn balance(&self) -> Money {
        (self.expected_total() - self.paid_total()).clamp_min_zero()
    }

    #[must_use]
    /// Accessor.
    pub fn is_fully_paid(&self) -> bool {
        self.balance().is_zero()
    }

    #[must_use]
    /// Accessor.
    pub fn is_overdue(&self, as_of: Date) -> bool {
        !self.is_fully_paid() && self.due_date < as_of
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Installment {
        Installment {
            number: 1,
            due_date: Date::new(2024, 2, 1),
            days_in_period: 31,
            expected_payment: Money::from_cents(100_000),
            expected_principal: Money::from_cents(90_000),
            expected_interest: Money::from_cents(10_000),
            expected_mora: Money::zero(),
            expected_fine: Money::zero(),
            principal_paid: Money::zero(),
            interest_paid: Money::zero(),
            mora_paid: Money::zero(),
            fine_paid: Money::zero(),
            allocations: Vec::new(),
        }
    }

    #[test]
    fn balance_is_expected_minus_paid() {
        let mut installment = sample();
        installment.principal_paid = Money::from_cents(90_000);
        installment.interest_paid = Money::from_cents(10_000);
        assert!(installment.is_fully_paid());
        assert_eq!(installment.balance(), Money::zero());
    }

    #[test]
    fn overdue_only_when_unpaid_and_past_due() {
        let installment = sample();
        assert!(installment.is_overdue(Date::new(2024, 3, 1)));
        assert!(!installment.is_overdue(Date::new(2024, 1, 1)));
    }
}
