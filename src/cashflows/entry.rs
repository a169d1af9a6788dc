use crate::money::Money;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// The closed set of cash-flow category tags. External reports key off these
/// names directly, so no free-form string is admitted here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Funds released at disbursement (positive), part of the expected flow.
    ExpectedDisbursement,
    /// Tax withheld at disbursement (negative), part of the expected flow.
    ExpectedTax,
    /// Scheduled interest component (negative), part of the expected flow.
    ExpectedInterest,
    /// Scheduled principal component (negative), part of the expected flow.
    ExpectedPrincipal,
    /// Regular interest actually paid, up to the due date.
    ActualInterest,
    /// Interest actually paid beyond the due date.
    ActualMoraInterest,
    /// Principal actually paid.
    ActualPrincipal,
    /// A fine actually paid.
    ActualFine,
    /// A fine levied (increases the amount owed); not itself a payment.
    FineApplied,
}

/// # CashFlowEntry
/// A frozen cash-flow record: one dated, categorized, tagged amount. Never
/// mutated in place — [`super::item::CashFlowItem`] supersedes an entry by
/// appending a new timeline snapshot, not by editing this struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowEntry {
    amount: Money,
    datetime: NaiveDateTime,
    description: String,
    category: Category,
}

impl CashFlowEntry {
    #[must_use]
    /// Constructs a new value.
    pub fn new(
        amount: Money,
        datetime: NaiveDateTime,
        description: impl Into<String>,
        category: Category,
    ) -> CashFlowEntry {
        CashFlowEntry {
            amount,
            datetime,
            description: description.into(),
            category,
        }
    }

    #[must_use]
    /// Accessor.
    pub const fn amount(&self) -> Money {
        self.amount
    }

    #[must_use]
    /// Accessor.
    pub const fn datetime(&self) -> NaiveDateTime {
        self.datetime
    }

    #[must_use]
    /// Accessor.
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    /// Accessor.
    pub const fn category(&self) -> Category {
        self.category
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn exposes_its_fields() {
        let dt = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let entry = CashFlowEntry::new(Money::from_cents(1000), dt, "principal", Category::ActualPrincipal);
        assert_eq!(entry.amount(), Money::from_cents(1000));
        assert_eq!(entry.datetime(), dt);
        assert_eq!(entry.category(), Category::ActualPrincipal);
    }
}
