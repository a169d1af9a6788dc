use crate::cashflows::entry::{Category, CashFlowEntry};
use crate::cashflows::item::CashFlowItem;
use crate::money::Money;
use crate::time::clock::TimeContext;
use chrono::NaiveDateTime;
use std::cmp::Ordering;

/// # CashFlow
/// An ordered collection of [`CashFlowItem`]s. Public iteration resolves
/// every item at its own shared `TimeContext`'s current time and yields only
/// the non-deleted entries — deleted/not-yet-effective items are silently
/// absent, not surfaced as `None`.
#[derive(Default)]
pub struct CashFlow {
    items: Vec<CashFlowItem>,
}

impl CashFlow {
    #[must_use]
    /// Constructs a new value.
    pub fn new() -> CashFlow {
        CashFlow::default()
    }

    /// Accessor.
    pub fn push(&mut self, item: CashFlowItem) {
        self.items.push(item);
    }

    #[must_use]
    /// Accessor.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    /// Accessor.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Resolves every item at its own `TimeContext`'s current time.
    #[must_use]
    pub fn entries_now(&self) -> Vec<CashFlowEntry> {
        self.items.iter().filter_map(CashFlowItem::resolve_now).collect()
    }

    /// Resolves every item at a fixed point in time.
    #[must_use]
    pub fn entries_at(&self, at: NaiveDateTime) -> Vec<CashFlowEntry> {
        self.items.iter().filter_map(|item| item.resolve(at)).collect()
    }

    /// Starts a query over the entries resolved at the current time.
    #[must_use]
    pub fn query(&self) -> CashFlowQuery {
        CashFlowQuery::new(self.entries_now())
    }

    /// Deep-clones every item's full timeline, rewiring each clone to share
    /// `time_context` instead of whatever context the original items held.
    #[must_use]
    pub fn clone_with_context(&self, time_context: &TimeContext) -> CashFlow {
        CashFlow {
            items: self.items.iter().map(|item| item.clone_with_context(time_context.share())).collect(),
        }
    }
}

/// A fluent filter/terminal builder over a snapshot of resolved entries.
pub struct CashFlowQuery {
    entries: Vec<CashFlowEntry>,
}

impl CashFlowQuery {
    #[must_use]
    fn new(entries: Vec<CashFlowEntry>) -> CashFlowQuery {
        CashFlowQuery { entries }
    }

    #[must_use]
    /// Accessor.
    pub fn category_eq(mut self, category: Category) -> CashFlowQuery {
        self.entries.retain(|e| e.category() == category);
        self
    }

    #[must_use]
    /// Accessor.
    pub fn category_in(mut self, categories: &[Category]) -> CashFlowQuery {
        self.entries.retain(|e| categories.contains(&e.category()));
        self
    }

    #[must_use]
    /// Accessor.
    pub fn datetime_before(mut self, cutoff: NaiveDateTime) -> CashFlowQuery {
        self.entries.retain(|e| e.datetime() < cutoff);
        self
    }

    #[must_use]
    /// Accessor.
    pub fn datetime_after(mut self, cutoff: NaiveDateTime) -> CashFlowQuery {
        self.entries.retain(|e| e.datetime() > cutoff);
        self
    }

    #[must_use]
    /// Accessor.
    pub fn datetime_between(mut self, start: NaiveDateTime, end: NaiveDateTime) -> CashFlowQuery {
        self.entries.retain(|e| e.datetime() >= start && e.datetime() <= end);
        self
    }

    #[must_use]
    /// Accessor.
    pub fn amount_at_least(mut self, minimum: Money) -> CashFlowQuery {
        self.entries.retain(|e| e.amount() >= minimum);
        self
    }

    #[must_use]
    /// Accessor.
    pub fn amount_at_most(mut self, maximum: Money) -> CashFlowQuery {
        self.entries.retain(|e| e.amount() <= maximum);
        self
    }

    #[must_use]
    /// Accessor.
    pub fn exclude_category(mut self, category: Category) -> CashFlowQuery {
        self.entries.retain(|e| e.category() != category);
        self
    }

    #[must_use]
    /// Accessor.
    pub fn order_by_datetime(mut self) -> CashFlowQuery {
        self.entries.sort_by(|a, b| a.datetime().cmp(&b.datetime()));
        self
    }

    #[must_use]
    /// Accessor.
    pub fn order_by_amount(mut self) -> CashFlowQuery {
        self.entries
            .sort_by(|a, b| a.amount().partial_cmp(&b.amount()).unwrap_or(Ordering::Equal));
        self
    }

    #[must_use]
    /// Accessor.
    pub fn limit(mut self, n: usize) -> CashFlowQuery {
        self.entries.truncate(n);
        self
    }

    #[must_use]
    /// Accessor.
    pub fn offset(mut self, n: usize) -> CashFlowQuery {
        self.entries = self.entries.into_iter().skip(n).collect();
        self
    }

    #[must_use]
    /// Accessor.
    pub fn all(self) -> Vec<CashFlowEntry> {
        self.entries
    }

    #[must_use]
    /// Accessor.
    pub fn first(self) -> Option<CashFlowEntry> {
        self.entries.into_iter().next()
    }

    #[must_use]
    /// Accessor.
    pub fn sum(&self) -> Money {
        self.entries.iter().fold(Money::zero(), |acc, e| acc + e.amount())
    }

    #[must_use]
    /// Accessor.
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Materializes the filtered entries back into a standalone `CashFlow`,
    /// each wrapped in a fresh single-snapshot item sharing `time_context`.
    #[must_use]
    pub fn to_flow(self, time_context: &TimeContext) -> CashFlow {
        let mut flow = CashFlow::new();
        for entry in self.entries {
            flow.push(CashFlowItem::new(entry, time_context.share()));
        }
        flow
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    fn flow_with(entries: Vec<(Money, NaiveDateTime, Category)>) -> CashFlow {
        let mut flow = CashFlow::new();
        for (amount, datetime, category) in entries {
            let entry = CashFlowEntry::new(amount, datetime, "x", category);
            flow.push(CashFlowItem::new(entry, TimeContext::new()));
        }
        flow
    }

    #[test]
    fn query_filters_by_category() {
        let flow = flow_with(vec![
            (Money::from_cents(100), dt(2024, 1, 1), Category::ActualPrincipal),
            (Money::from_cents(200), dt(2024, 1, 2), Category::ActualInterest),
        ]);
        let result = flow.query().category_eq(Category::ActualPrincipal).all();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].amount(), Money::from_cents(100));
    }

    #[test]
    fn query_sum_and_count() {
        let flow = flow_with(vec![
            (Money::from_cents(100), dt(2024, 1, 1), Category::ActualPrincipal),
            (Money::from_cents(200), dt(2024, 1, 2), Category::ActualPrincipal),
        ]);
        let query = flow.query().category_eq(Category::ActualPrincipal);
        assert_eq!(query.count(), 2);
        assert_eq!(query.sum(), Money::from_cents(300));
    }

    #[test]
    fn query_orders_limits_and_offsets() {
        let flow = flow_with(vec![
            (Money::from_cents(300), dt(2024, 1, 3), Category::ActualPrincipal),
            (Money::from_cents(100), dt(2024, 1, 1), Category::ActualPrincipal),
            (Money::from_cents(200), dt(2024, 1, 2), Category::ActualPrincipal),
        ]);
        let result = flow.query().order_by_datetime().offset(1).limit(1).all();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].amount(), Money::from_cents(200));
    }
}
