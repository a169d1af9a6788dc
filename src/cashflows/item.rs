use crate::cashflows::entry::CashFlowEntry;
use crate::time::clock::TimeContext;
use chrono::NaiveDateTime;

/// A single timeline snapshot: either an entry becoming effective, or a
/// tombstone marking the item deleted as of that date.
#[derive(Debug, Clone, PartialEq)]
enum Snapshot {
    Entry(CashFlowEntry),
    Tombstone,
}

/// # CashFlowItem
/// A temporal container wrapping an append-only timeline of
/// `(effective_date, entry | tombstone)` snapshots. `resolve(at)` is a
/// last-wins search: the latest snapshot with `effective_date <= at` decides
/// the item's value, or its absence if that snapshot is a tombstone. No
/// snapshot is ever edited or removed — `update`/`delete` both append.
pub struct CashFlowItem {
    timeline: Vec<(NaiveDateTime, Snapshot)>,
    time_context: TimeContext,
}

impl CashFlowItem {
    /// Creates an item already holding one entry, effective immediately at
    /// that entry's own datetime.
    #[must_use]
    pub fn new(entry: CashFlowEntry, time_context: TimeContext) -> CashFlowItem {
        CashFlowItem {
            timeline: vec![(entry.datetime(), Snapshot::Entry(entry))],
            time_context,
        }
    }

    /// Appends a new effective entry to the timeline.
    pub fn update(&mut self, effective: NaiveDateTime, entry: CashFlowEntry) {
        self.timeline.push((effective, Snapshot::Entry(entry)));
    }

    /// Appends a tombstone, marking the item deleted as of `effective`.
    pub fn delete(&mut self, effective: NaiveDateTime) {
        self.timeline.push((effective, Snapshot::Tombstone));
    }

    /// The latest entry with `effective_date <= at`, or `None` if no
    /// snapshot qualifies or the latest qualifying one is a tombstone.
    #[must_use]
    pub fn resolve(&self, at: NaiveDateTime) -> Option<CashFlowEntry> {
        self.timeline
            .iter()
            .filter(|(effective, _)| *effective <= at)
            .max_by_key(|(effective, _)| *effective)
            .and_then(|(_, snapshot)| match snapshot {
                Snapshot::Entry(entry) => Some(entry.clone()),
                Snapshot::Tombstone => None,
            })
    }

    /// `resolve` at the shared `TimeContext`'s current time.
    #[must_use]
    pub fn resolve_now(&self) -> Option<CashFlowEntry> {
        self.resolve(self.time_context.now())
    }

    #[must_use]
    /// Accessor.
    pub fn time_context(&self) -> &TimeContext {
        &self.time_context
    }

    /// Copies the full timeline into a new item observing `time_context`
    /// instead of this item's own. Used to deep-clone a `Loan`'s cash flows
    /// so the clone's items share the clone's `TimeContext`, not the
    /// original's.
    #[must_use]
    pub fn clone_with_context(&self, time_context: TimeContext) -> CashFlowItem {
        CashFlowItem {
            timeline: self.timeline.clone(),
            time_context,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cashflows::entry::Category;
    use crate::money::Money;
    use chrono::NaiveDate;

    fn dt(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    #[test]
    fn resolve_returns_none_before_first_snapshot() {
        let entry = CashFlowEntry::new(Money::from_cents(100), dt(2024, 1, 10), "x", Category::ActualPrincipal);
        let item = CashFlowItem::new(entry, TimeContext::new());
        assert_eq!(item.resolve(dt(2024, 1, 1)), None);
    }

    #[test]
    fn resolve_is_last_wins() {
        let original = CashFlowEntry::new(Money::from_cents(100), dt(2024, 1, 10), "x", Category::ActualPrincipal);
        let mut item = CashFlowItem::new(original.clone(), TimeContext::new());
        let revised = CashFlowEntry::new(Money::from_cents(200), dt(2024, 1, 10), "x", Category::ActualPrincipal);
        item.update(dt(2024, 1, 15), revised.clone());
        assert_eq!(item.resolve(dt(2024, 1, 12)), Some(original));
        assert_eq!(item.resolve(dt(2024, 1, 20)), Some(revised));
    }

    #[test]
    fn delete_appends_tombstone_without_erasing_history() {
        let entry = CashFlowEntry::new(Money::from_cents(100), dt(2024, 1, 10), "x", Category::ActualPrincipal);
        let mut item = CashFlowItem::new(entry.clone(), TimeContext::new());
        item.delete(dt(2024, 1, 20));
        assert_eq!(item.resolve(dt(2024, 1, 15)), Some(entry));
        assert_eq!(item.resolve(dt(2024, 1, 25)), None);
    }
}
