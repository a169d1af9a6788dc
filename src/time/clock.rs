use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, RwLock};

/// Process-global default timezone offset (seconds east of UTC), used only to
/// *attach* a zone to a naive date-time at an API boundary, never to shift
/// its wall-clock value. Loading an actual timezone database is out of
/// scope; callers configure the single offset this process should assume.
static DEFAULT_OFFSET_SECONDS: AtomicI32 = AtomicI32::new(0);

/// Sets the process-global default timezone offset, in seconds east of UTC.
pub fn set_default_timezone_offset_seconds(seconds: i32) {
    DEFAULT_OFFSET_SECONDS.store(seconds, Ordering::SeqCst);
}

/// Reads the process-global default timezone offset, in seconds east of UTC.
#[must_use]
pub fn default_timezone_offset_seconds() -> i32 {
    DEFAULT_OFFSET_SECONDS.load(Ordering::SeqCst)
}

/// Attaches (does not convert) the process default timezone to a naive
/// date-time, per the "coercion of naive date-times at API boundaries" rule.
#[must_use]
pub fn attach_default_timezone(naive: NaiveDateTime) -> DateTime<FixedOffset> {
    DateTime::from_naive_utc_and_offset(naive, offset_or_utc(default_timezone_offset_seconds()))
}

/// `FixedOffset::east_opt` only returns `None` outside +/-86400 seconds;
/// an out-of-range configured offset falls back to UTC rather than panicking.
#[allow(clippy::unwrap_used)]
fn offset_or_utc(seconds: i32) -> FixedOffset {
    FixedOffset::east_opt(seconds).unwrap_or_else(|| FixedOffset::east_opt(0).unwrap())
}

/// Where a [`TimeContext`] draws `now()` from.
#[derive(Debug, Clone, Copy)]
pub enum TimeSource {
    /// The process wall clock, via `chrono::Utc::now()`.
    Live,
    /// A fixed instant, used by [`crate::warp::Warp`] to observe a loan as of
    /// a specific date.
    Fixed(NaiveDateTime),
}

impl TimeSource {
    fn now(&self) -> NaiveDateTime {
        match self {
            TimeSource::Live => Utc::now().naive_utc(),
            TimeSource::Fixed(dt) => *dt,
        }
    }
}

/// # TimeContext
/// A shared, overridable clock. A `Loan` owns one `TimeContext` and every
/// `CashFlowItem` it creates holds the same shared handle, so a single
/// `override_source` call is observed everywhere at once — this is the
/// systems-language shape of "monkey-patched time" in the reference material.
///
/// Cloning a `TimeContext` is a **deep clone**: it snapshots the current
/// source into a brand new, independent cell. This is what lets
/// [`crate::warp::Warp`] override time on a cloned loan without the override
/// leaking back to the original — `Arc::clone` would share the cell and
/// violate that isolation, so `Clone` is implemented by hand.
#[derive(Debug)]
pub struct TimeContext {
    inner: Arc<RwLock<TimeSource>>,
}

impl Default for TimeContext {
    fn default() -> Self {
        TimeContext {
            inner: Arc::new(RwLock::new(TimeSource::Live)),
        }
    }
}

impl Clone for TimeContext {
    fn clone(&self) -> Self {
        #[allow(clippy::unwrap_used)]
        let current = *self.inner.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        TimeContext {
            inner: Arc::new(RwLock::new(current)),
        }
    }
}

impl TimeContext {
    #[must_use]
    /// Constructs a new value.
    pub fn new() -> TimeContext {
        TimeContext::default()
    }

    /// Current time according to this context's source.
    #[must_use]
    pub fn now(&self) -> NaiveDateTime {
        self.inner
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .now()
    }

    /// Overrides the time source observed by this context and every handle
    /// sharing it.
    pub fn override_source(&self, source: TimeSource) {
        *self.inner.write().unwrap_or_else(std::sync::PoisonError::into_inner) = source;
    }

    /// Restores the live wall clock.
    pub fn clear(&self) {
        self.override_source(TimeSource::Live);
    }

    /// A shared handle to this same context (true `Arc::clone`, not a deep
    /// clone): overrides made through either handle are observed by both.
    /// This is how a `Loan` hands its `TimeContext` to the `CashFlowItem`s it
    /// creates.
    #[must_use]
    pub fn share(&self) -> TimeContext {
        TimeContext {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn override_is_observed_by_shared_handle() {
        let ctx = TimeContext::new();
        let shared = ctx.share();
        let fixed = NaiveDate::from_ymd_opt(2024, 1, 20)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        ctx.override_source(TimeSource::Fixed(fixed));
        assert_eq!(shared.now(), fixed);
    }

    #[test]
    fn deep_clone_does_not_share_override() {
        let ctx = TimeContext::new();
        let fixed = NaiveDate::from_ymd_opt(2024, 1, 20)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let clone = ctx.clone();
        clone.override_source(TimeSource::Fixed(fixed));
        assert_ne!(ctx.now(), clone.now());
    }
}
