use crate::loan::state::Loan;
use crate::time::clock::TimeSource;
use crate::time::date::Date;
use crate::utils::errors::{EngineError, Result};
use std::sync::atomic::{AtomicBool, Ordering};

/// Process-global single-slot guard: only one `Warp` may be active anywhere
/// in the process at a time. A second `enter` while one is active fails with
/// `NestedWarp` rather than silently nesting.
static WARP_ACTIVE: AtomicBool = AtomicBool::new(false);

/// # Warp
/// A scoped observation of a loan as of a fixed date. Holds a deep clone of
/// the loan (its own `TimeContext`, so overriding time on the clone never
/// touches the original) with late fines pre-computed up to `date`. Dropping
/// the `Warp` releases the process-global slot; the clone and any mutation
/// performed on it through [`Warp::loan_mut`] is discarded.
pub struct Warp {
    loan: Loan,
}

impl Warp {
    /// Enters a warp over a deep clone of `loan`, observed as of `date`.
    pub fn enter(loan: &Loan, date: Date) -> Result<Warp> {
        if WARP_ACTIVE.swap(true, Ordering::SeqCst) {
            return Err(EngineError::NestedWarp);
        }
        let mut clone = loan.deep_clone();
        let fixed = date.base_date().and_hms_opt(0, 0, 0).ok_or_else(|| {
            WARP_ACTIVE.store(false, Ordering::SeqCst);
            EngineError::InvalidDate(format!("cannot warp to {date}"))
        })?;
        clone.time_context().override_source(TimeSource::Fixed(fixed));
        if let Err(e) = clone.calculate_late_fines(date) {
            WARP_ACTIVE.store(false, Ordering::SeqCst);
            return Err(e);
        }
        Ok(Warp { loan: clone })
    }

    /// Read-only access to the warped clone.
    #[must_use]
    pub fn loan(&self) -> &Loan {
        &self.loan
    }

    /// Mutable access to the warped clone; mutations are visible only for
    /// the lifetime of this `Warp` and are discarded when it drops.
    pub fn loan_mut(&mut self) -> &mut Loan {
        &mut self.loan
    }
}

impl Drop for Warp {
    fn drop(&mut self) {
        WARP_ACTIVE.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::rates::enums::{Frequency, YearBasis};
    use crate::rates::interestrate::InterestRate;
    use crate::schedule::SchedulerKind;
    use rust_decimal_macros::dec;

    fn sample_loan() -> Loan {
        let rate = InterestRate::new(dec!(0.06), Frequency::Annual, YearBasis::Commercial365, None);
        let due_dates = vec![Date::new(2024, 2, 1), Date::new(2024, 3, 1)];
        Loan::new(
            Money::from_cents(10_000_00),
            rate,
            due_dates,
            Date::new(2024, 1, 1),
            SchedulerKind::Price,
            dec!(0.02),
            0,
            None,
            crate::loan::state::MoraStrategy::Compound,
            None,
        )
        .unwrap()
    }

    #[test]
    fn warp_observes_the_clone_without_mutating_the_original() {
        let loan = sample_loan();
        let original_balance = loan.current_balance();
        {
            let mut warp = Warp::enter(&loan, Date::new(2024, 2, 15)).unwrap();
            warp.loan_mut()
                .record_payment(Money::from_cents(1_000_00), Date::new(2024, 2, 15), None, None, false)
                .unwrap();
            assert!(warp.loan().current_balance() < original_balance);
        }
        assert_eq!(loan.current_balance(), original_balance);
    }

    #[test]
    fn nested_warp_is_rejected() {
        let loan = sample_loan();
        let _outer = Warp::enter(&loan, Date::new(2024, 2, 15)).unwrap();
        let inner = Warp::enter(&loan, Date::new(2024, 2, 20));
        assert!(matches!(inner, Err(EngineError::NestedWarp)));
    }

    #[test]
    fn warp_slot_is_released_on_drop_so_a_later_warp_can_enter() {
        let loan = sample_loan();
        {
            let _warp = Warp::enter(&loan, Date::new(2024, 2, 15)).unwrap();
        }
        assert!(Warp::enter(&loan, Date::new(2024, 2, 20)).is_ok());
    }
}
