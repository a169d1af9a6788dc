use crate::cashflows::entry::{Category, CashFlowEntry};
use crate::cashflows::flow::CashFlow;
use crate::cashflows::item::CashFlowItem;
use crate::loan::installment::{Installment, Settlement, SettlementAllocation};
use crate::money::Money;
use crate::rates::interestrate::InterestRate;
use crate::schedule::entry::{PaymentSchedule, PaymentScheduleEntry};
use crate::schedule::SchedulerKind;
use crate::tax::traits::{BaseTax, TaxResult};
use crate::time::clock::TimeContext;
use crate::time::date::Date;
use crate::utils::errors::{EngineError, Result};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::cell::RefCell;
use std::collections::BTreeMap;

/// Whether mora (late) interest compounds on top of the regular interest
/// accrued for the same period, or accrues independently on the untouched
/// principal balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoraStrategy {
    /// Variant value.
    Compound,
    /// Variant value.
    Simple,
}

fn start_of_day(date: Date) -> NaiveDateTime {
    #[allow(clippy::unwrap_used)]
    date.base_date().and_hms_opt(0, 0, 0).unwrap()
}

/// # Loan
/// The aggregate loan state machine: records payments, derives balances,
/// installments, and settlements on demand, splits late interest into
/// regular and mora components, and applies fines. Mutated only through its
/// public recording operations; every other reader recomputes its answer
/// from `payments`/`fines_applied` rather than from cached mutable state
/// (the one exception, the tax result, is cached because the original
/// schedule it is computed from is immutable for the life of the loan).
pub struct Loan {
    principal: Money,
    interest_rate: InterestRate,
    due_dates: Vec<Date>,
    disbursement_date: Date,
    scheduler_type: SchedulerKind,
    fine_rate: Decimal,
    grace_period_days: i64,
    mora_rate: InterestRate,
    mora_strategy: MoraStrategy,
    taxes: Option<Box<dyn BaseTax>>,
    time_context: TimeContext,
    original_schedule: PaymentSchedule,
    payments: CashFlow,
    schedule_entries: Vec<PaymentScheduleEntry>,
    payment_offsets: Vec<usize>,
    fines_applied: BTreeMap<Date, Money>,
    tax_cache: RefCell<Option<TaxResult>>,
}

#[allow(clippy::too_many_arguments)]
impl Loan {
    /// Constructs a new value.
    pub fn new(
        principal: Money,
        interest_rate: InterestRate,
        mut due_dates: Vec<Date>,
        disbursement_date: Date,
        scheduler_type: SchedulerKind,
        fine_rate: Decimal,
        grace_period_days: i64,
        mora_rate: Option<InterestRate>,
        mora_strategy: MoraStrategy,
        taxes: Option<Box<dyn BaseTax>>,
    ) -> Result<Loan> {
        if !principal.is_positive() {
            return Err(EngineError::InvalidInput("principal must be positive".to_string()));
        }
        if fine_rate < Decimal::ZERO || fine_rate > Decimal::ONE {
            return Err(EngineError::InvalidInput("fine_rate must be in [0, 1]".to_string()));
        }
        if grace_period_days < 0 {
            return Err(EngineError::InvalidInput("grace_period_days must be non-negative".to_string()));
        }
        due_dates.sort();
        let first_due = *due_dates
            .first()
            .ok_or_else(|| EngineError::InvalidInput("at least one due date is required".to_string()))?;
        if disbursement_date >= first_due {
            return Err(EngineError::InvalidInput(
                "disbursement_date must be strictly before the first due date".to_string(),
            ));
        }

        let original_schedule =
            scheduler_type.generate(principal, interest_rate, &due_dates, disbursement_date)?;

        Ok(Loan {
            principal,
            interest_rate,
            due_dates,
            disbursement_date,
            scheduler_type,
            fine_rate,
            grace_period_days,
            mora_rate: mora_rate.unwrap_or(interest_rate),
            mora_strategy,
            taxes,
            time_context: TimeContext::new(),
            original_schedule,
            payments: CashFlow::new(),
            schedule_entries: Vec::new(),
            payment_offsets: vec![0],
            fines_applied: BTreeMap::new(),
            tax_cache: RefCell::new(None),
        })
    }

    #[must_use]
    /// Accessor.
    pub fn now(&self) -> Date {
        Date::from(self.time_context.now().date())
    }

    #[must_use]
    /// Accessor.
    pub fn time_context(&self) -> &TimeContext {
        &self.time_context
    }

    /// A true deep clone: a brand-new `TimeContext` (so overriding time on
    /// the clone never touches `self`), with every payment item rewired to
    /// share that new context. Used by [`crate::warp::Warp`] to observe a
    /// loan without the observation leaking back into the original.
    #[must_use]
    pub fn deep_clone(&self) -> Loan {
        let time_context = self.time_context.clone();
        Loan {
            principal: self.principal,
            interest_rate: self.interest_rate,
            due_dates: self.due_dates.clone(),
            disbursement_date: self.disbursement_date,
            scheduler_type: self.scheduler_type,
            fine_rate: self.fine_rate,
            grace_period_days: self.grace_period_days,
            mora_rate: self.mora_rate,
            mora_strategy: self.mora_strategy,
            taxes: self.taxes.as_ref().map(|t| t.clone_box()),
            payments: self.payments.clone_with_context(&time_context),
            time_context,
            original_schedule: self.original_schedule.clone(),
            schedule_entries: self.schedule_entries.clone(),
            payment_offsets: self.payment_offsets.clone(),
            fines_applied: self.fines_applied.clone(),
            tax_cache: RefCell::new(self.tax_cache.borrow().clone()),
        }
    }

    #[must_use]
    /// Accessor.
    pub const fn principal(&self) -> Money {
        self.principal
    }

    #[must_use]
    /// Accessor.
    pub const fn interest_rate(&self) -> InterestRate {
        self.interest_rate
    }

    #[must_use]
    /// Accessor.
    pub fn due_dates(&self) -> &[Date] {
        &self.due_dates
    }

    #[must_use]
    /// Accessor.
    pub const fn disbursement_date(&self) -> Date {
        self.disbursement_date
    }

    #[must_use]
    /// Accessor.
    pub fn get_original_schedule(&self) -> &PaymentSchedule {
        &self.original_schedule
    }

    // ---- internal ledger reads, all filtered "as of" a date (pre-snapshot rule) ----

    fn paid_principal_as_of(&self, as_of: NaiveDateTime) -> Money {
        self.payments
            .entries_at(as_of)
            .into_iter()
            .filter(|e| e.category() == Category::ActualPrincipal)
            .fold(Money::zero(), |acc, e| acc + e.amount())
    }

    fn remaining_principal_as_of(&self, as_of: NaiveDateTime) -> Money {
        (self.principal - self.paid_principal_as_of(as_of)).clamp_min_zero()
    }

    #[must_use]
    /// Accessor.
    pub fn current_balance(&self) -> Money {
        self.remaining_principal_as_of(self.time_context.now())
    }

    fn last_interest_cutoff_as_of(&self, as_of: NaiveDateTime) -> NaiveDateTime {
        self.payments
            .entries_at(as_of)
            .into_iter()
            .filter(|e| matches!(e.category(), Category::ActualInterest | Category::ActualMoraInterest))
            .map(|e| e.datetime())
            .max()
            .unwrap_or_else(|| start_of_day(self.disbursement_date))
    }

    fn paid_fines_total_as_of(&self, as_of: NaiveDateTime) -> Money {
        self.payments
            .entries_at(as_of)
            .into_iter()
            .filter(|e| e.category() == Category::ActualFine)
            .fold(Money::zero(), |acc, e| acc + e.amount())
    }

    /// Fines levied so far, minus fines paid so far, oldest due date first.
    fn outstanding_fines_as_of(&self, as_of: NaiveDateTime) -> Vec<(Date, Money)> {
        let mut paid = self.paid_fines_total_as_of(as_of);
        let mut outstanding = Vec::new();
        for (due, owed) in &self.fines_applied {
            if start_of_day(*due) > as_of {
                continue;
            }
            if paid >= *owed {
                paid = paid - *owed;
                continue;
            }
            let remainder = (*owed - paid).clamp_min_zero();
            paid = Money::zero();
            outstanding.push((*due, remainder));
        }
        outstanding
    }

    #[must_use]
    /// Accessor.
    pub fn outstanding_fines(&self) -> Money {
        self.outstanding_fines_as_of(self.time_context.now())
            .into_iter()
            .fold(Money::zero(), |acc, (_, m)| acc + m)
    }

    #[must_use]
    /// Accessor.
    pub fn total_fines(&self) -> Money {
        self.fines_applied.values().fold(Money::zero(), |acc, m| acc + *m)
    }

    #[must_use]
    /// Accessor.
    pub fn fines_applied(&self) -> Vec<(Date, Money)> {
        self.fines_applied.iter().map(|(d, m)| (*d, *m)).collect()
    }

    /// 1-based position of `due` in the schedule, or `0` if it does not match
    /// any scheduled due date (only reachable once every due date has
    /// already been targeted and a payment still lands past the last one).
    fn installment_number_for(&self, due: Date) -> u32 {
        self.due_dates
            .iter()
            .position(|d| *d == due)
            .map_or(0, |idx| u32::try_from(idx + 1).unwrap_or(u32::MAX))
    }

    /// How many original-schedule due dates the current remaining principal
    /// has covered, by comparing against each `ending_balance` milestone
    /// rather than counting payment calls.
    fn due_dates_covered(&self) -> usize {
        let remaining = self.current_balance();
        self.original_schedule
            .entries()
            .iter()
            .take_while(|e| e.ending_balance() >= remaining || e.ending_balance().is_zero())
            .count()
            .min(self.original_schedule.entries().len())
    }

    fn next_unpaid_due_date(&self) -> Option<Date> {
        let covered = self.due_dates_covered();
        self.due_dates.get(covered).copied()
    }

    #[must_use]
    /// Accessor.
    pub fn next_due_date(&self) -> Option<Date> {
        self.next_unpaid_due_date()
    }

    #[must_use]
    /// Accessor.
    pub fn is_paid_off(&self) -> bool {
        self.current_balance().is_zero() && self.outstanding_fines().is_zero()
    }

    #[must_use]
    /// Accessor.
    pub fn accrued_interest(&self) -> Money {
        let now_dt = self.time_context.now();
        let balance = self.remaining_principal_as_of(now_dt);
        let cutoff = self.last_interest_cutoff_as_of(now_dt);
        let days = (Date::from(now_dt.date()) - Date::from(cutoff.date())).max(0);
        let accrued = self.interest_rate.accrue(balance, days).unwrap_or(balance);
        accrued - balance
    }

    #[must_use]
    /// Accessor.
    pub fn days_past_due(&self, as_of: Date) -> i64 {
        match self.next_unpaid_due_date() {
            Some(due) if due < as_of => as_of - due,
            _ => 0,
        }
    }

    /// Walks due dates `D <= as_of` where `D + grace_period_days <= as_of`
    /// and no fine is yet recorded for `D`, levying `fine_rate *
    /// expected_installment_amount(D)` from the **original** schedule.
    /// Idempotent: a due date already present in `fines_applied` is skipped.
    pub fn calculate_late_fines(&mut self, as_of: Date) -> Result<Money> {
        let mut total = Money::zero();
        for entry in self.original_schedule.entries().to_vec() {
            let due = entry.due_date();
            if self.fines_applied.contains_key(&due) {
                continue;
            }
            let levy_date = due.advance(i32::try_from(self.grace_period_days).unwrap_or(i32::MAX), crate::time::enums::TimeUnit::Days);
            if levy_date > as_of {
                continue;
            }
            let fine = entry.payment_amount().mul_scalar(self.fine_rate);
            self.fines_applied.insert(due, fine);
            self.payments.push(CashFlowItem::new(
                CashFlowEntry::new(fine, start_of_day(levy_date), "fine applied", Category::FineApplied),
                self.time_context.share(),
            ));
            total += fine;
        }
        Ok(total)
    }

    /// Records a payment with full control over the three dates. Either the
    /// full set of payment items (fine + regular interest + mora interest +
    /// principal) is appended and `payment_offsets` advances, or nothing is.
    pub fn record_payment(
        &mut self,
        amount: Money,
        payment_date: Date,
        interest_date: Option<Date>,
        description: Option<&str>,
        allow_over_allocation: bool,
    ) -> Result<Settlement> {
        if self.is_paid_off() {
            return Err(EngineError::PaidOff);
        }
        if !amount.is_positive() {
            return Err(EngineError::InvalidInput("payment amount must be positive".to_string()));
        }
        let interest_date = interest_date.unwrap_or(payment_date);
        let payment_dt = start_of_day(payment_date);
        let interest_dt = start_of_day(interest_date);

        // Pre-snapshot: filtered by payment_date, never by now().
        let principal_balance = self.remaining_principal_as_of(payment_dt);
        let last_cutoff = self.last_interest_cutoff_as_of(payment_dt);
        let next_due = self.next_unpaid_due_date();

        let mut remaining = amount;
        let mut allocations: Vec<(Date, SettlementAllocation)> = Vec::new();
        let mut pending_entries: Vec<(NaiveDateTime, CashFlowEntry)> = Vec::new();

        // 1. outstanding fines, oldest first.
        let mut fine_total_paid = Money::zero();
        for (due, owed) in self.outstanding_fines_as_of(payment_dt) {
            if remaining.is_zero() {
                break;
            }
            let pay = remaining.min(owed);
            remaining = remaining - pay;
            fine_total_paid += pay;
            pending_entries.push((
                payment_dt,
                CashFlowEntry::new(pay, payment_dt, "fine paid", Category::ActualFine),
            ));
            allocations.push((
                due,
                SettlementAllocation {
                    installment_number: self.installment_number_for(due),
                    principal: Money::zero(),
                    interest: Money::zero(),
                    mora: Money::zero(),
                    fine: pay,
                    is_fully_covered: pay == owed,
                },
            ));
        }

        // 2. interest, split regular/mora when interest_date is past the next due date.
        let last_cutoff_date = Date::from(last_cutoff.date());
        let (regular_days, mora_days) = match next_due {
            Some(due) if interest_date > due => {
                let regular = (due - last_cutoff_date).max(0);
                let mora = (interest_date - due).max(0);
                (regular, mora)
            }
            _ => ((interest_date - last_cutoff_date).max(0), 0),
        };

        let regular_interest = self.interest_rate.accrue(principal_balance, regular_days)? - principal_balance;
        let mora_interest = match self.mora_strategy {
            MoraStrategy::Compound => {
                let base = principal_balance + regular_interest;
                self.mora_rate.accrue(base, mora_days)? - base
            }
            MoraStrategy::Simple => self.mora_rate.accrue(principal_balance, mora_days)? - principal_balance,
        };

        let interest_paid = remaining.min(regular_interest);
        remaining = remaining - interest_paid;
        if interest_paid.is_positive() {
            pending_entries.push((
                interest_dt,
                CashFlowEntry::new(interest_paid, interest_dt, "interest paid", Category::ActualInterest),
            ));
        }

        let mora_paid = remaining.min(mora_interest);
        remaining = remaining - mora_paid;
        if mora_paid.is_positive() {
            pending_entries.push((
                interest_dt,
                CashFlowEntry::new(mora_paid, interest_dt, "mora interest paid", Category::ActualMoraInterest),
            ));
        }

        // 3. principal, the remainder.
        let principal_paid = remaining;
        if principal_paid > principal_balance && !allow_over_allocation {
            return Err(EngineError::OverPayment(amount.to_string()));
        }
        if principal_paid.is_positive() {
            pending_entries.push((
                payment_dt,
                CashFlowEntry::new(principal_paid, payment_dt, "principal paid", Category::ActualPrincipal),
            ));
        }

        if interest_paid.is_positive() || mora_paid.is_positive() || principal_paid.is_positive() {
            let target = next_due.unwrap_or(payment_date);
            let covers_full_installment = self
                .original_schedule
                .entries()
                .iter()
                .find(|e| e.due_date() == target)
                .map_or(true, |e| principal_paid >= e.principal_payment() && interest_paid >= e.interest_payment());
            allocations.push((
                target,
                SettlementAllocation {
                    installment_number: self.installment_number_for(target),
                    principal: principal_paid,
                    interest: interest_paid,
                    mora: mora_paid,
                    fine: Money::zero(),
                    is_fully_covered: covers_full_installment,
                },
            ));
        }

        for (_, entry) in &pending_entries {
            self.payments.push(CashFlowItem::new(entry.clone(), self.time_context.share()));
        }
        self.payment_offsets.push(self.payments.len());

        let new_balance = (principal_balance - principal_paid).clamp_min_zero();
        self.schedule_entries.push(PaymentScheduleEntry::new(
            u32::try_from(self.schedule_entries.len() + 1).unwrap_or(u32::MAX),
            next_due.unwrap_or(payment_date),
            regular_days + mora_days,
            principal_balance,
            fine_total_paid + interest_paid + mora_paid + principal_paid,
            principal_paid,
            interest_paid + mora_paid,
            new_balance,
        ));

        Ok(Settlement {
            payment_amount: amount,
            payment_date,
            fine_paid: fine_total_paid,
            interest_paid,
            mora_paid,
            principal_paid,
            remaining_balance: new_balance,
            allocations: allocations.into_iter().map(|(_, a)| a).collect(),
        })
    }

    /// Sugar: `payment_date = now()`, `interest_date = max(now(), next_unpaid_due_date)`.
    pub fn pay_installment(&mut self, amount: Money, description: Option<&str>) -> Result<Settlement> {
        let now = self.now();
        let interest_date = self.next_unpaid_due_date().map_or(now, |due| now.max(due));
        self.record_payment(amount, now, Some(interest_date), description, false)
    }

    /// Sugar: `payment_date = interest_date = now()`, applied to the current
    /// unpaid due date (the same target `pay_installment` would use).
    /// Targeting specific installment numbers is not supported: doing so
    /// correctly requires temporally deleting the targeted expected schedule
    /// items, which in turn requires the expected cash flow to be a
    /// persistent, deletable `CashFlow` rather than rebuilt from
    /// `original_schedule` on every call (see `generate_expected_cash_flow`).
    /// Until that exists, a caller asking for it gets an explicit error
    /// instead of a settlement that silently ignores the targeting.
    pub fn anticipate_payment(
        &mut self,
        amount: Money,
        installments: Option<&[u32]>,
        description: Option<&str>,
    ) -> Result<Settlement> {
        if installments.is_some() {
            return Err(EngineError::InvalidInput(
                "anticipate_payment targeting specific installment numbers is not supported".to_string(),
            ));
        }
        let now = self.now();
        self.record_payment(amount, now, Some(now), description, false)
    }

    /// Pure: the amount and day-discounted interest for anticipating the
    /// given installment numbers, with no state change.
    #[must_use]
    pub fn calculate_anticipation(&self, installments: &[u32]) -> (Money, Vec<u32>) {
        let now = self.now();
        let mut total = Money::zero();
        for &number in installments {
            if let Some(entry) = self.original_schedule.entries().get((number as usize).saturating_sub(1)) {
                let days = (entry.due_date() - now).max(0);
                let discounted = self
                    .interest_rate
                    .discount_factor(days)
                    .map(|f| entry.payment_amount().mul_scalar(f))
                    .unwrap_or(entry.payment_amount());
                total += discounted;
            }
        }
        (total, installments.to_vec())
    }

    /// One `schedule_entries` row's worth of the `payments` stream, grouped
    /// by `payment_offsets[i]..[i+1]` and summed by category. Every
    /// `record_payment` call targets a single due date (`schedule_entries[i]
    /// .due_date()`), so a call that happened to clear an older fine while
    /// also paying toward a newer installment has the whole call's amounts
    /// attributed to that one target rather than split across both.
    fn payment_slices(&self) -> Vec<(Date, Money, Money, Money, Money)> {
        let resolved = self.payments.entries_now();
        self.schedule_entries
            .iter()
            .enumerate()
            .map(|(i, schedule_entry)| {
                let start = self.payment_offsets[i].min(resolved.len());
                let end = self.payment_offsets.get(i + 1).copied().unwrap_or(resolved.len()).min(resolved.len());
                let window = &resolved[start..end];
                let sum_of = |category: Category| {
                    window
                        .iter()
                        .filter(|e| e.category() == category)
                        .fold(Money::zero(), |acc, e| acc + e.amount())
                };
                (
                    schedule_entry.due_date(),
                    sum_of(Category::ActualFine),
                    sum_of(Category::ActualInterest),
                    sum_of(Category::ActualMoraInterest),
                    sum_of(Category::ActualPrincipal),
                )
            })
            .collect()
    }

    /// One `SettlementAllocation` per recorded payment call, tracking the
    /// running total paid toward each target due date so `is_fully_covered`
    /// reflects cumulative, not per-call, progress.
    fn allocations_by_call(&self) -> Vec<SettlementAllocation> {
        let mut cumulative: BTreeMap<Date, (Money, Money, Money)> = BTreeMap::new();
        self.payment_slices()
            .into_iter()
            .map(|(due, fine, interest, mora, principal)| {
                let expected = self.original_schedule.entries().iter().find(|e| e.due_date() == due);
                let expected_principal = expected.map_or(Money::zero(), PaymentScheduleEntry::principal_payment);
                let expected_interest = expected.map_or(Money::zero(), PaymentScheduleEntry::interest_payment);
                let expected_fine = self.fines_applied.get(&due).copied().unwrap_or(Money::zero());

                let tally = cumulative.entry(due).or_insert((Money::zero(), Money::zero(), Money::zero()));
                tally.0 += principal;
                tally.1 += interest;
                tally.2 += fine;
                let is_fully_covered =
                    tally.0 >= expected_principal && tally.1 >= expected_interest && tally.2 >= expected_fine;

                SettlementAllocation {
                    installment_number: self.installment_number_for(due),
                    principal,
                    interest,
                    mora,
                    fine,
                    is_fully_covered,
                }
            })
            .collect()
    }

    /// Derived view of every scheduled period: expected amounts from the
    /// original schedule, paid amounts and allocations reconstructed from
    /// `payments` via [`Loan::payment_slices`].
    #[must_use]
    pub fn installments(&self) -> Vec<Installment> {
        let due_targets: Vec<Date> = self.payment_slices().into_iter().map(|(due, ..)| due).collect();
        let call_allocations = self.allocations_by_call();

        self.original_schedule
            .entries()
            .iter()
            .map(|entry| {
                let due = entry.due_date();
                let allocations: Vec<SettlementAllocation> = due_targets
                    .iter()
                    .zip(call_allocations.iter())
                    .filter(|(target, _)| **target == due)
                    .map(|(_, allocation)| *allocation)
                    .collect();
                let principal_paid = allocations.iter().fold(Money::zero(), |acc, a| acc + a.principal);
                let interest_paid = allocations.iter().fold(Money::zero(), |acc, a| acc + a.interest);
                let mora_paid = allocations.iter().fold(Money::zero(), |acc, a| acc + a.mora);
                let fine_paid = allocations.iter().fold(Money::zero(), |acc, a| acc + a.fine);

                Installment {
                    number: entry.payment_number(),
                    due_date: due,
                    days_in_period: entry.days_in_period(),
                    expected_payment: entry.payment_amount(),
                    expected_principal: entry.principal_payment(),
                    expected_interest: entry.interest_payment(),
                    expected_mora: Money::zero(),
                    expected_fine: self.fines_applied.get(&due).copied().unwrap_or(Money::zero()),
                    principal_paid,
                    interest_paid,
                    mora_paid,
                    fine_paid,
                    allocations,
                }
            })
            .collect()
    }

    /// Reconstructs one `Settlement` per `record_payment` call by slicing
    /// `payments` at `payment_offsets[i]..[i+1]` (§4.4): the mechanism behind
    /// the "same-day multiple payments" boundary, where each call keeps its
    /// own allocations regardless of whether another call shares its date.
    #[must_use]
    pub fn settlements(&self) -> Vec<Settlement> {
        let resolved = self.payments.entries_now();
        let call_allocations = self.allocations_by_call();

        self.schedule_entries
            .iter()
            .enumerate()
            .map(|(i, schedule_entry)| {
                let start = self.payment_offsets[i].min(resolved.len());
                let end = self.payment_offsets.get(i + 1).copied().unwrap_or(resolved.len()).min(resolved.len());
                let window = &resolved[start..end];

                let payment_date = window
                    .iter()
                    .filter(|e| matches!(e.category(), Category::ActualFine | Category::ActualPrincipal))
                    .map(|e| e.datetime())
                    .max()
                    .or_else(|| window.iter().map(|e| e.datetime()).min())
                    .map_or(schedule_entry.due_date(), |dt| Date::from(dt.date()));

                let allocation = call_allocations[i];
                Settlement {
                    payment_amount: schedule_entry.payment_amount(),
                    payment_date,
                    fine_paid: allocation.fine,
                    interest_paid: allocation.interest,
                    mora_paid: allocation.mora,
                    principal_paid: allocation.principal,
                    remaining_balance: schedule_entry.ending_balance(),
                    allocations: vec![allocation],
                }
            })
            .collect()
    }

    #[must_use]
    /// Accessor.
    pub fn get_actual_cash_flow(&self) -> &CashFlow {
        &self.payments
    }

    /// Past entries derived from actual payments, followed by a freshly
    /// computed projection over the remaining due dates.
    pub fn get_amortization_schedule(&self) -> Result<PaymentSchedule> {
        let mut entries = self.schedule_entries.clone();
        let covered = self.due_dates_covered();
        let remaining_due_dates: Vec<Date> = self.due_dates[covered.min(self.due_dates.len())..].to_vec();
        if !remaining_due_dates.is_empty() {
            let remaining_principal = self.current_balance();
            let reference_date = self.now();
            let projection = self.scheduler_type.generate(
                remaining_principal,
                self.interest_rate,
                &remaining_due_dates,
                reference_date,
            )?;
            entries.extend(projection.entries().iter().copied());
        }
        Ok(PaymentSchedule::new(entries))
    }

    /// Builds the expected cash flow: disbursement, scheduled interest and
    /// principal, and, if taxes are attached, a net-of-tax disbursement plus
    /// a separate `expected_tax` entry.
    pub fn generate_expected_cash_flow(&self) -> Result<CashFlow> {
        let mut flow = CashFlow::new();
        let disbursement_dt = start_of_day(self.disbursement_date);

        let tax = self.tax_result()?;
        let disbursement_amount = match &tax {
            Some(t) => self.principal - t.total,
            None => self.principal,
        };
        flow.push(CashFlowItem::new(
            CashFlowEntry::new(disbursement_amount, disbursement_dt, "disbursement", Category::ExpectedDisbursement),
            self.time_context.share(),
        ));
        if let Some(t) = &tax {
            flow.push(CashFlowItem::new(
                CashFlowEntry::new(-t.total, disbursement_dt, "tax withheld", Category::ExpectedTax),
                self.time_context.share(),
            ));
        }
        for entry in self.original_schedule.entries() {
            let dt = start_of_day(entry.due_date());
            flow.push(CashFlowItem::new(
                CashFlowEntry::new(-entry.interest_payment(), dt, "scheduled interest", Category::ExpectedInterest),
                self.time_context.share(),
            ));
            flow.push(CashFlowItem::new(
                CashFlowEntry::new(-entry.principal_payment(), dt, "scheduled principal", Category::ExpectedPrincipal),
                self.time_context.share(),
            ));
        }
        Ok(flow)
    }

    fn tax_result(&self) -> Result<Option<TaxResult>> {
        if let Some(cached) = self.tax_cache.borrow().as_ref() {
            return Ok(Some(cached.clone()));
        }
        let Some(tax) = &self.taxes else {
            return Ok(None);
        };
        let result = tax.calculate(&self.original_schedule, self.disbursement_date)?;
        *self.tax_cache.borrow_mut() = Some(result.clone());
        Ok(Some(result))
    }

    /// Present value of the expected cash flow at `self.interest_rate`.
    pub fn present_value(&self) -> Result<Money> {
        let flow = self.generate_expected_cash_flow()?;
        crate::tvm::discount::present_value(&flow.entries_now(), self.interest_rate, None)
    }

    /// IRR of the expected cash flow; should reproduce `interest_rate`
    /// within currency tolerance for a loan with no taxes.
    pub fn irr(&self, guess: Option<Decimal>) -> Result<InterestRate> {
        let flow = self.generate_expected_cash_flow()?;
        crate::tvm::irr::internal_rate_of_return(&flow.entries_now(), guess, self.interest_rate.year_basis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::enums::{Frequency, YearBasis};
    use rust_decimal_macros::dec;

    fn sample_loan() -> Loan {
        let rate = InterestRate::new(dec!(0.06), Frequency::Annual, YearBasis::Commercial365, None);
        let due_dates = vec![Date::new(2024, 2, 1), Date::new(2024, 3, 1), Date::new(2024, 4, 1)];
        Loan::new(
            Money::from_cents(10_000_00),
            rate,
            due_dates,
            Date::new(2024, 1, 1),
            SchedulerKind::Price,
            dec!(0.02),
            0,
            None,
            MoraStrategy::Compound,
            None,
        )
        .unwrap()
    }

    #[test]
    fn construction_rejects_disbursement_on_first_due_date() {
        let rate = InterestRate::new(dec!(0.06), Frequency::Annual, YearBasis::Commercial365, None);
        let result = Loan::new(
            Money::from_cents(10_000_00),
            rate,
            vec![Date::new(2024, 1, 1)],
            Date::new(2024, 1, 1),
            SchedulerKind::Price,
            dec!(0.02),
            0,
            None,
            MoraStrategy::Compound,
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn fresh_loan_is_not_paid_off() {
        let loan = sample_loan();
        assert!(!loan.is_paid_off());
        assert_eq!(loan.current_balance(), Money::from_cents(10_000_00));
    }

    #[test]
    fn full_payment_reduces_balance_and_covers_fines_and_interest_first() {
        let mut loan = sample_loan();
        let settlement = loan
            .record_payment(Money::from_cents(7_000_00), Date::new(2024, 2, 1), None, None, false)
            .unwrap();
        assert!(settlement.principal_paid.is_positive());
        assert!(loan.current_balance() < Money::from_cents(10_000_00));
    }

    #[test]
    fn overpayment_without_allow_flag_is_rejected() {
        let mut loan = sample_loan();
        let result = loan.record_payment(Money::from_cents(50_000_00), Date::new(2024, 2, 1), None, None, false);
        assert!(result.is_err());
    }

    #[test]
    fn calculate_late_fines_is_idempotent() {
        let mut loan = sample_loan();
        let first = loan.calculate_late_fines(Date::new(2024, 2, 2)).unwrap();
        let second = loan.calculate_late_fines(Date::new(2024, 2, 2)).unwrap();
        assert!(first.is_positive());
        assert_eq!(second, Money::zero());
    }

    #[test]
    fn installments_reflect_recorded_payments() {
        let mut loan = sample_loan();
        loan.record_payment(Money::from_cents(7_000_00), Date::new(2024, 2, 1), None, None, false)
            .unwrap();
        let installments = loan.installments();
        let first = installments.iter().find(|i| i.number == 1).unwrap();
        assert!(first.principal_paid.is_positive());
        assert!(first.is_fully_paid());
        assert!(!first.allocations.is_empty());

        let third = installments.iter().find(|i| i.number == 3).unwrap();
        assert!(third.principal_paid.is_zero());
        assert!(!third.is_fully_paid());
    }

    #[test]
    fn settlements_reconstructs_one_entry_per_call() {
        let mut loan = sample_loan();
        loan.record_payment(Money::from_cents(3_000_00), Date::new(2024, 2, 1), None, None, false)
            .unwrap();
        loan.record_payment(Money::from_cents(4_000_00), Date::new(2024, 3, 1), None, None, false)
            .unwrap();
        let settlements = loan.settlements();
        assert_eq!(settlements.len(), 2);
        assert_eq!(settlements[0].payment_amount, Money::from_cents(3_000_00));
        assert_eq!(settlements[1].payment_amount, Money::from_cents(4_000_00));
        for settlement in &settlements {
            assert_eq!(settlement.allocations.len(), 1);
        }
    }

    #[test]
    fn anticipate_payment_rejects_targeted_installments() {
        let mut loan = sample_loan();
        let result = loan.anticipate_payment(Money::from_cents(1_000_00), Some(&[2]), None);
        assert!(result.is_err());
    }

    #[test]
    fn anticipate_payment_without_installments_applies_to_current_due_date() {
        let mut loan = sample_loan();
        let settlement = loan.anticipate_payment(Money::from_cents(1_000_00), None, None).unwrap();
        assert!(settlement.interest_paid.is_positive() || settlement.principal_paid.is_positive());
    }
}
