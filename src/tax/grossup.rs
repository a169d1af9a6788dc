use crate::loan::state::{Loan, MoraStrategy};
use crate::money::Money;
use crate::rates::interestrate::InterestRate;
use crate::schedule::SchedulerKind;
use crate::tax::traits::BaseTax;
use crate::time::date::Date;
use crate::utils::errors::{EngineError, Result};
use argmin::core::{CostFunction, Error, Executor, State};
use argmin::solver::brent::BrentRoot;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

struct GrossupCost<'a> {
    requested: f64,
    rate: InterestRate,
    due_dates: &'a [Date],
    disbursement_date: Date,
    scheduler: SchedulerKind,
    taxes: &'a dyn BaseTax,
}

impl GrossupCost<'_> {
    fn total_tax(&self, principal: Money) -> std::result::Result<Money, Error> {
        let schedule = self
            .scheduler
            .generate(principal, self.rate, self.due_dates, self.disbursement_date)?;
        Ok(self.taxes.calculate(&schedule, self.disbursement_date)?.total)
    }
}

impl CostFunction for GrossupCost<'_> {
    type Param = f64;
    type Output = f64;

    /// `f(P) = P - requested_amount - total_tax(P)`.
    fn cost(&self, param: &f64) -> std::result::Result<f64, Error> {
        let principal_dec = Decimal::from_f64(*param)
            .ok_or_else(|| EngineError::InvalidInput("candidate principal is not representable".to_string()))?;
        let principal = Money::new(principal_dec)?;
        let tax = self.total_tax(principal)?;
        Ok(param - self.requested - tax.real().to_f64().unwrap_or(0.0))
    }
}

/// Solves for a principal `P` such that `P - total_tax(P) >= requested_amount`
/// with minimum positive slack, returning a cent-aligned `Money`. Brackets
/// over `[requested_amount, 2 * requested_amount]` with `BrentRoot` (tax
/// functions round to the cent per installment, producing the stair-step
/// shape a Newton-style solver stalls on), then walks the cent below, at,
/// and above the converged value to pick the smallest one that actually
/// clears the post-tax requirement — the float root only approximates where
/// to look, the final answer is always checked exactly in `Decimal`.
pub fn solve_grossup(
    requested_amount: Money,
    rate: InterestRate,
    due_dates: &[Date],
    disbursement_date: Date,
    scheduler: SchedulerKind,
    taxes: &dyn BaseTax,
) -> Result<Money> {
    let requested = requested_amount
        .real()
        .to_f64()
        .ok_or_else(|| EngineError::InvalidInput("requested amount is not representable".to_string()))?;
    if requested <= 0.0 {
        return Err(EngineError::InvalidInput("requested amount must be positive".to_string()));
    }

    let cost = GrossupCost { requested, rate, due_dates, disbursement_date, scheduler, taxes };
    let solver = BrentRoot::new(requested, requested * 2.0, 1e-4);
    let res = Executor::new(cost, solver)
        .configure(|state| state.max_iters(100).target_cost(0.0))
        .run()?;
    let root = *res
        .state()
        .get_best_param()
        .ok_or_else(|| EngineError::NoConvergence("grossup solver returned no parameter".to_string()))?;

    let root_dec = Decimal::from_f64(root)
        .ok_or_else(|| EngineError::NoConvergence("grossup root not representable".to_string()))?
        .round_dp(2);

    let cost = GrossupCost { requested, rate, due_dates, disbursement_date, scheduler, taxes };
    for candidate in [root_dec - dec!(0.01), root_dec, root_dec + dec!(0.01)] {
        if candidate <= Decimal::ZERO {
            continue;
        }
        let principal = Money::new(candidate)?;
        let total_tax = cost
            .total_tax(principal)
            .map_err(|e| EngineError::NoConvergence(e.to_string()))?;
        if principal - total_tax >= requested_amount {
            return Ok(principal);
        }
    }

    Err(EngineError::NoConvergence(
        "grossup failed to find a cent-aligned principal clearing the requested amount".to_string(),
    ))
}

/// Sugar: solves the grossed-up principal, then constructs a `Loan` with it.
#[allow(clippy::too_many_arguments)]
pub fn grossup_loan(
    requested_amount: Money,
    rate: InterestRate,
    due_dates: Vec<Date>,
    disbursement_date: Date,
    scheduler: SchedulerKind,
    fine_rate: Decimal,
    grace_period_days: i64,
    mora_rate: Option<InterestRate>,
    mora_strategy: MoraStrategy,
    taxes: Box<dyn BaseTax>,
) -> Result<Loan> {
    let principal = solve_grossup(requested_amount, rate, &due_dates, disbursement_date, scheduler, taxes.as_ref())?;
    Loan::new(
        principal,
        rate,
        due_dates,
        disbursement_date,
        scheduler,
        fine_rate,
        grace_period_days,
        mora_rate,
        mora_strategy,
        Some(taxes),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::enums::{Frequency, YearBasis};
    use crate::tax::iof::IOF;

    #[test]
    fn grossed_up_principal_clears_requested_amount_after_tax() {
        let rate = InterestRate::new(dec!(0.01), Frequency::Monthly, YearBasis::Commercial365, None);
        let due_dates = vec![Date::new(2024, 2, 1), Date::new(2024, 3, 1)];
        let iof = IOF::individual();
        let principal = solve_grossup(
            Money::from_cents(10_000_00),
            rate,
            &due_dates,
            Date::new(2024, 1, 1),
            SchedulerKind::Price,
            &iof,
        )
        .unwrap();

        let schedule = SchedulerKind::Price.generate(principal, rate, &due_dates, Date::new(2024, 1, 1)).unwrap();
        let tax = iof.calculate(&schedule, Date::new(2024, 1, 1)).unwrap();
        assert!(principal - tax.total >= Money::from_cents(10_000_00));
        assert_eq!(principal.raw(), principal.real());
    }

    #[test]
    fn rejects_non_positive_request() {
        let rate = InterestRate::new(dec!(0.01), Frequency::Monthly, YearBasis::Commercial365, None);
        let due_dates = vec![Date::new(2024, 2, 1)];
        let iof = IOF::individual();
        let result = solve_grossup(Money::zero(), rate, &due_dates, Date::new(2024, 1, 1), SchedulerKind::Price, &iof);
        assert!(result.is_err());
    }
}
