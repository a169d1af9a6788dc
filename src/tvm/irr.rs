use crate::cashflows::entry::CashFlowEntry;
use crate::money::Money;
use crate::rates::enums::{Frequency, YearBasis};
use crate::rates::interestrate::InterestRate;
use crate::time::date::Date;
use crate::tvm::discount::present_value;
use crate::utils::errors::{EngineError, Result};
use argmin::core::{CostFunction, Error, Executor, State};
use argmin::solver::brent::BrentRoot;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::MathematicalOps;
use rust_decimal::Decimal;

/// Fixed bracket candidates tried before the caller's own guess, spanning
/// from a near-total-loss rate to a tripling.
const CANDIDATE_GUESSES: [f64; 10] = [-0.5, -0.1, 0.01, 0.05, 0.10, 0.15, 0.25, 0.50, 1.0, 2.0];
const NPV_TOLERANCE_CENTS: i64 = 500;
const UNBOUNDED_FALLBACK_ITERS: usize = 100;
const UNBOUNDED_FALLBACK_STEP: f64 = 0.01;
/// `InterestRate`'s compounding maths takes `ln` of `1 + rate`, which is
/// undefined at or below `-1`; candidates are clamped here so the secant
/// fallback can wander without ever crossing that singularity.
const FALLBACK_DOMAIN_LOW: f64 = -0.99;
const FALLBACK_DOMAIN_HIGH: f64 = 50.0;

struct NpvAtRate<'a> {
    entries: &'a [CashFlowEntry],
    year_basis: YearBasis,
    valuation_date: Date,
}

impl CostFunction for NpvAtRate<'_> {
    type Param = f64;
    type Output = f64;

    fn cost(&self, param: &f64) -> std::result::Result<f64, Error> {
        let rate_dec = Decimal::from_f64(*param)
            .ok_or_else(|| EngineError::InvalidInput("candidate rate is not representable".to_string()))?;
        let rate = InterestRate::new(rate_dec, Frequency::Annual, self.year_basis, None);
        let pv = present_value(self.entries, rate, Some(self.valuation_date))?;
        Ok(pv.real().to_f64().unwrap_or(f64::MAX))
    }
}

/// Unbounded secant search, used only when the fixed candidate grid fails to
/// bracket a sign change. Unlike `BrentRoot` this needs no validated
/// `[lo, hi]` pair, so it can still land on a root above the top candidate or
/// one the grid straddles too coarsely to detect.
fn secant_fallback(cost: &NpvAtRate, seed: f64) -> Option<f64> {
    let clamp = |x: f64| x.clamp(FALLBACK_DOMAIN_LOW, FALLBACK_DOMAIN_HIGH);
    let mut x0 = clamp(seed);
    let mut x1 = clamp(seed + UNBOUNDED_FALLBACK_STEP);
    let mut f0 = cost.cost(&x0).ok()?;
    for _ in 0..UNBOUNDED_FALLBACK_ITERS {
        let f1 = cost.cost(&x1).ok()?;
        if (f1 - f0).abs() < f64::EPSILON {
            return Some(x1);
        }
        let x2 = clamp(x1 - f1 * (x1 - x0) / (f1 - f0));
        if (x2 - x1).abs() < 1e-9 {
            return Some(x2);
        }
        x0 = x1;
        f0 = f1;
        x1 = x2;
    }
    Some(x1)
}

/// Finds the annual rate at which `entries` net-present-value to zero.
/// Brackets the root with fixed candidate rates (plus the caller's `guess`,
/// if supplied) and refines with `argmin`'s `BrentRoot`, the same solver
/// shape used elsewhere in this crate for par-rate and grossup searches.
/// Rejects a root whose residual NPV exceeds the currency tolerance or that
/// falls outside the plausible `[-99%, 1000%]` range, rather than returning
/// a numerically-found but financially meaningless answer.
pub fn internal_rate_of_return(
    entries: &[CashFlowEntry],
    guess: Option<Decimal>,
    year_basis: YearBasis,
) -> Result<InterestRate> {
    let valuation_date = entries
        .iter()
        .map(|e| Date::from(e.datetime().date()))
        .min()
        .ok_or_else(|| EngineError::InvalidInput("cannot compute IRR of an empty cash flow".to_string()))?;
    let cost = NpvAtRate { entries, year_basis, valuation_date };

    let mut candidates: Vec<f64> = CANDIDATE_GUESSES.to_vec();
    if let Some(g) = guess.and_then(|g| g.to_f64()) {
        candidates.push(g);
    }
    candidates.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mut bracket = None;
    for window in candidates.windows(2) {
        let (lo, hi) = (window[0], window[1]);
        let f_lo = cost.cost(&lo).map_err(|e| EngineError::NoConvergence(e.to_string()))?;
        let f_hi = cost.cost(&hi).map_err(|e| EngineError::NoConvergence(e.to_string()))?;
        if f_lo == 0.0 {
            bracket = Some((lo, lo));
            break;
        }
        if f_lo.is_sign_negative() != f_hi.is_sign_negative() {
            bracket = Some((lo, hi));
            break;
        }
    }
    let root = match bracket {
        Some((lo, hi)) if (hi - lo).abs() < f64::EPSILON => lo,
        Some((lo, hi)) => {
            let solver = BrentRoot::new(lo, hi, 1e-9);
            let res = Executor::new(cost, solver)
                .configure(|state| state.max_iters(100).target_cost(0.0))
                .run()?;
            *res.state()
                .get_best_param()
                .ok_or_else(|| EngineError::NoConvergence("IRR solver returned no parameter".to_string()))?
        }
        None => {
            let seed = guess
                .and_then(|g| g.to_f64())
                .unwrap_or(candidates[candidates.len() / 2]);
            secant_fallback(&cost, seed).ok_or(EngineError::NoSignChange)?
        }
    };

    if !(-0.99..=10.0).contains(&root) {
        return Err(EngineError::NoConvergence(format!("IRR root {root} outside the plausible range")));
    }
    let rate_dec = Decimal::from_f64(root)
        .ok_or_else(|| EngineError::NoConvergence("IRR root not representable".to_string()))?;
    let rate = InterestRate::new(rate_dec, Frequency::Annual, year_basis, None);

    let npv_at_root = present_value(entries, rate, Some(valuation_date))?;
    if npv_at_root.cents().abs() > NPV_TOLERANCE_CENTS {
        return Err(EngineError::NoConvergence(format!(
            "IRR residual NPV {npv_at_root} exceeds tolerance"
        )));
    }

    Ok(rate)
}

/// Modified IRR: negative flows are discounted to the first flow's date at
/// `finance_rate`, positive flows are compounded to the last flow's date at
/// `reinvest_rate`, and the annual rate bridging the two totals over the
/// span is returned. Avoids the multiple-root pathology plain IRR can hit
/// on cash flows that change sign more than once.
pub fn modified_internal_rate_of_return(
    entries: &[CashFlowEntry],
    finance_rate: InterestRate,
    reinvest_rate: InterestRate,
) -> Result<InterestRate> {
    let dates: Vec<Date> = entries.iter().map(|e| Date::from(e.datetime().date())).collect();
    let start = *dates
        .iter()
        .min()
        .ok_or_else(|| EngineError::InvalidInput("cannot compute MIRR of an empty cash flow".to_string()))?;
    let end = *dates.iter().max().unwrap_or(&start);

    let mut pv_negative = Money::zero();
    let mut fv_positive = Money::zero();
    for entry in entries {
        let d = Date::from(entry.datetime().date());
        if entry.amount().is_negative() {
            let days = start.days_until_clamped(d);
            pv_negative += entry.amount().abs().mul_scalar(finance_rate.discount_factor(days)?);
        } else if entry.amount().is_positive() {
            let days = d.days_until_clamped(end);
            fv_positive += entry.amount().mul_scalar(reinvest_rate.compound_factor(days)?);
        }
    }
    if pv_negative.is_zero() {
        return Err(EngineError::NoConvergence(
            "MIRR requires at least one negative cash flow".to_string(),
        ));
    }

    let total_days = Decimal::from((end - start).max(1));
    let years = total_days / Decimal::from(finance_rate.year_basis().days());
    let ratio = fv_positive.raw() / pv_negative.raw();
    let rate = ratio.powd(Decimal::ONE / years) - Decimal::ONE;
    Ok(InterestRate::new(rate, Frequency::Annual, finance_rate.year_basis(), None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cashflows::entry::Category;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn dt(y: i32, m: u32, d: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    #[test]
    fn irr_of_a_simple_loan_matches_its_coupon_rate() {
        let entries = vec![
            CashFlowEntry::new(Money::from_cents(-100_000_00), dt(2024, 1, 1), "disb", Category::ExpectedDisbursement),
            CashFlowEntry::new(Money::from_cents(110_000_00), dt(2025, 1, 1), "repay", Category::ExpectedPrincipal),
        ];
        let rate = internal_rate_of_return(&entries, None, YearBasis::Commercial365).unwrap();
        assert!((rate.rate() - dec!(0.10)).abs() < dec!(0.01));
    }

    #[test]
    fn irr_with_no_sign_change_fails() {
        let entries = vec![CashFlowEntry::new(
            Money::from_cents(100_00),
            dt(2024, 1, 1),
            "a",
            Category::ExpectedPrincipal,
        )];
        assert!(internal_rate_of_return(&entries, None, YearBasis::Commercial365).is_err());
    }
}
