//! loancore is a time-value-of-money and loan-amortization engine.
//!
//! It models a personal loan as an explicit state machine: a `Loan`
//! carries its own scheduler, interest rate, tax policy, and a temporal
//! cash-flow ledger, and records payments against it with a fixed
//! allocation priority (fines, then interest, then principal). Present
//! value, internal rate of return, and grossed-up principals are built
//! on top of the same [`money::Money`]/[`rates::interestrate::InterestRate`]
//! primitives the loan state machine itself uses.

/// Frozen cash-flow records and the temporal ledger built from them.
pub mod cashflows;
/// The `Loan` aggregate and its payment-recording state machine.
pub mod loan;
/// Exact-decimal monetary amounts.
pub mod money;
/// Decimal interest rates: frequencies, day-count bases, conversions.
pub mod rates;
/// Convenient re-export of the crate's most commonly used types.
pub mod prelude;
/// Amortization schedulers (Price / InvertedPrice).
pub mod schedule;
/// Transaction taxes (IOF) and the grossup solver.
pub mod tax;
/// Present value, annuities/perpetuities, IRR and MIRR.
pub mod tvm;
/// Calendar dates, periods, and the overridable clock.
pub mod time;
/// The engine-wide error type.
pub mod utils;
/// Scoped, isolated observation of a loan as of a fixed date.
pub mod warp;
