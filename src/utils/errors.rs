use chrono::ParseError;
use thiserror::Error;

/// Every fallible operation in this crate returns `Result<T, EngineError>`.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Construction or parsing input failed validation (bad principal, bad rate
    /// string, non-positive interval, etc).
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A date string or naive date-time could not be parsed or coerced.
    #[error("invalid date: {0}")]
    InvalidDate(String),
    /// Chrono failed to parse a date string with the requested format.
    #[error("date parsing error: {0}")]
    DateParsingErr(#[from] ParseError),
    /// A `Warp` was entered while another was already active.
    #[error("a warp is already active")]
    NestedWarp,
    /// An IRR search was given a flow with no sign change.
    #[error("cash flow has no sign change")]
    NoSignChange,
    /// A root-finder failed to converge within its bounds.
    #[error("solver failed to converge: {0}")]
    NoConvergence(String),
    /// A payment's remainder exceeded fines + interest + principal.
    #[error("payment of {0} exceeds outstanding balance")]
    OverPayment(String),
    /// A payment was attempted on a loan that is already paid off.
    #[error("loan is already paid off")]
    PaidOff,
    /// The underlying `argmin` solver reported an internal failure.
    #[error("solver error: {0}")]
    SolverErr(#[from] argmin::core::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EngineError>;
