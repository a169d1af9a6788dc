/// Frequency, year-basis, and display-style enumerations for interest rates.
pub mod enums;
/// Decimal interest rate with parsing, frequency conversion, and accrual.
pub mod interestrate;
