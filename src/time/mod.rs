/// Shared overridable time source (`TimeContext`) used by `Loan` and `Warp`.
pub mod clock;
/// Calendar date wrapping `chrono::NaiveDate` with anchored month arithmetic.
pub mod date;
/// Periodic due-date generators (monthly, bi-weekly, ...).
pub mod dategen;
/// Small enumerations shared by `date` and `period`.
pub mod enums;
/// A length of calendar time used to step a date forward or back.
pub mod period;
