/// Derived `Installment` and `Settlement` views over a loan's payment history.
pub mod installment;
/// The `Loan` aggregate and its payment-recording state machine.
pub mod state;

pub use installment::{Installment, Settlement, SettlementAllocation};
pub use state::{Loan, MoraStrategy};
