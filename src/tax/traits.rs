use crate::money::Money;
use crate::schedule::entry::PaymentSchedule;
use crate::time::date::Date;
use crate::utils::errors::Result;
use serde::{Deserialize, Serialize};

/// Tax levied against one installment's principal component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxInstallment {
    /// Field value.
    pub payment_number: u32,
    /// Field value.
    pub due_date: Date,
    /// Field value.
    pub principal_payment: Money,
    /// Field value.
    pub tax_amount: Money,
}

/// # TaxResult
/// The total tax a schedule incurs, broken down per installment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxResult {
    /// Field value.
    pub total: Money,
    /// Field value.
    pub per_installment: Vec<TaxInstallment>,
}

/// Capability shared by every tax strategy: derive a `TaxResult` from a
/// schedule and the date the principal was disbursed. A sum-type would also
/// fit (the set of tax regimes is closed for this crate), but taxes are an
/// injected, caller-supplied policy on `Loan`, which favors a trait object
/// over widening `Loan`'s own enum every time a jurisdiction is added.
pub trait BaseTax {
    /// Accessor.
    fn calculate(&self, schedule: &PaymentSchedule, disbursement_date: Date) -> Result<TaxResult>;

    /// Used by [`crate::warp::Warp`] to deep-clone a loan's tax strategy
    /// along with everything else, since `Box<dyn BaseTax>` cannot derive
    /// `Clone` on its own.
    fn clone_box(&self) -> Box<dyn BaseTax>;
}
