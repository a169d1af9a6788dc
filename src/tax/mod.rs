/// Bracketed-root grossup solver and `grossup_loan` sugar.
pub mod grossup;
/// The concrete IOF tax strategy.
pub mod iof;
/// The `BaseTax` capability trait and `TaxResult`.
pub mod traits;
