/// Frozen cash-flow record and the closed category taxonomy.
pub mod entry;
/// Ordered collection of `CashFlowItem`s with a fluent query builder.
pub mod flow;
/// Temporal container resolving a timeline of entries at a point in time.
pub mod item;
