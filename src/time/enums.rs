/// Unit a [`super::period::Period`] is expressed in.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TimeUnit {
    /// Variant value.
    Days,
    /// Variant value.
    Weeks,
    /// Variant value.
    Months,
    /// Variant value.
    Years,
}
