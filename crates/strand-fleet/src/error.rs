use thiserror::Error;

/// Errors raised by fleet reconcilers (spec.md §4.J, §7).
#[derive(Error, Debug)]
pub enum FleetError {
    /// The underlying state store failed.
    #[error(transparent)]
    Store(#[from] strand_store::StoreError),
}

impl FleetError {
    /// Whether a caller may safely retry (spec.md §7): only transient
    /// store failures are.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            FleetError::Store(source) => source.is_transient(),
        }
    }
}
