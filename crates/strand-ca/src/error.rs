use thiserror::Error;

/// Errors raised by the MIC certificate authority (spec.md §4.K, §7).
#[derive(Error, Debug)]
pub enum CaError {
    /// `issue` was asked to sign a certificate that already carries a
    /// non-empty signature.
    #[error("certificate '{0}' is already signed")]
    AlreadySigned(String),

    /// The root keypair has not been generated yet.
    #[error("certificate authority has no root keypair")]
    NoRootKey,

    /// The underlying state store failed.
    #[error(transparent)]
    Store(#[from] strand_store::StoreError),
}

impl CaError {
    /// Whether a caller may safely retry (spec.md §7): only store-backed
    /// failures are ever transient, and then only when the store itself
    /// reports so.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, CaError::Store(source) if source.is_transient())
    }
}
