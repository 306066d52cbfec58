use thiserror::Error;

/// Errors raised by the control-plane state store (spec.md §4.I, §7).
#[derive(Error, Debug)]
pub enum StoreError {
    /// `create` was called with a key that already exists (the underlying
    /// CAS transaction observed a non-zero version).
    #[error("key '{0}' already exists")]
    AlreadyExists(String),

    /// `get`/`update`/`delete` was called with a key that does not exist.
    #[error("key '{0}' not found")]
    NotFound(String),

    /// A stored value failed to (de)serialize as JSON.
    #[error("serialization failure for key '{key}': {source}")]
    Serde {
        /// Key whose value failed to (de)serialize.
        key: String,
        /// Underlying `serde_json` failure.
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Whether a caller may safely retry this operation (spec.md §7 retry
    /// policy: idempotent reads may be retried; this is always false for
    /// state-mutating errors surfaced here, which reflect a definitive
    /// precondition failure rather than a transient fault).
    #[must_use]
    pub fn is_transient(&self) -> bool {
        false
    }
}
