use thiserror::Error;

/// Errors raised by the routing table and resolver.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoutingError {
    /// [`crate::RoutingTable::insert`] was given a [`crate::RouteEntry`]
    /// that violates one of spec.md §3's declared field invariants: a
    /// `trust_level` outside `0..=4`, or a `load_factor` outside `0.0..=1.0`.
    #[error("invalid route entry: {0}")]
    InvalidEntry(String),
}
