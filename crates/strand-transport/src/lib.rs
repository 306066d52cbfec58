//! Overlay datagram transport for the Strand L5 protocol (spec.md §4.B, §6).
//!
//! A [`Transport`] wraps an unordered UDP datagram substrate with the
//! overlay envelope (`magic 0x4E58` + 6 reserved bytes + frame bytes) and
//! exposes connection-oriented `send`/`recv` semantics: a listener binds
//! once and services multiple peers, capturing the first sender's address
//! for subsequent sends; a dialed transport targets one fixed peer.
//!
//! Every suspending call takes a [`tokio_util::sync::CancellationToken`] as
//! its first parameter (spec.md §9 "Context propagation") rather than
//! relying on ambient state, and cancellation is distinguishable from
//! transport closure ([`TransportError::Cancelled`] vs.
//! [`TransportError::TransportClosed`]).

mod error;
mod overlay;
mod udp;

pub use error::TransportError;
pub use overlay::{OVERLAY_MAGIC, OVERLAY_PORT, OVERLAY_RESERVED_LEN};
pub use udp::Transport;

/// Convenience alias for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;
