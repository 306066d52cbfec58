use thiserror::Error;

/// Errors raised by the overlay datagram transport.
#[derive(Error, Debug)]
pub enum TransportError {
    /// `send` or `recv` was attempted after [`crate::Transport::close`].
    #[error("transport closed")]
    TransportClosed,

    /// `recv` was interrupted by the caller's cancellation token, distinct
    /// from closure (spec.md §5 "Server context cancellation ... `recv`
    /// returns a cancellation indication distinct from close").
    #[error("operation cancelled")]
    Cancelled,

    /// A dialed transport attempted to send before any peer address was
    /// known, or a listener attempted to send before its first `recv`
    /// captured a sender.
    #[error("no peer address known for this transport")]
    NoPeer,

    /// The received datagram was smaller than the overlay envelope header
    /// or did not carry the expected magic value.
    #[error("malformed overlay envelope: {0}")]
    BadEnvelope(String),

    /// Frame-level encode/decode failure.
    #[error(transparent)]
    Protocol(#[from] strand_proto::ProtocolError),

    /// Underlying socket I/O failure.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}
