use thiserror::Error;

/// Errors raised by the Strand L5 client (spec.md §4.H, §7).
#[derive(Error, Debug)]
pub enum ClientError {
    /// The underlying transport failed.
    #[error(transparent)]
    Transport(#[from] strand_transport::TransportError),

    /// A frame failed to decode into a known [`strand_proto::Message`].
    #[error(transparent)]
    Protocol(#[from] strand_proto::ProtocolError),

    /// The server answered with an `OpError` frame for this request.
    #[error("server error {code}: {message}")]
    Server {
        /// The error code carried on the `OpError` frame.
        code: u16,
        /// The human-readable detail carried on the `OpError` frame.
        message: String,
    },

    /// `infer`, `stream_tokens`, or a tool/agent call was attempted after
    /// [`crate::Client::close`].
    #[error("client closed")]
    Closed,

    /// The reader task exited (transport closed or panicked) before a
    /// reply to this request arrived.
    #[error("no reply arrived before the client's reader task stopped")]
    ReaderStopped,
}
