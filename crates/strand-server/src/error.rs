use thiserror::Error;

/// Errors raised by server dispatch (spec.md §4.G, §7).
#[derive(Error, Debug)]
pub enum ServerError {
    /// The underlying transport failed.
    #[error(transparent)]
    Transport(#[from] strand_transport::TransportError),

    /// A frame failed to decode into a known [`strand_proto::Message`].
    #[error(transparent)]
    Protocol(#[from] strand_proto::ProtocolError),
}

/// Error returned by application handlers (spec.md §6 "Handler-facing
/// APIs"). Always surfaced to the peer uniformly as an `OpError` frame
/// carrying `message` (spec.md §7); `code` is reserved for future
/// machine-readable dispatch and defaults to a generic value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct HandlerError {
    /// Human-readable detail sent verbatim as the `OpError` payload.
    pub message: String,
    /// Machine-readable error code. `0` is reserved for success and is
    /// never constructed via [`HandlerError::new`]; callers that need a
    /// specific code should set it explicitly with [`HandlerError::with_code`].
    pub code: u16,
}

impl HandlerError {
    /// A handler error with the generic code `1` and the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), code: 1 }
    }

    /// A handler error with an explicit machine-readable code.
    pub fn with_code(code: u16, message: impl Into<String>) -> Self {
        Self { message: message.into(), code }
    }
}

/// Outcome of waiting for a server-initiated tool round trip
/// ([`crate::TokenSender::invoke_tool`]).
#[derive(Error, Debug)]
pub enum ToolInvokeError {
    /// The transport failed while sending `ToolInvoke` or waiting for the
    /// matching `ToolResult`.
    #[error(transparent)]
    Transport(#[from] strand_transport::TransportError),

    /// The stream's cancellation token fired before a `ToolResult` arrived.
    #[error("tool invocation cancelled")]
    Cancelled,

    /// The dispatch loop dropped the waiter (e.g. the connection closed)
    /// before a `ToolResult` arrived.
    #[error("tool invocation waiter dropped before a result arrived")]
    WaiterDropped,
}
