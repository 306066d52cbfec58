//! L5 server dispatch for Strand (spec.md §4.G).
//!
//! A [`Server`] owns one [`strand_transport::Transport`], a mandatory
//! [`Handler`] for synchronous inference, and optional [`StreamHandler`]
//! and [`AgentHandler`] registrations. [`Server::run`] dispatches each
//! inbound frame to its own task; unknown opcodes are logged and
//! discarded rather than treated as fatal (spec.md §7).
//!
//! Streaming responses are driven through a [`TokenSender`], which also
//! exposes the server-initiated tool round trip
//! ([`TokenSender::invoke_tool`]) described in spec.md §4.G: the stream
//! suspends until the matching `ToolResult` arrives.

mod error;
mod handler;
mod server;
mod token_sender;

pub use error::{HandlerError, ServerError, ToolInvokeError};
pub use handler::{AgentHandler, Handler, StreamHandler};
pub use server::Server;
pub use token_sender::TokenSender;
