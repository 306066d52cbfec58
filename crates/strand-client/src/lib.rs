//! L5 client for Strand (spec.md §4.H).
//!
//! [`Client`] dials a peer's [`strand_transport::Transport`] and exposes
//! request/response [`Client::infer`], a strictly-ordered
//! [`Client::stream_tokens`] channel, agent negotiation/delegation, and
//! cancellation. A background reader task demultiplexes inbound frames to
//! whichever caller is waiting on them; callers never touch the transport
//! directly.

mod client;
mod error;
mod reader;
mod stream;
mod tool;

pub use client::Client;
pub use error::ClientError;
pub use stream::TokenStream;
pub use tool::{NO_HANDLER_REGISTERED, ToolHandler};
