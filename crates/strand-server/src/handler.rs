use async_trait::async_trait;
use strand_proto::{AgentDelegate, AgentNegotiate, AgentResult, InferenceRequest, InferenceResponse};
use tokio_util::sync::CancellationToken;

use crate::{error::HandlerError, token_sender::TokenSender};

/// The server's primary, synchronous inference handler (spec.md §4.G, §6).
///
/// Every [`crate::Server`] has exactly one. An `InferenceRequest` is routed
/// here whenever no [`StreamHandler`] is registered.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Produce a single `InferenceResponse` for `req`.
    ///
    /// # Errors
    ///
    /// Any `Err` is surfaced to the peer as a uniform `OpError` frame
    /// (spec.md §7).
    async fn handle_inference(
        &self,
        ctx: &CancellationToken,
        req: InferenceRequest,
    ) -> Result<InferenceResponse, HandlerError>;
}

/// Optional streaming inference handler (spec.md §4.G, §6).
///
/// When registered, every `InferenceRequest` is routed here instead of the
/// primary [`Handler`]: the server sends `TokenStreamStart`, then the
/// handler emits zero or more chunks through `sender`, then the server
/// sends `TokenStreamEnd` on success or an `OpError` (and no `End`) if the
/// handler returns `Err`.
#[async_trait]
pub trait StreamHandler: Send + Sync {
    /// Drive one streamed response to `req` through `sender`.
    ///
    /// `ctx` must be observed at every suspension point: cancellation
    /// (from [`crate::Server::run`]'s context, or a peer `Cancel` frame for
    /// this `request_id`) should cause the handler to return promptly
    /// (spec.md §5).
    ///
    /// # Errors
    ///
    /// Any `Err` aborts the stream: the server emits `OpError` and does
    /// not send `TokenStreamEnd`.
    async fn handle_token_stream(
        &self,
        ctx: &CancellationToken,
        req: InferenceRequest,
        sender: TokenSender,
    ) -> Result<(), HandlerError>;
}

/// Optional agent negotiation and delegation handler (spec.md §4.G, §6).
#[async_trait]
pub trait AgentHandler: Send + Sync {
    /// Respond to a capability-exchange `AgentNegotiate` with the server's
    /// own capability set.
    ///
    /// # Errors
    ///
    /// Any `Err` is surfaced as a uniform `OpError` frame.
    async fn handle_agent_negotiate(
        &self,
        ctx: &CancellationToken,
        msg: AgentNegotiate,
    ) -> Result<AgentNegotiate, HandlerError>;

    /// Execute a delegated task. The server always emits exactly one
    /// `AgentResult` with the matching `session_id` regardless of whether
    /// this returns `Ok` or `Err` (spec.md §4.G: "the server MUST emit
    /// exactly one `OpAgentResult`").
    ///
    /// # Errors
    ///
    /// An `Err` is translated into an `AgentResult` with a non-zero
    /// `error_code` rather than an `OpError` frame, preserving the
    /// one-result-per-delegation contract.
    async fn handle_agent_delegate(
        &self,
        ctx: &CancellationToken,
        msg: AgentDelegate,
    ) -> Result<AgentResult, HandlerError>;
}
