use async_trait::async_trait;
use strand_proto::{ToolInvoke, ToolResult};
use tokio_util::sync::CancellationToken;

/// Handles a server-initiated `ToolInvoke` mid-stream (spec.md §4.G tool
/// contract). Registered via [`crate::Client::set_tool_handler`]; if none
/// is registered, the client replies with a generic failure `ToolResult`
/// so the server's stream is never left blocked waiting indefinitely.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Execute `invoke` and produce the `ToolResult` to send back. This
    /// never itself fails — a tool-level failure is expressed through
    /// `ToolResult.error_code`, preserving the "client MUST respond"
    /// contract.
    async fn invoke(&self, ctx: &CancellationToken, invoke: ToolInvoke) -> ToolResult;
}

/// Error code used when no [`ToolHandler`] is registered.
pub const NO_HANDLER_REGISTERED: u16 = 1;
