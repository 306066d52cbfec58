use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicU32, Ordering},
    },
};

use strand_proto::{Message, Opcode, RequestId, ToolInvoke, ToolResult, TokenStreamChunk};
use strand_transport::Transport;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::error::{ServerError, ToolInvokeError};

pub(crate) type PendingTools = Arc<Mutex<HashMap<RequestId, oneshot::Sender<ToolResult>>>>;

/// Handed to a [`crate::StreamHandler`] to emit `TokenStreamChunk` frames
/// and, mid-stream, round-trip a server-initiated tool call (spec.md §4.G).
///
/// `seq_num` is assigned internally and is strictly increasing starting at
/// 0 for a given `request_id`, satisfying the ordering invariant in
/// spec.md §5 without the handler having to track it itself.
pub struct TokenSender {
    transport: Arc<Transport>,
    request_id: RequestId,
    next_seq: AtomicU32,
    pending_tools: PendingTools,
}

impl TokenSender {
    pub(crate) fn new(
        transport: Arc<Transport>,
        request_id: RequestId,
        pending_tools: PendingTools,
    ) -> Self {
        Self { transport, request_id, next_seq: AtomicU32::new(0), pending_tools }
    }

    /// The stream this sender emits chunks for.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Send one `TokenStreamChunk` with the next sequence number.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] if encoding or the underlying send fails.
    pub async fn send_chunk(
        &self,
        ctx: &CancellationToken,
        token: impl Into<String>,
        logprob: f32,
    ) -> Result<(), ServerError> {
        let seq_num = self.next_seq.fetch_add(1, Ordering::SeqCst);
        let chunk = TokenStreamChunk { request_id: self.request_id, seq_num, token: token.into(), logprob };
        let frame = Message::TokenStreamChunk(chunk).into_frame()?;
        self.transport.send(ctx, Opcode::TokenStreamChunk, frame.payload).await?;
        Ok(())
    }

    /// Send a `ToolInvoke` for this stream's `request_id` and suspend until
    /// the matching `ToolResult` arrives, `ctx` is cancelled, or the
    /// dispatch loop drops the waiter (spec.md §4.G tool contract,
    /// §5 "the server suspends stream emission until `OpToolResult`
    /// arrives").
    ///
    /// Only one tool round trip may be outstanding per stream at a time;
    /// starting a second call before the first resolves replaces the
    /// pending waiter for this `request_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolInvokeError::Cancelled`] if `ctx` fires first, or
    /// [`ToolInvokeError::Transport`] if sending the invocation fails.
    pub async fn invoke_tool(
        &self,
        ctx: &CancellationToken,
        tool_name: impl Into<String>,
        arguments: Vec<u8>,
    ) -> Result<ToolResult, ToolInvokeError> {
        let (tx, rx) = oneshot::channel();
        self.pending_tools
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(self.request_id, tx);

        let invoke = ToolInvoke { request_id: self.request_id, tool_name: tool_name.into(), arguments };
        let frame = Message::ToolInvoke(invoke)
            .into_frame()
            .map_err(strand_transport::TransportError::from)?;
        self.transport.send(ctx, Opcode::ToolInvoke, frame.payload).await?;

        tokio::select! {
            biased;
            () = ctx.cancelled() => {
                self.pending_tools
                    .lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner)
                    .remove(&self.request_id);
                Err(ToolInvokeError::Cancelled)
            }
            result = rx => result.map_err(|_| ToolInvokeError::WaiterDropped),
        }
    }
}
