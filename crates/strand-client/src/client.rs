use std::{net::SocketAddr, sync::Arc};

use strand_proto::{
    AgentDelegate, AgentNegotiate, AgentResult, InferenceRequest, InferenceResponse, Message,
    RequestId, SessionId,
};
use strand_transport::Transport;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use crate::{
    error::ClientError,
    reader::{self, Shared},
    stream::{STREAM_CHANNEL_CAPACITY, TokenStream},
    tool::ToolHandler,
};

/// L5 client over one dialed [`Transport`] (spec.md §4.H).
///
/// Spawns a dedicated reader task on [`Self::dial`] that demultiplexes
/// inbound frames to whichever caller is waiting on them — a pending
/// [`Self::infer`] call, an open [`TokenStream`], an agent negotiation, or
/// the registered [`ToolHandler`]. `Client` itself is cheap to clone; every
/// field is an `Arc` and the reader task is shared across clones.
#[derive(Clone)]
pub struct Client {
    transport: Arc<Transport>,
    shared: Arc<Shared>,
    reader_ctx: CancellationToken,
}

impl Client {
    /// Dial `addr` and start the background reader task.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] if the underlying socket cannot be
    /// opened.
    pub async fn dial(addr: SocketAddr) -> Result<Self, ClientError> {
        let transport = Arc::new(Transport::dial(addr).await?);
        let shared = Arc::new(Shared::new());
        let reader_ctx = CancellationToken::new();

        tokio::spawn(reader::run(Arc::clone(&transport), Arc::clone(&shared), reader_ctx.clone()));

        Ok(Self { transport, shared, reader_ctx })
    }

    /// Register the handler invoked for server-initiated `ToolInvoke`
    /// frames. Replaces any previously registered handler.
    pub fn set_tool_handler(&self, handler: Arc<dyn ToolHandler>) {
        *self.shared.tool_handler.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = Some(handler);
    }

    /// Send a synchronous `InferenceRequest` and await its single
    /// `InferenceResponse` (spec.md §4.A, §6).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Server`] if the server answered with an
    /// `OpError` frame, [`ClientError::ReaderStopped`] if the reader task
    /// exited before a reply arrived, or a transport/protocol error.
    pub async fn infer(
        &self,
        ctx: &CancellationToken,
        request: InferenceRequest,
    ) -> Result<InferenceResponse, ClientError> {
        let request_id = request.request_id;
        let (tx, rx) = oneshot::channel();
        self.shared
            .pending_infer
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(request_id, tx);

        if let Err(err) = self.send(ctx, Message::InferenceRequest(request)).await {
            self.shared
                .pending_infer
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .remove(&request_id);
            return Err(err);
        }

        tokio::select! {
            biased;
            () = ctx.cancelled() => {
                self.shared
                    .pending_infer
                    .lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner)
                    .remove(&request_id);
                Err(ClientError::Transport(strand_transport::TransportError::Cancelled))
            }
            result = rx => result.unwrap_or(Err(ClientError::ReaderStopped)),
        }
    }

    /// Send an `InferenceRequest` and return a [`TokenStream`] yielding its
    /// `TokenStreamChunk`s in order (spec.md §4.C, §6).
    ///
    /// # Errors
    ///
    /// Returns a transport/protocol error if the request itself could not
    /// be sent.
    pub async fn stream_tokens(
        &self,
        ctx: &CancellationToken,
        request: InferenceRequest,
    ) -> Result<TokenStream, ClientError> {
        let request_id = request.request_id;
        let (tx, rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);
        self.shared
            .streams
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(request_id, (tx, crate::stream::ReorderBuffer::new()));

        if let Err(err) = self.send(ctx, Message::InferenceRequest(request)).await {
            self.shared.streams.lock().unwrap_or_else(std::sync::PoisonError::into_inner).remove(&request_id);
            return Err(err);
        }

        Ok(TokenStream::new(request_id, rx))
    }

    /// Negotiate agent capabilities for a new session (spec.md §4.G).
    ///
    /// # Errors
    ///
    /// Returns a transport/protocol error, or [`ClientError::ReaderStopped`]
    /// if the reader task exited before the counterpart negotiation arrived.
    pub async fn negotiate_agent(
        &self,
        ctx: &CancellationToken,
        session_id: SessionId,
        capabilities: Vec<String>,
    ) -> Result<AgentNegotiate, ClientError> {
        let (tx, rx) = oneshot::channel();
        self.shared
            .pending_agent_negotiate
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(session_id, tx);

        let msg = AgentNegotiate { session_id, capabilities };
        if let Err(err) = self.send(ctx, Message::AgentNegotiate(msg)).await {
            self.shared
                .pending_agent_negotiate
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .remove(&session_id);
            return Err(err);
        }

        tokio::select! {
            biased;
            () = ctx.cancelled() => {
                self.shared
                    .pending_agent_negotiate
                    .lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner)
                    .remove(&session_id);
                Err(ClientError::Transport(strand_transport::TransportError::Cancelled))
            }
            result = rx => result.unwrap_or(Err(ClientError::ReaderStopped)),
        }
    }

    /// Delegate a task to an agent and await exactly one `AgentResult`
    /// (spec.md §4.G).
    ///
    /// # Errors
    ///
    /// Returns a transport/protocol error, or [`ClientError::ReaderStopped`]
    /// if the reader task exited before the result arrived.
    pub async fn delegate_agent(
        &self,
        ctx: &CancellationToken,
        session_id: SessionId,
        task: impl Into<String>,
        context: Vec<u8>,
    ) -> Result<AgentResult, ClientError> {
        let (tx, rx) = oneshot::channel();
        self.shared
            .pending_agent_delegate
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(session_id, tx);

        let msg = AgentDelegate { session_id, task: task.into(), context };
        if let Err(err) = self.send(ctx, Message::AgentDelegate(msg)).await {
            self.shared
                .pending_agent_delegate
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .remove(&session_id);
            return Err(err);
        }

        tokio::select! {
            biased;
            () = ctx.cancelled() => {
                self.shared
                    .pending_agent_delegate
                    .lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner)
                    .remove(&session_id);
                Err(ClientError::Transport(strand_transport::TransportError::Cancelled))
            }
            result = rx => result.unwrap_or(Err(ClientError::ReaderStopped)),
        }
    }

    /// Ask the server to abandon an in-flight request or stream (spec.md
    /// §4.G `Cancel`). Fire-and-forget: the receiver need not acknowledge.
    ///
    /// # Errors
    ///
    /// Returns a transport/protocol error if the cancellation itself could
    /// not be sent.
    pub async fn cancel(&self, ctx: &CancellationToken, request_id: RequestId) -> Result<(), ClientError> {
        self.send(ctx, Message::Cancel(strand_proto::Cancel { request_id })).await
    }

    /// Stop the reader task and close the underlying transport. Idempotent.
    pub fn close(&self) {
        self.reader_ctx.cancel();
        self.transport.close();
    }

    async fn send(&self, ctx: &CancellationToken, message: Message) -> Result<(), ClientError> {
        if self.reader_ctx.is_cancelled() {
            return Err(ClientError::Closed);
        }
        let opcode = message.opcode();
        let frame = message.into_frame()?;
        self.transport.send(ctx, opcode, frame.payload).await?;
        Ok(())
    }
}
