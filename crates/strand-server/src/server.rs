use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use strand_proto::{AgentResult, ErrorMessage, HealthStatus, Message, ProtocolError, RequestId};
use strand_transport::{Transport, TransportError};
use tokio_util::sync::CancellationToken;

use crate::{
    error::ServerError,
    handler::{AgentHandler, Handler, StreamHandler},
    token_sender::{PendingTools, TokenSender},
};

/// Generic failure code used for `AgentResult.error_code` and `OpError`
/// when no more specific code applies (spec.md §7: structured codes are
/// reserved to message-specific fields).
const GENERIC_FAILURE: u16 = 1;

/// Opcode-keyed dispatcher over one [`Transport`] (spec.md §4.G).
///
/// Owns a single primary [`Handler`] (synchronous inference) plus optional
/// [`StreamHandler`] and [`AgentHandler`] registrations. Every inbound
/// frame is dispatched to its own task ([`Server::run`]); unknown opcodes
/// are logged and discarded rather than treated as fatal.
///
/// `Clone` is cheap — every field is an `Arc` — so a dispatch task can own
/// its own handle back into the server (e.g. to resolve a `ToolResult`)
/// without borrowing across the `tokio::spawn` boundary.
#[derive(Clone)]
pub struct Server {
    transport: Arc<Transport>,
    handler: Arc<dyn Handler>,
    stream_handler: Option<Arc<dyn StreamHandler>>,
    agent_handler: Option<Arc<dyn AgentHandler>>,
    pending_tools: PendingTools,
    active_requests: Arc<Mutex<HashMap<RequestId, CancellationToken>>>,
}

impl Server {
    /// A server with only the mandatory primary [`Handler`] registered.
    #[must_use]
    pub fn new(transport: Arc<Transport>, handler: Arc<dyn Handler>) -> Self {
        Self {
            transport,
            handler,
            stream_handler: None,
            agent_handler: None,
            pending_tools: Arc::new(Mutex::new(HashMap::new())),
            active_requests: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Register a streaming handler. Once set, every `InferenceRequest`
    /// routes to it instead of the primary [`Handler`] (spec.md §4.G).
    #[must_use]
    pub fn with_stream_handler(mut self, handler: Arc<dyn StreamHandler>) -> Self {
        self.stream_handler = Some(handler);
        self
    }

    /// Register an agent negotiation/delegation handler.
    #[must_use]
    pub fn with_agent_handler(mut self, handler: Arc<dyn AgentHandler>) -> Self {
        self.agent_handler = Some(handler);
        self
    }

    /// Receive and dispatch frames until `ctx` is cancelled or the
    /// transport closes.
    ///
    /// Each received frame is handed to its own task (spec.md §4.G: "each
    /// frame dispatched to its own task"); a decode failure or an unknown
    /// opcode is logged and the loop continues without tearing down the
    /// listener (spec.md §7).
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] only for a transport failure other than
    /// cancellation or closure, both of which end the loop quietly.
    pub async fn run(&self, ctx: CancellationToken) -> Result<(), ServerError> {
        loop {
            let (opcode_byte, payload) = match self.transport.recv(&ctx).await {
                Ok(frame) => frame,
                Err(TransportError::Cancelled | TransportError::TransportClosed) => return Ok(()),
                Err(err) => return Err(err.into()),
            };

            let message = match Message::decode_payload(opcode_byte, &payload) {
                Ok(message) => message,
                Err(ProtocolError::UnknownOpcode(byte)) => {
                    tracing::debug!(opcode = byte, "unknown opcode, discarding");
                    continue;
                }
                Err(err) => {
                    tracing::warn!(error = %err, "failed to decode inbound message, discarding");
                    continue;
                }
            };

            // ToolResult and Cancel resolve in-flight state directly rather
            // than spawning a handler task.
            match message {
                Message::ToolResult(result) => {
                    if let Some(tx) =
                        self.pending_tools.lock().unwrap_or_else(std::sync::PoisonError::into_inner).remove(&result.request_id)
                    {
                        let _ignored_if_waiter_gone = tx.send(result);
                    }
                    continue;
                }
                Message::Cancel(cancel) => {
                    if let Some(token) = self
                        .active_requests
                        .lock()
                        .unwrap_or_else(std::sync::PoisonError::into_inner)
                        .get(&cancel.request_id)
                    {
                        token.cancel();
                    }
                    continue;
                }
                _ => {}
            }

            let server = self.clone();
            let child_ctx = ctx.child_token();
            tokio::spawn(async move { server.dispatch(child_ctx, message).await });
        }
    }

    async fn dispatch(&self, ctx: CancellationToken, message: Message) {
        match message {
            Message::InferenceRequest(req) => self.dispatch_inference(ctx, req).await,
            Message::AgentNegotiate(msg) => self.dispatch_agent_negotiate(&ctx, msg).await,
            Message::AgentDelegate(msg) => self.dispatch_agent_delegate(ctx, msg).await,
            Message::HealthCheck(msg) => self.dispatch_health_check(&ctx, msg).await,
            Message::ContextShare(msg) => self.dispatch_context_share(&ctx, msg).await,
            Message::Heartbeat(msg) => {
                tracing::trace!(seq_num = msg.seq_num, "received heartbeat");
            }
            other => {
                tracing::debug!(opcode = ?other.opcode(), "no dispatch rule for this message, discarding");
            }
        }
    }

    async fn dispatch_inference(&self, ctx: CancellationToken, req: strand_proto::InferenceRequest) {
        let request_id = req.request_id;
        self.active_requests
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(request_id, ctx.clone());

        if let Some(stream_handler) = self.stream_handler.clone() {
            self.run_stream(ctx.clone(), stream_handler, req).await;
        } else {
            self.run_sync_inference(&ctx, req).await;
        }

        self.active_requests.lock().unwrap_or_else(std::sync::PoisonError::into_inner).remove(&request_id);
    }

    async fn run_sync_inference(&self, ctx: &CancellationToken, req: strand_proto::InferenceRequest) {
        let request_id = req.request_id;
        match self.handler.handle_inference(ctx, req).await {
            Ok(resp) => self.send_or_log(ctx, Message::InferenceResponse(resp)).await,
            Err(err) => self.send_error(ctx, request_id, &err.message).await,
        }
    }

    async fn run_stream(
        &self,
        ctx: CancellationToken,
        stream_handler: Arc<dyn StreamHandler>,
        req: strand_proto::InferenceRequest,
    ) {
        let request_id = req.request_id;
        self.send_or_log(&ctx, Message::TokenStreamStart(strand_proto::TokenStreamStart { request_id }))
            .await;

        let sender = TokenSender::new(Arc::clone(&self.transport), request_id, Arc::clone(&self.pending_tools));
        match stream_handler.handle_token_stream(&ctx, req, sender).await {
            Ok(()) => {
                self.send_or_log(&ctx, Message::TokenStreamEnd(strand_proto::TokenStreamEnd { request_id }))
                    .await;
            }
            Err(err) => {
                // spec.md §4.G: on handler error mid-stream, emit OpError
                // and do NOT send TokenStreamEnd.
                self.send_error(&ctx, request_id, &err.message).await;
            }
        }
    }

    async fn dispatch_agent_negotiate(&self, ctx: &CancellationToken, msg: strand_proto::AgentNegotiate) {
        let Some(agent_handler) = &self.agent_handler else {
            tracing::debug!("agent negotiate received with no agent handler registered, discarding");
            return;
        };
        match agent_handler.handle_agent_negotiate(ctx, msg).await {
            Ok(response) => self.send_or_log(ctx, Message::AgentNegotiate(response)).await,
            Err(err) => self.send_error(ctx, RequestId::nil(), &err.message).await,
        }
    }

    async fn dispatch_agent_delegate(&self, ctx: CancellationToken, msg: strand_proto::AgentDelegate) {
        let session_id = msg.session_id;
        // spec.md §4.G: the server MUST emit exactly one AgentResult per
        // delegation, even with no handler registered.
        let result = match &self.agent_handler {
            Some(agent_handler) => agent_handler.handle_agent_delegate(&ctx, msg).await.unwrap_or_else(|err| {
                AgentResult { session_id, error_code: GENERIC_FAILURE, result: err.message.into_bytes() }
            }),
            None => AgentResult {
                session_id,
                error_code: GENERIC_FAILURE,
                result: b"no agent handler registered".to_vec(),
            },
        };
        self.send_or_log(&ctx, Message::AgentResult(result)).await;
    }

    async fn dispatch_health_check(&self, ctx: &CancellationToken, msg: strand_proto::HealthCheck) {
        let status = HealthStatus {
            request_id: msg.request_id,
            healthy: true,
            detail: format!("{} reachable", msg.node_id),
        };
        self.send_or_log(ctx, Message::HealthStatus(status)).await;
    }

    async fn dispatch_context_share(&self, ctx: &CancellationToken, msg: strand_proto::ContextShare) {
        let ack = strand_proto::ContextAck { request_id: msg.request_id, accepted: true };
        self.send_or_log(ctx, Message::ContextAck(ack)).await;
    }

    async fn send_error(&self, ctx: &CancellationToken, request_id: RequestId, detail: &str) {
        let err = ErrorMessage::new(request_id, GENERIC_FAILURE, detail);
        self.send_or_log(ctx, Message::Error(err)).await;
    }

    async fn send_or_log(&self, ctx: &CancellationToken, message: Message) {
        let frame = match message.into_frame() {
            Ok(frame) => frame,
            Err(err) => {
                tracing::warn!(error = %err, "failed to encode outbound message, dropping");
                return;
            }
        };
        let Some(opcode) = frame.opcode() else {
            tracing::warn!("outbound frame carried an unrecognized opcode, dropping");
            return;
        };
        if let Err(err) = self.transport.send(ctx, opcode, frame.payload).await {
            tracing::warn!(error = %err, "failed to send outbound frame");
        }
    }
}
