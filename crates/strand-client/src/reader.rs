use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use strand_proto::{AgentResult, InferenceResponse, Message, Opcode, ProtocolError, RequestId, SessionId};
use strand_transport::{Transport, TransportError};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use crate::{
    error::ClientError,
    stream::{ReorderBuffer, StreamEvent},
    tool::{NO_HANDLER_REGISTERED, ToolHandler},
};

type InferWaiter = oneshot::Sender<Result<InferenceResponse, ClientError>>;
type AgentResultWaiter = oneshot::Sender<Result<AgentResult, ClientError>>;
type AgentNegotiateWaiter =
    oneshot::Sender<Result<strand_proto::AgentNegotiate, ClientError>>;

/// State shared between [`crate::Client`] and its background reader task.
pub(crate) struct Shared {
    pub(crate) pending_infer: Mutex<HashMap<RequestId, InferWaiter>>,
    pub(crate) streams: Mutex<HashMap<RequestId, (mpsc::Sender<StreamEvent>, ReorderBuffer)>>,
    pub(crate) pending_agent_negotiate: Mutex<HashMap<SessionId, AgentNegotiateWaiter>>,
    pub(crate) pending_agent_delegate: Mutex<HashMap<SessionId, AgentResultWaiter>>,
    pub(crate) tool_handler: Mutex<Option<Arc<dyn ToolHandler>>>,
}

impl Shared {
    pub(crate) fn new() -> Self {
        Self {
            pending_infer: Mutex::new(HashMap::new()),
            streams: Mutex::new(HashMap::new()),
            pending_agent_negotiate: Mutex::new(HashMap::new()),
            pending_agent_delegate: Mutex::new(HashMap::new()),
            tool_handler: Mutex::new(None),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Run the demultiplexing reader loop until `ctx` is cancelled or the
/// transport closes (spec.md §4.H, §5: "the client reads in a dedicated
/// reader task").
pub(crate) async fn run(transport: Arc<Transport>, shared: Arc<Shared>, ctx: CancellationToken) {
    loop {
        let (opcode_byte, payload) = match transport.recv(&ctx).await {
            Ok(frame) => frame,
            Err(TransportError::Cancelled | TransportError::TransportClosed) => break,
            Err(err) => {
                tracing::warn!(error = %err, "client reader task stopping after transport failure");
                break;
            }
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

        match message {
            Message::InferenceResponse(resp) => {
                if let Some(tx) = lock(&shared.pending_infer).remove(&resp.request_id) {
                    let _ignored_if_dropped = tx.send(Ok(resp));
                }
            }
            Message::Error(err) => {
                if let Some(tx) = lock(&shared.pending_infer).remove(&err.request_id) {
                    let _ignored_if_dropped =
                        tx.send(Err(ClientError::Server { code: err.code, message: err.message }));
                } else {
                    forward_stream_error(&shared, err).await;
                }
            }
            Message::TokenStreamStart(start) => {
                tracing::trace!(request_id = %start.request_id, "token stream started");
            }
            Message::TokenStreamChunk(chunk) => forward_stream_chunk(&shared, chunk).await,
            Message::TokenStreamEnd(end) => forward_stream_end(&shared, end.request_id).await,
            Message::AgentNegotiate(msg) => {
                if let Some(tx) = lock(&shared.pending_agent_negotiate).remove(&msg.session_id) {
                    let _ignored_if_dropped = tx.send(Ok(msg));
                } else {
                    tracing::debug!(session_id = ?msg.session_id, "unsolicited agent negotiate, discarding");
                }
            }
            Message::AgentResult(result) => {
                if let Some(tx) = lock(&shared.pending_agent_delegate).remove(&result.session_id) {
                    let _ignored_if_dropped = tx.send(Ok(result));
                }
            }
            Message::ToolInvoke(invoke) => handle_tool_invoke(&transport, &shared, &ctx, invoke).await,
            Message::Heartbeat(beat) => {
                tracing::trace!(seq_num = beat.seq_num, "received heartbeat");
            }
            other => {
                tracing::debug!(opcode = ?other.opcode(), "no client-side handling for this message, discarding");
            }
        }
    }

    tracing::debug!("client reader task stopped");
}

async fn forward_stream_error(shared: &Shared, err: strand_proto::ErrorMessage) {
    let request_id = err.request_id;
    let sender = lock(&shared.streams).remove(&request_id).map(|(tx, _)| tx);
    if let Some(sender) = sender {
        if sender.send(StreamEvent::Error(err)).await.is_err() {
            tracing::debug!(request_id = %request_id, "stream receiver dropped before error delivery");
        }
    }
}

async fn forward_stream_chunk(shared: &Shared, chunk: strand_proto::TokenStreamChunk) {
    let request_id = chunk.request_id;
    let ready = {
        let mut streams = lock(&shared.streams);
        let Some((_, reorder)) = streams.get_mut(&request_id) else {
            tracing::debug!(request_id = %request_id, "chunk for unknown stream, discarding");
            return;
        };
        reorder.accept(chunk)
    };
    for item in ready {
        let sender = { lock(&shared.streams).get(&request_id).map(|(tx, _)| tx.clone()) };
        let Some(sender) = sender else { return };
        if sender.send(StreamEvent::Chunk(item)).await.is_err() {
            tracing::debug!(request_id = %request_id, "stream receiver dropped, removing stream state");
            lock(&shared.streams).remove(&request_id);
            return;
        }
    }
}

async fn forward_stream_end(shared: &Shared, request_id: RequestId) {
    let sender = lock(&shared.streams).remove(&request_id).map(|(tx, _)| tx);
    if let Some(sender) = sender {
        let _ignored_if_receiver_gone = sender.send(StreamEvent::End).await;
    }
}

async fn handle_tool_invoke(
    transport: &Arc<Transport>,
    shared: &Shared,
    ctx: &CancellationToken,
    invoke: strand_proto::ToolInvoke,
) {
    let request_id = invoke.request_id;
    let handler = lock(&shared.tool_handler).clone();
    let result = match handler {
        Some(handler) => handler.invoke(ctx, invoke).await,
        None => strand_proto::ToolResult {
            request_id,
            result_payload: Vec::new(),
            error_code: NO_HANDLER_REGISTERED,
        },
    };
    let frame = match Message::ToolResult(result).into_frame() {
        Ok(frame) => frame,
        Err(err) => {
            tracing::warn!(error = %err, "failed to encode ToolResult");
            return;
        }
    };
    if let Err(err) = transport.send(ctx, Opcode::ToolResult, frame.payload).await {
        tracing::warn!(error = %err, "failed to send ToolResult");
    }
}
