//! The Strand L5 application protocol: frame format, opcode catalogue, and
//! message types exchanged between clients, servers, and fleet nodes.
//!
//! A [`Frame`] is the wire unit (`[u32 len LE][u8 opcode][payload]`); a
//! [`Message`] is the typed, decoded form of a frame's payload, dispatched
//! by [`Opcode`]. Every message field that has no natural bound is capped
//! at decode time (see [`bounds`]) so a malicious declared length never
//! drives an allocation before it has been validated.

pub mod bounds;
mod error;
mod frame;
mod messages;
mod opcode;
mod request_id;

pub use error::ProtocolError;
pub use frame::{Frame, MAX_FRAME_PAYLOAD};
pub use messages::{
    AgentDelegate, AgentNegotiate, AgentResult, Cancel, ContextAck, ContextShare, ErrorMessage,
    HealthCheck, HealthStatus, Heartbeat, InferenceRequest, InferenceResponse, Message,
    SessionId, TENSOR_SHAPE_MAX_DIMS, TensorTransfer, ToolInvoke, ToolResult, TokenStreamChunk,
    TokenStreamEnd, TokenStreamStart,
};
pub use opcode::{LEGACY_AGENT_NEGOTIATION, Opcode};
pub use request_id::RequestId;
