//! The L5 message catalogue: one variant per wire [`crate::Opcode`].
//!
//! Each message struct owns its own `encode`/`decode` pair against the raw
//! payload bytes; [`Message`] is the opcode-keyed dispatch wrapper around
//! them, analogous to how a tagged union mirrors its discriminant.

mod agent;
mod context;
mod error_msg;
mod health;
mod inference;
mod stream;
mod tensor;
mod tool;

pub use agent::{AgentDelegate, AgentNegotiate, AgentResult, SessionId};
pub use context::{ContextAck, ContextShare};
pub use error_msg::ErrorMessage;
pub use health::{Cancel, HealthCheck, HealthStatus, Heartbeat};
pub use inference::{InferenceRequest, InferenceResponse};
pub use stream::{TokenStreamChunk, TokenStreamEnd, TokenStreamStart};
pub use tensor::{TENSOR_SHAPE_MAX_DIMS, TensorTransfer};
pub use tool::{ToolInvoke, ToolResult};

use bytes::Bytes;
use strand_codec::{Reader, Writer};

use crate::{Frame, ProtocolError, opcode::Opcode};

/// A decoded L5 protocol message, tagged by its originating [`Opcode`].
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// See [`InferenceRequest`].
    InferenceRequest(InferenceRequest),
    /// See [`InferenceResponse`].
    InferenceResponse(InferenceResponse),
    /// See [`TokenStreamStart`].
    TokenStreamStart(TokenStreamStart),
    /// See [`TokenStreamChunk`].
    TokenStreamChunk(TokenStreamChunk),
    /// See [`TokenStreamEnd`].
    TokenStreamEnd(TokenStreamEnd),
    /// See [`TensorTransfer`].
    TensorTransfer(TensorTransfer),
    /// See [`Heartbeat`].
    Heartbeat(Heartbeat),
    /// See [`AgentNegotiate`].
    AgentNegotiate(AgentNegotiate),
    /// See [`AgentDelegate`].
    AgentDelegate(AgentDelegate),
    /// See [`AgentResult`].
    AgentResult(AgentResult),
    /// See [`ToolInvoke`].
    ToolInvoke(ToolInvoke),
    /// See [`ToolResult`].
    ToolResult(ToolResult),
    /// See [`ContextShare`].
    ContextShare(ContextShare),
    /// See [`ContextAck`].
    ContextAck(ContextAck),
    /// See [`HealthCheck`].
    HealthCheck(HealthCheck),
    /// See [`HealthStatus`].
    HealthStatus(HealthStatus),
    /// See [`Cancel`].
    Cancel(Cancel),
    /// See [`ErrorMessage`].
    Error(ErrorMessage),
}

impl Message {
    /// The canonical opcode for this message's variant.
    #[must_use]
    pub fn opcode(&self) -> Opcode {
        match self {
            Self::InferenceRequest(_) => Opcode::InferenceRequest,
            Self::InferenceResponse(_) => Opcode::InferenceResponse,
            Self::TokenStreamStart(_) => Opcode::TokenStreamStart,
            Self::TokenStreamChunk(_) => Opcode::TokenStreamChunk,
            Self::TokenStreamEnd(_) => Opcode::TokenStreamEnd,
            Self::TensorTransfer(_) => Opcode::TensorTransfer,
            Self::Heartbeat(_) => Opcode::Heartbeat,
            Self::AgentNegotiate(_) => Opcode::AgentNegotiate,
            Self::AgentDelegate(_) => Opcode::AgentDelegate,
            Self::AgentResult(_) => Opcode::AgentResult,
            Self::ToolInvoke(_) => Opcode::ToolInvoke,
            Self::ToolResult(_) => Opcode::ToolResult,
            Self::ContextShare(_) => Opcode::ContextShare,
            Self::ContextAck(_) => Opcode::ContextAck,
            Self::HealthCheck(_) => Opcode::HealthCheck,
            Self::HealthStatus(_) => Opcode::HealthStatus,
            Self::Cancel(_) => Opcode::Cancel,
            Self::Error(_) => Opcode::Error,
        }
    }

    /// Encode just this message's payload bytes (no frame header).
    fn encode_payload(&self) -> Bytes {
        let mut w = Writer::new();
        match self {
            Self::InferenceRequest(m) => m.encode(&mut w),
            Self::InferenceResponse(m) => m.encode(&mut w),
            Self::TokenStreamStart(m) => m.encode(&mut w),
            Self::TokenStreamChunk(m) => m.encode(&mut w),
            Self::TokenStreamEnd(m) => m.encode(&mut w),
            Self::TensorTransfer(m) => m.encode(&mut w),
            Self::Heartbeat(m) => m.encode(&mut w),
            Self::AgentNegotiate(m) => m.encode(&mut w),
            Self::AgentDelegate(m) => m.encode(&mut w),
            Self::AgentResult(m) => m.encode(&mut w),
            Self::ToolInvoke(m) => m.encode(&mut w),
            Self::ToolResult(m) => m.encode(&mut w),
            Self::ContextShare(m) => m.encode(&mut w),
            Self::ContextAck(m) => m.encode(&mut w),
            Self::HealthCheck(m) => m.encode(&mut w),
            Self::HealthStatus(m) => m.encode(&mut w),
            Self::Cancel(m) => m.encode(&mut w),
            Self::Error(m) => m.encode(&mut w),
        }
        w.into_bytes().freeze()
    }

    /// Decode a message from a raw opcode byte and payload, accepting the
    /// legacy `0x07` `AgentNegotiation` alias.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::UnknownOpcode`] if `opcode_byte` matches no
    /// known (or legacy) opcode, or the variant-specific decode error if the
    /// payload is malformed.
    pub fn decode_payload(opcode_byte: u8, payload: &[u8]) -> Result<Self, ProtocolError> {
        let opcode = Opcode::from_u8_accepting_legacy(opcode_byte)
            .ok_or(ProtocolError::UnknownOpcode(opcode_byte))?;
        let mut r = Reader::new(payload);
        Ok(match opcode {
            Opcode::InferenceRequest => Self::InferenceRequest(InferenceRequest::decode(&mut r)?),
            Opcode::InferenceResponse => {
                Self::InferenceResponse(InferenceResponse::decode(&mut r)?)
            }
            Opcode::TokenStreamStart => Self::TokenStreamStart(TokenStreamStart::decode(&mut r)?),
            Opcode::TokenStreamChunk => Self::TokenStreamChunk(TokenStreamChunk::decode(&mut r)?),
            Opcode::TokenStreamEnd => Self::TokenStreamEnd(TokenStreamEnd::decode(&mut r)?),
            Opcode::TensorTransfer => Self::TensorTransfer(TensorTransfer::decode(&mut r)?),
            Opcode::Heartbeat => Self::Heartbeat(Heartbeat::decode(&mut r)?),
            Opcode::AgentNegotiate => Self::AgentNegotiate(AgentNegotiate::decode(&mut r)?),
            Opcode::AgentDelegate => Self::AgentDelegate(AgentDelegate::decode(&mut r)?),
            Opcode::AgentResult => Self::AgentResult(AgentResult::decode(&mut r)?),
            Opcode::ToolInvoke => Self::ToolInvoke(ToolInvoke::decode(&mut r)?),
            Opcode::ToolResult => Self::ToolResult(ToolResult::decode(&mut r)?),
            Opcode::ContextShare => Self::ContextShare(ContextShare::decode(&mut r)?),
            Opcode::ContextAck => Self::ContextAck(ContextAck::decode(&mut r)?),
            Opcode::HealthCheck => Self::HealthCheck(HealthCheck::decode(&mut r)?),
            Opcode::HealthStatus => Self::HealthStatus(HealthStatus::decode(&mut r)?),
            Opcode::Cancel => Self::Cancel(Cancel::decode(&mut r)?),
            Opcode::Error => Self::Error(ErrorMessage::decode(&mut r)?),
        })
    }

    /// Encode this message into a complete wire [`Frame`].
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::FrameTooLarge`] if the encoded payload
    /// exceeds [`crate::MAX_FRAME_PAYLOAD`].
    pub fn into_frame(&self) -> Result<Frame, ProtocolError> {
        let payload = self.encode_payload();
        let frame = Frame::new(self.opcode(), payload);
        if frame.payload.len() > crate::frame::MAX_FRAME_PAYLOAD {
            return Err(ProtocolError::FrameTooLarge {
                size: frame.payload.len(),
                max: crate::frame::MAX_FRAME_PAYLOAD,
            });
        }
        Ok(frame)
    }

    /// Decode a message from an already-framed [`Frame`].
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::UnknownOpcode`] if the frame's opcode byte
    /// is unrecognized, or the variant-specific decode error if the payload
    /// is malformed.
    pub fn from_frame(frame: &Frame) -> Result<Self, ProtocolError> {
        Self::decode_payload(frame.opcode_byte, &frame.payload)
    }
}

#[cfg(test)]
mod tests {
    use strand_sad::SadBuilder;

    use super::*;
    use crate::request_id::RequestId;

    fn sample_messages() -> Vec<Message> {
        let sad = SadBuilder::new().version(1).model_type("gpt-oracle").build().unwrap();
        vec![
            Message::InferenceRequest(InferenceRequest {
                request_id: RequestId::new([1; 16]),
                prompt: "hello".to_owned(),
                max_tokens: 64,
                sad,
            }),
            Message::Heartbeat(Heartbeat { seq_num: 42 }),
            Message::AgentNegotiate(AgentNegotiate {
                session_id: SessionId([2; 16]),
                capabilities: vec!["tool_use".to_owned()],
            }),
            Message::Error(ErrorMessage::new(RequestId::nil(), 404, "not found")),
        ]
    }

    #[test]
    fn round_trip_through_frame() {
        for msg in sample_messages() {
            let frame = msg.into_frame().unwrap();
            let decoded = Message::from_frame(&frame).unwrap();
            assert_eq!(decoded, msg);
            assert_eq!(frame.opcode(), Some(msg.opcode()));
        }
    }

    #[test]
    fn legacy_agent_negotiation_byte_decodes_to_agent_negotiate() {
        let msg = Message::AgentNegotiate(AgentNegotiate {
            session_id: SessionId([9; 16]),
            capabilities: vec![],
        });
        let payload = msg.encode_payload();
        let decoded = Message::decode_payload(0x07, &payload).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn unknown_opcode_byte_rejected() {
        let err = Message::decode_payload(0x7E, &[]).unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownOpcode(0x7E)));
    }
}
