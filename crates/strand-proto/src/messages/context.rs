use strand_codec::{Reader, Writer};

use crate::{ProtocolError, bounds::CONTEXT_DATA_MAX, request_id::RequestId};

/// `ContextShare` (opcode `0x0E`). Pushes conversational/agent context to
/// the peer; acknowledged by a matching `ContextAck`.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextShare {
    /// Correlation id for the matching `ContextAck`.
    pub request_id: RequestId,
    /// Identifies the context slot being shared (e.g. a session or thread).
    pub context_id: String,
    /// Opaque context bytes. Capped at [`CONTEXT_DATA_MAX`] (4 MiB).
    pub context_data: Vec<u8>,
}

impl ContextShare {
    pub(crate) fn encode(&self, w: &mut Writer) {
        self.request_id.encode(w);
        w.write_string(&self.context_id);
        w.write_bytes(&self.context_data);
    }

    pub(crate) fn decode(r: &mut Reader<'_>) -> Result<Self, ProtocolError> {
        let request_id = RequestId::decode(r)?;
        let context_id = r.read_string(crate::bounds::SHORT_STRING_MAX)?;
        let context_data = r.read_bytes(CONTEXT_DATA_MAX)?;
        Ok(Self { request_id, context_id, context_data })
    }
}

/// `ContextAck` (opcode `0x0F`). Acknowledges receipt of a `ContextShare`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextAck {
    /// Correlation id matching the originating `ContextShare`.
    pub request_id: RequestId,
    /// `true` if the context was accepted and stored.
    pub accepted: bool,
}

impl ContextAck {
    pub(crate) fn encode(&self, w: &mut Writer) {
        self.request_id.encode(w);
        w.write_u8(u8::from(self.accepted));
    }

    pub(crate) fn decode(r: &mut Reader<'_>) -> Result<Self, ProtocolError> {
        let request_id = RequestId::decode(r)?;
        let accepted = r.read_u8()? != 0;
        Ok(Self { request_id, accepted })
    }
}
