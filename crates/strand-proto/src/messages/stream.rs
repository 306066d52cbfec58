use strand_codec::{Reader, Writer};

use crate::{ProtocolError, bounds::SHORT_STRING_MAX, request_id::RequestId};

/// `TokenStreamStart` (opcode `0x03`). First frame of a token stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenStreamStart {
    /// Correlation id shared by every frame in this stream.
    pub request_id: RequestId,
}

impl TokenStreamStart {
    pub(crate) fn encode(&self, w: &mut Writer) {
        self.request_id.encode(w);
    }

    pub(crate) fn decode(r: &mut Reader<'_>) -> Result<Self, ProtocolError> {
        Ok(Self { request_id: RequestId::decode(r)? })
    }
}

/// `TokenStreamChunk` (opcode `0x04`). One token within a stream.
///
/// `seq_num` is monotonic per `request_id`, starting at 0 (spec.md §4.C);
/// the codec does not itself enforce monotonicity — that is a sender-side
/// and receiver-side invariant enforced by `strand-server`/`strand-client`.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenStreamChunk {
    /// Correlation id shared by every frame in this stream.
    pub request_id: RequestId,
    /// Zero-based, strictly increasing sequence number within the stream.
    pub seq_num: u32,
    /// Token (or token fragment) text.
    pub token: String,
    /// Log-probability of this token, if the model reports one.
    pub logprob: f32,
}

impl TokenStreamChunk {
    pub(crate) fn encode(&self, w: &mut Writer) {
        self.request_id.encode(w);
        w.write_u32(self.seq_num);
        w.write_string(&self.token);
        w.write_f32(self.logprob);
    }

    pub(crate) fn decode(r: &mut Reader<'_>) -> Result<Self, ProtocolError> {
        let request_id = RequestId::decode(r)?;
        let seq_num = r.read_u32()?;
        let token = r.read_string(SHORT_STRING_MAX)?;
        let logprob = r.read_f32()?;
        Ok(Self { request_id, seq_num, token, logprob })
    }
}

/// `TokenStreamEnd` (opcode `0x05`). Final frame of a token stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenStreamEnd {
    /// Correlation id shared by every frame in this stream.
    pub request_id: RequestId,
}

impl TokenStreamEnd {
    pub(crate) fn encode(&self, w: &mut Writer) {
        self.request_id.encode(w);
    }

    pub(crate) fn decode(r: &mut Reader<'_>) -> Result<Self, ProtocolError> {
        Ok(Self { request_id: RequestId::decode(r)? })
    }
}
