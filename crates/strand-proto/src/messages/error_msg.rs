use strand_codec::{Reader, Writer};

use crate::{ProtocolError, bounds::LONG_STRING_MAX, request_id::RequestId};

/// `Error` (opcode `0xFF`). The uniform error frame emitted for any request
/// that cannot be satisfied; always correlates back to the request it
/// refuses (spec.md §7).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMessage {
    /// Correlation id of the request this error responds to, or
    /// [`RequestId::nil`] if the failure predates correlation (e.g. a
    /// malformed frame header).
    pub request_id: RequestId,
    /// Machine-readable error code (see `strand-proto` error kind table).
    pub code: u16,
    /// Human-readable detail.
    pub message: String,
}

impl ErrorMessage {
    /// Build an error frame for a request that failed with the given code
    /// and detail message.
    #[must_use]
    pub fn new(request_id: RequestId, code: u16, message: impl Into<String>) -> Self {
        Self { request_id, code, message: message.into() }
    }

    pub(crate) fn encode(&self, w: &mut Writer) {
        self.request_id.encode(w);
        w.write_u16(self.code);
        w.write_string(&self.message);
    }

    pub(crate) fn decode(r: &mut Reader<'_>) -> Result<Self, ProtocolError> {
        let request_id = RequestId::decode(r)?;
        let code = r.read_u16()?;
        let message = r.read_string(LONG_STRING_MAX)?;
        Ok(Self { request_id, code, message })
    }
}
