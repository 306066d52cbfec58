use strand_codec::{Reader, Writer};

use crate::{ProtocolError, bounds::TOOL_ARGUMENTS_MAX, request_id::RequestId};

/// `ToolInvoke` (opcode `0x0C`). Server-initiated request that the client
/// invoke a named tool; may only be sent mid-stream (spec.md §4.G).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvoke {
    /// Correlation id for the matching `ToolResult`.
    pub request_id: RequestId,
    /// Name of the tool to invoke.
    pub tool_name: String,
    /// Serialized tool arguments. Capped at [`TOOL_ARGUMENTS_MAX`] (256 KiB).
    pub arguments: Vec<u8>,
}

impl ToolInvoke {
    pub(crate) fn encode(&self, w: &mut Writer) {
        self.request_id.encode(w);
        w.write_string(&self.tool_name);
        w.write_bytes(&self.arguments);
    }

    pub(crate) fn decode(r: &mut Reader<'_>) -> Result<Self, ProtocolError> {
        let request_id = RequestId::decode(r)?;
        let tool_name = r.read_string(crate::bounds::SHORT_STRING_MAX)?;
        let arguments = r.read_bytes(TOOL_ARGUMENTS_MAX)?;
        Ok(Self { request_id, tool_name, arguments })
    }
}

/// `ToolResult` (opcode `0x0D`). Client's response to a `ToolInvoke`;
/// `error_code == 0` is success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    /// Correlation id matching the originating `ToolInvoke`.
    pub request_id: RequestId,
    /// Result payload. Capped at [`TOOL_ARGUMENTS_MAX`] (256 KiB).
    pub result_payload: Vec<u8>,
    /// `0` on success; any other value identifies a failure mode.
    pub error_code: u16,
}

impl ToolResult {
    pub(crate) fn encode(&self, w: &mut Writer) {
        self.request_id.encode(w);
        w.write_bytes(&self.result_payload);
        w.write_u16(self.error_code);
    }

    pub(crate) fn decode(r: &mut Reader<'_>) -> Result<Self, ProtocolError> {
        let request_id = RequestId::decode(r)?;
        let result_payload = r.read_bytes(TOOL_ARGUMENTS_MAX)?;
        let error_code = r.read_u16()?;
        Ok(Self { request_id, result_payload, error_code })
    }
}
