use strand_codec::{Reader, Writer};

use crate::{
    ProtocolError,
    bounds::{AGENT_CAPABILITY_LIST_MAX, BLOB_MAX, LONG_STRING_MAX, SHORT_STRING_MAX},
};

/// Session identifier binding an `AgentNegotiate`/`AgentDelegate`/
/// `AgentResult` triple together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub [u8; 16]);

impl SessionId {
    pub(crate) fn encode(&self, w: &mut Writer) {
        w.write_fixed(&self.0);
    }

    pub(crate) fn decode(r: &mut Reader<'_>) -> strand_codec::Result<Self> {
        Ok(Self(r.read_fixed()?))
    }
}

/// `AgentNegotiate` (opcode `0x09`, also accepted as legacy `0x07`).
/// Capability-exchange request/response; the same struct and opcode are
/// used in both directions, correlated by `session_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentNegotiate {
    /// Session this negotiation belongs to.
    pub session_id: SessionId,
    /// Advertised or requested capability names. Capped at
    /// [`AGENT_CAPABILITY_LIST_MAX`] (256) entries.
    pub capabilities: Vec<String>,
}

impl AgentNegotiate {
    pub(crate) fn encode(&self, w: &mut Writer) {
        self.session_id.encode(w);
        w.write_list(&self.capabilities, |w, cap| w.write_string(cap));
    }

    pub(crate) fn decode(r: &mut Reader<'_>) -> Result<Self, ProtocolError> {
        let session_id = SessionId::decode(r)?;
        let capabilities =
            r.read_list(AGENT_CAPABILITY_LIST_MAX, |r| r.read_string(SHORT_STRING_MAX))?;
        Ok(Self { session_id, capabilities })
    }
}

/// `AgentDelegate` (opcode `0x0A`). Hands off a task to a delegate agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentDelegate {
    /// Session this delegation belongs to.
    pub session_id: SessionId,
    /// Human-readable task description.
    pub task: String,
    /// Opaque context bytes for the delegate.
    pub context: Vec<u8>,
}

impl AgentDelegate {
    pub(crate) fn encode(&self, w: &mut Writer) {
        self.session_id.encode(w);
        w.write_string(&self.task);
        w.write_bytes(&self.context);
    }

    pub(crate) fn decode(r: &mut Reader<'_>) -> Result<Self, ProtocolError> {
        let session_id = SessionId::decode(r)?;
        let task = r.read_string(LONG_STRING_MAX)?;
        let context = r.read_bytes(BLOB_MAX)?;
        Ok(Self { session_id, task, context })
    }
}

/// `AgentResult` (opcode `0x0B`). Exactly one is emitted per
/// `AgentDelegate`, matching `session_id`; `error_code == 0` is success
/// (spec.md §4.G, §7).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentResult {
    /// Session this result belongs to.
    pub session_id: SessionId,
    /// `0` on success; any other value identifies a failure mode.
    pub error_code: u16,
    /// Result payload bytes (empty on failure, by convention).
    pub result: Vec<u8>,
}

impl AgentResult {
    pub(crate) fn encode(&self, w: &mut Writer) {
        self.session_id.encode(w);
        w.write_u16(self.error_code);
        w.write_bytes(&self.result);
    }

    pub(crate) fn decode(r: &mut Reader<'_>) -> Result<Self, ProtocolError> {
        let session_id = SessionId::decode(r)?;
        let error_code = r.read_u16()?;
        let result = r.read_bytes(BLOB_MAX)?;
        Ok(Self { session_id, error_code, result })
    }
}
