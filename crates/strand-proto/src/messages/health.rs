use strand_codec::{Reader, Writer};

use crate::{ProtocolError, bounds::SHORT_STRING_MAX, request_id::RequestId};

/// `Heartbeat` (opcode `0x08`). Bidirectional keepalive; carries no
/// correlation id since it applies to the connection as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Heartbeat {
    /// Sender-assigned monotonic sequence number.
    pub seq_num: u64,
}

impl Heartbeat {
    pub(crate) fn encode(&self, w: &mut Writer) {
        w.write_u64(self.seq_num);
    }

    pub(crate) fn decode(r: &mut Reader<'_>) -> Result<Self, ProtocolError> {
        Ok(Self { seq_num: r.read_u64()? })
    }
}

/// `HealthCheck` (opcode `0x10`). Liveness probe sent to a fleet node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthCheck {
    /// Correlation id for the matching `HealthStatus`.
    pub request_id: RequestId,
    /// Identifier of the node being probed.
    pub node_id: String,
}

impl HealthCheck {
    pub(crate) fn encode(&self, w: &mut Writer) {
        self.request_id.encode(w);
        w.write_string(&self.node_id);
    }

    pub(crate) fn decode(r: &mut Reader<'_>) -> Result<Self, ProtocolError> {
        let request_id = RequestId::decode(r)?;
        let node_id = r.read_string(SHORT_STRING_MAX)?;
        Ok(Self { request_id, node_id })
    }
}

/// `HealthStatus` (opcode `0x11`). Response to a `HealthCheck`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    /// Correlation id matching the originating `HealthCheck`.
    pub request_id: RequestId,
    /// `true` if the node considers itself healthy.
    pub healthy: bool,
    /// Free-form status detail (e.g. a reason when unhealthy).
    pub detail: String,
}

impl HealthStatus {
    pub(crate) fn encode(&self, w: &mut Writer) {
        self.request_id.encode(w);
        w.write_u8(u8::from(self.healthy));
        w.write_string(&self.detail);
    }

    pub(crate) fn decode(r: &mut Reader<'_>) -> Result<Self, ProtocolError> {
        let request_id = RequestId::decode(r)?;
        let healthy = r.read_u8()? != 0;
        let detail = r.read_string(SHORT_STRING_MAX)?;
        Ok(Self { request_id, healthy, detail })
    }
}

/// `Cancel` (opcode `0x12`). Requests that an in-flight request or stream
/// be abandoned; the receiver stops producing further frames for
/// `request_id` but need not emit any acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancel {
    /// The request or stream to cancel.
    pub request_id: RequestId,
}

impl Cancel {
    pub(crate) fn encode(&self, w: &mut Writer) {
        self.request_id.encode(w);
    }

    pub(crate) fn decode(r: &mut Reader<'_>) -> Result<Self, ProtocolError> {
        Ok(Self { request_id: RequestId::decode(r)? })
    }
}
