use strand_codec::{Reader, Writer};

use crate::{ProtocolError, bounds::TENSOR_PAYLOAD_MAX, request_id::RequestId};

/// Maximum number of dimensions accepted in a tensor's `shape`. Not
/// specified numerically by the protocol; bounds allocation for a field
/// that otherwise has no natural size cap.
pub const TENSOR_SHAPE_MAX_DIMS: usize = 32;

/// `TensorTransfer` (opcode `0x06`). Raw tensor payload transfer, bounded
/// to 16 MiB per spec.md §4.C.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorTransfer {
    /// Correlation id for this transfer.
    pub request_id: RequestId,
    /// Caller-assigned tensor name.
    pub tensor_name: String,
    /// Tensor dimensions.
    pub shape: Vec<u32>,
    /// Element data type (e.g. `"f32"`, `"bf16"`).
    pub dtype: String,
    /// Raw tensor bytes. Capped at [`TENSOR_PAYLOAD_MAX`] (16 MiB).
    pub data: Vec<u8>,
}

impl TensorTransfer {
    pub(crate) fn encode(&self, w: &mut Writer) {
        self.request_id.encode(w);
        w.write_string(&self.tensor_name);
        w.write_list(&self.shape, |w, dim| w.write_u32(*dim));
        w.write_string(&self.dtype);
        w.write_bytes(&self.data);
    }

    pub(crate) fn decode(r: &mut Reader<'_>) -> Result<Self, ProtocolError> {
        let request_id = RequestId::decode(r)?;
        let tensor_name = r.read_string(crate::bounds::SHORT_STRING_MAX)?;
        let shape = r.read_list(TENSOR_SHAPE_MAX_DIMS, |r| r.read_u32())?;
        let dtype = r.read_string(crate::bounds::SHORT_STRING_MAX)?;
        let data = r.read_bytes(TENSOR_PAYLOAD_MAX)?;
        Ok(Self { request_id, tensor_name, shape, dtype, data })
    }
}
