use strand_codec::{Reader, Writer};

/// 16-byte correlation identifier carried on every request/response/stream
/// chunk (spec.md §4.C). Opaque to the protocol layer: callers mint it
/// however they like (UUID, random nonce, etc).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub [u8; 16]);

impl RequestId {
    /// Construct from raw bytes.
    #[must_use]
    pub const fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// The all-zero request id, used as a sentinel in tests and for
    /// opcodes that don't correlate to a specific request.
    #[must_use]
    pub const fn nil() -> Self {
        Self([0u8; 16])
    }

    pub(crate) fn encode(&self, w: &mut Writer) {
        w.write_fixed(&self.0);
    }

    pub(crate) fn decode(r: &mut Reader<'_>) -> strand_codec::Result<Self> {
        Ok(Self(r.read_fixed()?))
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}
