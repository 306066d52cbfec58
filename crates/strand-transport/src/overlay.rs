//! Overlay datagram envelope: `magic 0x4E58` (big-endian u16) + 6 reserved
//! bytes + frame bytes (spec.md §4.B, §6).
//!
//! The 6 reserved bytes carry no documented meaning (spec.md §9 Open
//! Questions): senders write zero, receivers ignore whatever is there.

use bytes::{BufMut, BytesMut};

use crate::error::TransportError;

/// Overlay envelope magic value, big-endian on the wire.
pub const OVERLAY_MAGIC: u16 = 0x4E58;

/// Reserved header bytes following the magic. No documented meaning.
pub const OVERLAY_RESERVED_LEN: usize = 6;

/// Default overlay UDP port.
pub const OVERLAY_PORT: u16 = 6477;

const HEADER_LEN: usize = 2 + OVERLAY_RESERVED_LEN;

/// Prefix `frame_bytes` with the overlay envelope header.
#[must_use]
pub fn encode_envelope(frame_bytes: &[u8]) -> BytesMut {
    let mut buf = BytesMut::with_capacity(HEADER_LEN + frame_bytes.len());
    buf.put_u16(OVERLAY_MAGIC);
    buf.put_slice(&[0u8; OVERLAY_RESERVED_LEN]);
    buf.put_slice(frame_bytes);
    buf
}

/// Validate and strip the overlay envelope header, returning the remaining
/// frame bytes.
///
/// # Errors
///
/// Returns [`TransportError::BadEnvelope`] if `datagram` is shorter than the
/// envelope header or its magic does not match [`OVERLAY_MAGIC`].
pub fn decode_envelope(datagram: &[u8]) -> Result<&[u8], TransportError> {
    if datagram.len() < HEADER_LEN {
        return Err(TransportError::BadEnvelope(format!(
            "datagram of {} bytes shorter than {HEADER_LEN}-byte envelope header",
            datagram.len()
        )));
    }
    let magic = u16::from_be_bytes([datagram[0], datagram[1]]);
    if magic != OVERLAY_MAGIC {
        return Err(TransportError::BadEnvelope(format!(
            "bad magic {magic:#06x}, expected {OVERLAY_MAGIC:#06x}"
        )));
    }
    Ok(&datagram[HEADER_LEN..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_envelope() {
        let frame = b"hello frame bytes";
        let encoded = encode_envelope(frame);
        let decoded = decode_envelope(&encoded).unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn reserved_bytes_are_zero_on_encode() {
        let encoded = encode_envelope(b"x");
        assert_eq!(&encoded[2..HEADER_LEN], &[0u8; OVERLAY_RESERVED_LEN]);
    }

    #[test]
    fn short_datagram_rejected() {
        let err = decode_envelope(&[0x4E, 0x58, 0, 0]).unwrap_err();
        assert!(matches!(err, TransportError::BadEnvelope(_)));
    }

    #[test]
    fn bad_magic_rejected() {
        let mut datagram = vec![0u8; HEADER_LEN];
        datagram[0] = 0xAB;
        datagram[1] = 0xCD;
        let err = decode_envelope(&datagram).unwrap_err();
        assert!(matches!(err, TransportError::BadEnvelope(_)));
    }
}
