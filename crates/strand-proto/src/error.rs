use thiserror::Error;

/// Errors raised while framing or decoding L5 protocol messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Wraps a primitive-level codec failure (short buffer, oversize field,
    /// invalid UTF-8).
    #[error(transparent)]
    Codec(#[from] strand_codec::CodecError),

    /// Wraps a SAD encode/decode or validation failure.
    #[error(transparent)]
    Sad(#[from] strand_sad::SadError),

    /// A frame's declared length exceeded [`crate::MAX_FRAME_PAYLOAD`].
    /// Raised before the payload buffer is allocated.
    #[error("frame payload too large: {size} bytes exceeds {max} byte limit")]
    FrameTooLarge {
        /// Declared payload size.
        size: usize,
        /// Maximum permitted payload size.
        max: usize,
    },

    /// A frame's opcode byte did not match any known (or legacy) opcode.
    #[error("unknown opcode: {0:#04x}")]
    UnknownOpcode(u8),

    /// A message-specific bound (e.g. `context_data <= 4 MiB`) was
    /// exceeded.
    #[error("bounds exceeded for {field}: declared {declared} exceeds cap {cap}")]
    BoundsExceeded {
        /// Name of the field that exceeded its bound.
        field: &'static str,
        /// Declared size on the wire.
        declared: usize,
        /// Maximum permitted size for this field.
        cap: usize,
    },

    /// A message whose wire bytes decoded to a opcode/payload combination
    /// the receiving message type does not expect.
    #[error("payload mismatch: opcode {opcode:#04x} does not match expected message type")]
    PayloadMismatch {
        /// Opcode found on the frame.
        opcode: u8,
    },
}
