use thiserror::Error;

/// Errors produced while decoding or encoding primitive wire values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A fixed-width or length-prefixed read ran past the end of the buffer.
    #[error("short buffer: need {needed} bytes, have {remaining}")]
    ShortBuffer {
        /// Bytes required to complete the read.
        needed: usize,
        /// Bytes actually remaining in the buffer.
        remaining: usize,
    },

    /// A length-prefixed field declared a size exceeding the caller-supplied
    /// bound. Rejected before any allocation is made for the field's payload.
    #[error("oversize field: declared length {declared} exceeds cap {cap}")]
    OversizeField {
        /// Length the wire data claimed.
        declared: usize,
        /// Maximum permitted length for this field.
        cap: usize,
    },

    /// A `string` field's bytes were not valid UTF-8.
    #[error("invalid utf-8 in string field: {0}")]
    InvalidUtf8(String),
}
