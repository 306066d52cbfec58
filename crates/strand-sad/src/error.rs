use thiserror::Error;

/// Errors raised while building or decoding a [`crate::Sad`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SadError {
    /// Underlying wire decode failure.
    #[error(transparent)]
    Codec(#[from] strand_codec::CodecError),

    /// A builder was asked to produce a [`crate::Sad`] with `version < 1`.
    #[error("SAD version must be >= 1, got {0}")]
    InvalidVersion(u16),

    /// A builder was asked to produce a [`crate::Sad`] with an empty
    /// `model_type`.
    #[error("SAD model_type must not be empty")]
    EmptyModelType,
}
