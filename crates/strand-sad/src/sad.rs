use strand_codec::{Reader, Writer};

use crate::{capability::CapabilityMask, error::SadError};

/// Upper bound on `model_type`'s encoded length. Not specified numerically by
/// the protocol; chosen generously while still bounding allocation for a
/// field that in practice never needs more than a short identifier.
pub const MODEL_TYPE_MAX_LEN: usize = 256;

/// Semantic Address Descriptor: the capability-based routing key carried by
/// every `InferenceRequest` and published by every `RouteEntry`.
///
/// Encode order is fixed by the wire contract: `version, capabilities,
/// context_window, latency_sla_ms, model_type`. Decoding populates fields in
/// that same order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sad {
    /// SAD schema version. Must be `>= 1` for values produced via
    /// [`crate::SadBuilder`]; decoding accepts any value on the wire.
    pub version: u16,
    /// Additive capability bitmask. Unknown bits are preserved.
    pub capabilities: CapabilityMask,
    /// Maximum context window this address can serve, in tokens.
    pub context_window: u32,
    /// Latency SLA, in milliseconds.
    pub latency_sla_ms: u32,
    /// Free-form model family/type identifier.
    pub model_type: String,
}

impl Sad {
    /// Encode in the fixed wire order.
    pub fn encode(&self, w: &mut Writer) {
        w.write_u16(self.version);
        w.write_u32(self.capabilities.bits());
        w.write_u32(self.context_window);
        w.write_u32(self.latency_sla_ms);
        w.write_string(&self.model_type);
    }

    /// Decode in the fixed wire order.
    pub fn decode(r: &mut Reader<'_>) -> Result<Self, SadError> {
        let version = r.read_u16()?;
        let capabilities = CapabilityMask::from_bits(r.read_u32()?);
        let context_window = r.read_u32()?;
        let latency_sla_ms = r.read_u32()?;
        let model_type = r.read_string(MODEL_TYPE_MAX_LEN)?;
        Ok(Self { version, capabilities, context_window, latency_sla_ms, model_type })
    }
}

/// Builder for [`Sad`] values, validating invariants that the bare struct
/// does not enforce on its own (decoded values may legitimately violate
/// them — a malformed peer's SAD is still a SAD, just one a resolver should
/// never select).
#[derive(Debug, Clone, Default)]
pub struct SadBuilder {
    version: u16,
    capabilities: CapabilityMask,
    context_window: u32,
    latency_sla_ms: u32,
    model_type: String,
}

impl SadBuilder {
    /// Start a new builder with default (invalid) values — `version` and
    /// `model_type` must be set before [`Self::build`] succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the schema version. Must be `>= 1`.
    #[must_use]
    pub fn version(mut self, version: u16) -> Self {
        self.version = version;
        self
    }

    /// Set the capability bitmask.
    #[must_use]
    pub fn capabilities(mut self, capabilities: impl Into<CapabilityMask>) -> Self {
        self.capabilities = capabilities.into();
        self
    }

    /// Set the context window, in tokens.
    #[must_use]
    pub fn context_window(mut self, context_window: u32) -> Self {
        self.context_window = context_window;
        self
    }

    /// Set the latency SLA, in milliseconds.
    #[must_use]
    pub fn latency_sla_ms(mut self, latency_sla_ms: u32) -> Self {
        self.latency_sla_ms = latency_sla_ms;
        self
    }

    /// Set the model type identifier. Must be non-empty.
    #[must_use]
    pub fn model_type(mut self, model_type: impl Into<String>) -> Self {
        self.model_type = model_type.into();
        self
    }

    /// Validate and produce the [`Sad`].
    ///
    /// # Errors
    ///
    /// Returns [`SadError::InvalidVersion`] if `version < 1`, or
    /// [`SadError::EmptyModelType`] if `model_type` is empty.
    pub fn build(self) -> Result<Sad, SadError> {
        if self.version < 1 {
            return Err(SadError::InvalidVersion(self.version));
        }
        if self.model_type.is_empty() {
            return Err(SadError::EmptyModelType);
        }
        Ok(Sad {
            version: self.version,
            capabilities: self.capabilities,
            context_window: self.context_window,
            latency_sla_ms: self.latency_sla_ms,
            model_type: self.model_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn builder_rejects_version_zero() {
        let err = SadBuilder::new().version(0).model_type("gpt").build().unwrap_err();
        assert_eq!(err, SadError::InvalidVersion(0));
    }

    #[test]
    fn builder_rejects_empty_model_type() {
        let err = SadBuilder::new().version(1).build().unwrap_err();
        assert_eq!(err, SadError::EmptyModelType);
    }

    #[test]
    fn builder_succeeds() {
        let sad = SadBuilder::new()
            .version(1)
            .capabilities(CapabilityMask::from_bits(CapabilityMask::TEXT_GEN))
            .context_window(8192)
            .latency_sla_ms(200)
            .model_type("strand-7b")
            .build()
            .unwrap();
        assert_eq!(sad.version, 1);
        assert_eq!(sad.model_type, "strand-7b");
    }

    #[test]
    fn round_trip_preserves_unknown_capability_bits() {
        let sad = Sad {
            version: 3,
            capabilities: CapabilityMask::from_bits(0x8000_0003),
            context_window: 128_000,
            latency_sla_ms: 500,
            model_type: "unknown-future-model".to_string(),
        };
        let mut w = Writer::new();
        sad.encode(&mut w);
        let buf = w.into_bytes();
        let mut r = Reader::new(&buf);
        let decoded = Sad::decode(&mut r).unwrap();
        assert_eq!(decoded, sad);
        assert_eq!(decoded.capabilities.bits(), 0x8000_0003);
    }

    proptest! {
        #[test]
        fn decode_encode_round_trip(
            version in any::<u16>(),
            caps in any::<u32>(),
            ctx in any::<u32>(),
            lat in any::<u32>(),
            model_type in ".{0,64}",
        ) {
            let sad = Sad {
                version,
                capabilities: CapabilityMask::from_bits(caps),
                context_window: ctx,
                latency_sla_ms: lat,
                model_type,
            };
            let mut w = Writer::new();
            sad.encode(&mut w);
            let buf = w.into_bytes();
            let mut r = Reader::new(&buf);
            let decoded = Sad::decode(&mut r).unwrap();
            prop_assert_eq!(decoded, sad);
        }
    }
}
