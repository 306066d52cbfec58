use sha2::{Digest, Sha256};
use strand_store::Mic;

/// Build the deterministic signing payload for `mic` (spec.md §4.K):
/// `SHA-256(id || node_id || model_hash || capabilities_concat ||
/// valid_from_be64 || valid_until_be64)`.
///
/// Capability names are joined with no separator in declaration order —
/// the field layout is part of the stable wire contract and MUST NOT
/// change without a MIC version bump.
#[must_use]
pub fn signing_payload(mic: &Mic) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(mic.id.as_bytes());
    hasher.update(mic.node_id.as_bytes());
    hasher.update(mic.model_hash);
    for capability in &mic.capabilities {
        hasher.update(capability.as_bytes());
    }
    hasher.update(mic.valid_from.to_be_bytes());
    hasher.update(mic.valid_until.to_be_bytes());
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Mic {
        Mic {
            id: "mic1".to_owned(),
            node_id: "N1".to_owned(),
            model_hash: [7u8; 32],
            capabilities: vec!["text_gen".to_owned(), "code_gen".to_owned()],
            valid_from: 1_000,
            valid_until: 2_000,
            signature: Vec::new(),
            revoked: false,
        }
    }

    #[test]
    fn payload_is_deterministic() {
        assert_eq!(signing_payload(&sample()), signing_payload(&sample()));
    }

    #[test]
    fn mutating_node_id_changes_payload() {
        let mut tampered = sample();
        tampered.node_id = "evil".to_owned();
        assert_ne!(signing_payload(&sample()), signing_payload(&tampered));
    }

    #[test]
    fn mutating_capabilities_changes_payload() {
        let mut tampered = sample();
        tampered.capabilities.push("vision".to_owned());
        assert_ne!(signing_payload(&sample()), signing_payload(&tampered));
    }

    #[test]
    fn mutating_validity_window_changes_payload() {
        let mut tampered = sample();
        tampered.valid_until += 1;
        assert_ne!(signing_payload(&sample()), signing_payload(&tampered));
    }
}
