use std::{collections::HashSet, sync::RwLock};

use ed25519_dalek::VerifyingKey;
use strand_store::Mic;

use crate::{error::CaError, keystore::KeyStore, payload::signing_payload};

/// Issues, verifies, and revokes MICs under a single Ed25519 root keypair
/// (spec.md §4.K).
///
/// The revocation set is guarded by an `RwLock` — reads (every `verify`)
/// are common, writes (`revoke`) are rare (spec.md §5 concurrency model).
/// Durability of revocations across restarts is the caller's
/// responsibility: mirror each [`revoke`](Self::revoke) into a
/// [`strand_store::MicStore::revoke`]-backed persistent store.
pub struct CertificateAuthority {
    keys: KeyStore,
    revoked: RwLock<HashSet<String>>,
}

impl CertificateAuthority {
    /// An authority with no root keypair generated yet; call
    /// [`generate_ca`](Self::generate_ca) before issuing certificates.
    #[must_use]
    pub fn new() -> Self {
        Self { keys: KeyStore::new(), revoked: RwLock::new(HashSet::new()) }
    }

    /// Generate a fresh root Ed25519 keypair (spec.md §4.K `generate_ca()`).
    pub fn generate_ca(&mut self) {
        self.keys.generate_ca();
    }

    /// The root verifying key, if [`generate_ca`](Self::generate_ca) has
    /// been called. Operators log this at boot to fingerprint which root
    /// key a deployment is trusting.
    #[must_use]
    pub fn public_key(&self) -> Option<VerifyingKey> {
        self.keys.verifying_key()
    }

    /// Sign `mic`'s deterministic payload and set its `signature` field.
    ///
    /// # Errors
    ///
    /// Returns [`CaError::NoRootKey`] if no keypair has been generated, or
    /// [`CaError::AlreadySigned`] if `mic.signature` is already non-empty.
    pub fn issue(&self, mut mic: Mic) -> Result<Mic, CaError> {
        if !mic.signature.is_empty() {
            return Err(CaError::AlreadySigned(mic.id));
        }
        let payload = signing_payload(&mic);
        let signature = self.keys.sign(&payload)?;
        mic.signature = signature.to_bytes().to_vec();
        tracing::info!(mic_id = %mic.id, node_id = %mic.node_id, "issued MIC");
        Ok(mic)
    }

    /// Whether `mic` is currently valid (spec.md §4.K, §8 property):
    /// `false` if `mic.revoked`, if `mic.id` is in the revocation set, or
    /// if the Ed25519 signature fails to verify; `true` otherwise.
    #[must_use]
    pub fn verify(&self, mic: &Mic) -> bool {
        if mic.revoked {
            return false;
        }
        if self.revoked.read().unwrap_or_else(std::sync::PoisonError::into_inner).contains(&mic.id)
        {
            return false;
        }
        let payload = signing_payload(mic);
        self.keys.verify(&payload, &mic.signature)
    }

    /// Add `id` to the in-memory revocation set (spec.md §4.K `revoke(id)`).
    /// A persistent store MUST mirror this for durability across restarts.
    pub fn revoke(&self, id: &str) {
        self.revoked
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(id.to_owned());
        tracing::info!(mic_id = id, "revoked MIC");
    }

    /// Whether `id` is in the in-memory revocation set.
    #[must_use]
    pub fn is_revoked(&self, id: &str) -> bool {
        self.revoked.read().unwrap_or_else(std::sync::PoisonError::into_inner).contains(id)
    }
}

impl Default for CertificateAuthority {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unsigned(id: &str, node_id: &str) -> Mic {
        Mic {
            id: id.to_owned(),
            node_id: node_id.to_owned(),
            model_hash: [3u8; 32],
            capabilities: vec!["text_gen".to_owned()],
            valid_from: 0,
            valid_until: 1_000_000,
            signature: Vec::new(),
            revoked: false,
        }
    }

    fn issuing_ca() -> CertificateAuthority {
        let mut ca = CertificateAuthority::new();
        ca.generate_ca();
        ca
    }

    #[test]
    fn issue_then_verify_succeeds() {
        let ca = issuing_ca();
        let mic = ca.issue(unsigned("mic1", "N1")).unwrap();
        assert!(ca.verify(&mic));
    }

    #[test]
    fn issue_without_root_key_fails() {
        let ca = CertificateAuthority::new();
        assert!(matches!(ca.issue(unsigned("mic1", "N1")), Err(CaError::NoRootKey)));
    }

    #[test]
    fn reissue_already_signed_fails() {
        let ca = issuing_ca();
        let mic = ca.issue(unsigned("mic1", "N1")).unwrap();
        assert!(matches!(ca.issue(mic), Err(CaError::AlreadySigned(_))));
    }

    // Literal spec.md §8 scenario 5.
    #[test]
    fn scenario_5_tamper_and_revoke() {
        let ca = issuing_ca();
        let mic = ca.issue(unsigned("mic1", "N1")).unwrap();
        assert!(ca.verify(&mic));

        let mut tampered = mic.clone();
        tampered.node_id = "evil".to_owned();
        assert!(!ca.verify(&tampered));

        ca.revoke(&mic.id);
        let fresh_untampered = mic.clone();
        assert!(!ca.verify(&fresh_untampered));
    }

    #[test]
    fn revoked_flag_on_the_record_itself_also_fails_verification() {
        let ca = issuing_ca();
        let mut mic = ca.issue(unsigned("mic1", "N1")).unwrap();
        mic.revoked = true;
        assert!(!ca.verify(&mic));
    }

    #[test]
    fn unrevoked_untouched_mic_remains_valid() {
        let ca = issuing_ca();
        let mic = ca.issue(unsigned("mic1", "N1")).unwrap();
        ca.revoke("some-other-id");
        assert!(ca.verify(&mic));
    }
}
