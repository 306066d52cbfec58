use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand_core::OsRng;

use crate::error::CaError;

/// Fixed identifier under which the CA's root keypair lives in the
/// [`KeyStore`] (spec.md §4.K: "a fixed root ID").
pub const ROOT_KEY_ID: &str = "strand-ca-root";

/// Holds the CA's Ed25519 root keypair.
///
/// A single keypair signs every MIC issued by this authority; key rotation
/// (a new `KeyStore` entry under a new id, with a grace period for the old
/// verifying key) is out of scope here and left to an operator-driven
/// redeploy, matching the teacher's "rotation is a coordinated
/// out-of-band" operational stance for its own MLS epoch keys.
pub struct KeyStore {
    signing_key: Option<SigningKey>,
}

impl KeyStore {
    /// An empty key store with no root keypair yet.
    #[must_use]
    pub fn new() -> Self {
        Self { signing_key: None }
    }

    /// Generate a fresh Ed25519 keypair under [`ROOT_KEY_ID`], replacing any
    /// existing one (spec.md §4.K `generate_ca()`).
    pub fn generate_ca(&mut self) {
        self.signing_key = Some(SigningKey::generate(&mut OsRng));
    }

    /// The root verifying key, if a keypair has been generated.
    #[must_use]
    pub fn verifying_key(&self) -> Option<VerifyingKey> {
        self.signing_key.as_ref().map(SigningKey::verifying_key)
    }

    /// Sign `payload` with the root key.
    ///
    /// # Errors
    ///
    /// Returns [`CaError::NoRootKey`] if [`generate_ca`](Self::generate_ca)
    /// has not been called yet.
    pub fn sign(&self, payload: &[u8; 32]) -> Result<Signature, CaError> {
        self.signing_key.as_ref().map(|key| key.sign(payload)).ok_or(CaError::NoRootKey)
    }

    /// Verify `signature` over `payload` against the root verifying key.
    ///
    /// Returns `false` (rather than erroring) on verification failure, a
    /// missing root key, or a malformed signature byte string, so that
    /// [`crate::verify`] callers get a single boolean outcome per spec.md
    /// §4.K.
    #[must_use]
    pub fn verify(&self, payload: &[u8; 32], signature_bytes: &[u8]) -> bool {
        let Some(verifying_key) = self.verifying_key() else {
            return false;
        };
        let Ok(signature_array) = <[u8; 64]>::try_from(signature_bytes) else {
            return false;
        };
        let signature = Signature::from_bytes(&signature_array);
        verifying_key.verify(payload, &signature).is_ok()
    }
}

impl Default for KeyStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_without_root_key_fails() {
        let store = KeyStore::new();
        assert!(matches!(store.sign(&[0u8; 32]), Err(CaError::NoRootKey)));
    }

    #[test]
    fn sign_then_verify_round_trips() {
        let mut store = KeyStore::new();
        store.generate_ca();
        let payload = [9u8; 32];
        let signature = store.sign(&payload).unwrap();
        assert!(store.verify(&payload, &signature.to_bytes()));
    }

    #[test]
    fn verify_rejects_tampered_payload() {
        let mut store = KeyStore::new();
        store.generate_ca();
        let signature = store.sign(&[1u8; 32]).unwrap();
        assert!(!store.verify(&[2u8; 32], &signature.to_bytes()));
    }

    #[test]
    fn verify_without_root_key_is_false() {
        let store = KeyStore::new();
        assert!(!store.verify(&[0u8; 32], &[0u8; 64]));
    }

    #[test]
    fn verify_rejects_malformed_signature_length() {
        let mut store = KeyStore::new();
        store.generate_ca();
        assert!(!store.verify(&[0u8; 32], &[0u8; 10]));
    }
}
