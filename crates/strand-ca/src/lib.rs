//! MIC certificate authority: Ed25519 issuance, verification, and
//! revocation for Model Identity Certificates (spec.md §4.K).
//!
//! The signature algorithm and the [`payload::signing_payload`] field
//! layout are part of the stable wire contract and MUST NOT change without
//! a MIC version bump.

mod authority;
mod error;
mod keystore;
mod payload;

pub use authority::CertificateAuthority;
pub use error::CaError;
pub use keystore::{KeyStore, ROOT_KEY_ID};
pub use payload::signing_payload;
