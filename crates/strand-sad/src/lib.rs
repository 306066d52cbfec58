//! Semantic Address Descriptor (SAD) model for Strand's L2 routing layer.
//!
//! A [`Sad`] is the capability-based routing key carried by inference
//! requests and published by route entries. See spec.md §3/§4.D for the
//! wire contract.

mod capability;
mod error;
mod field;
mod sad;

pub use capability::CapabilityMask;
pub use error::SadError;
pub use field::{SadField, canonicalize_custom_fields};
pub use sad::{MODEL_TYPE_MAX_LEN, Sad, SadBuilder};
