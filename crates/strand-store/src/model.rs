use serde::{Deserialize, Serialize};

/// Lifecycle status of a fleet node (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    /// Serving traffic normally.
    Active,
    /// Finishing in-flight work, not accepting new requests.
    Draining,
    /// Missed its heartbeat deadline (spec.md §4.J health reconciler).
    Unhealthy,
    /// Administratively removed from rotation.
    Offline,
}

/// A fleet node's control-plane record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique node identifier (store key).
    pub id: String,
    /// Network address the node is reachable at.
    pub address: String,
    /// Current lifecycle status.
    pub status: NodeStatus,
    /// Firmware version currently running.
    pub firmware_version: String,
    /// Unix epoch seconds of the last heartbeat/observation.
    pub last_seen: u64,
    /// Free-form operator metrics (e.g. load, queue depth).
    pub metrics: std::collections::BTreeMap<String, f64>,
}

/// One weighted destination behind a published [`Route`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    /// The node this endpoint resolves to.
    pub node_id: String,
    /// Network address to dial.
    pub address: String,
    /// Relative selection weight among this route's endpoints.
    pub weight: f32,
}

/// A published route: a SAD (encoded) plus the endpoints serving it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Unique route identifier (store key).
    pub id: String,
    /// Encoded `Sad` bytes this route answers for.
    pub sad_bytes: Vec<u8>,
    /// Weighted endpoints serving this route.
    pub endpoints: Vec<Endpoint>,
    /// Time-to-live in nanoseconds. `0` means permanent.
    pub ttl: u64,
    /// Unix epoch seconds this route was created.
    pub created_at: u64,
}

/// An Ed25519-signed Model Identity Certificate (spec.md §3, §4.K).
///
/// Immutable except for `revoked`; `signature` never rotates once issued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mic {
    /// Unique certificate identifier (store key).
    pub id: String,
    /// Node this certificate attests to.
    pub node_id: String,
    /// 32-byte hash of the model artifact.
    pub model_hash: [u8; 32],
    /// Capability names this model instance attests to.
    pub capabilities: Vec<String>,
    /// Unix epoch seconds the certificate becomes valid.
    pub valid_from: u64,
    /// Unix epoch seconds the certificate expires.
    pub valid_until: u64,
    /// Ed25519 signature over the deterministic payload (spec.md §4.K).
    /// Empty until the certificate authority's issuance signs it.
    pub signature: Vec<u8>,
    /// Whether this certificate has been revoked.
    pub revoked: bool,
}

/// A distributable firmware image (spec.md §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirmwareImage {
    /// Unique firmware image identifier (store key).
    pub id: String,
    /// Semantic version string.
    pub version: String,
    /// Target platform identifier.
    pub platform: String,
    /// Image size in bytes.
    pub size: u64,
    /// Checksum of the image (e.g. SHA-256 hex).
    pub checksum: String,
    /// URL the image can be fetched from.
    pub url: String,
    /// Unix epoch seconds this image was published.
    pub created_at: u64,
}
