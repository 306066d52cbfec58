//! Control-plane state store: the shared source of truth for fleet node
//! records, published routes, issued MICs, and firmware images (spec.md
//! §4.I).
//!
//! The on-wire contract is deliberately small — `list`/`get`/`create`/
//! `update`/`delete` per record type, plus [`MicStore::revoke`] — so that a
//! future Raft-backed implementation can satisfy the same traits without
//! perturbing fleet-reconciler or server callers. [`InMemoryStore`] is the
//! reference implementation for single-node deployments;
//! [`SimulatedReplicatedStore`] documents the CAS contract a real replicated
//! backend must honor.

mod error;
mod memory;
mod model;
mod replicated;
mod stores;
mod table;

pub use error::StoreError;
pub use memory::InMemoryStore;
pub use model::{Endpoint, FirmwareImage, Mic, Node, NodeStatus, Route};
pub use replicated::SimulatedReplicatedStore;
pub use stores::{FirmwareStore, MicStore, NodeStore, RouteStore};
pub use table::KvTable;
