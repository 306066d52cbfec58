use crate::{
    error::StoreError,
    model::{FirmwareImage, Mic, Node, Route},
    stores::{FirmwareStore, MicStore, NodeStore, RouteStore},
};

/// Wraps an inner store and forwards every call unchanged, standing in for
/// the linearizable-CAS contract a Raft-backed store would need to provide
/// (spec.md §4.I, §6).
///
/// A real implementation behind this same trait surface would additionally:
/// - route writes to the current leader and reject them (or forward them)
///   otherwise,
/// - commit through a replicated log before acknowledging `create`/`update`/
///   `delete`, so a crash right after acknowledgement never loses the
///   write,
/// - serve `list`/`get` from a read index (or the leader) to guarantee
///   linearizability rather than a stale follower's local state.
///
/// None of that needs to be simulated here for the contract to be useful:
/// `SimulatedReplicatedStore` exists so that fleet reconcilers and the
/// server can be written against the eventual multi-node shape today,
/// without pulling in an actual consensus dependency.
pub struct SimulatedReplicatedStore<S> {
    inner: S,
}

impl<S> SimulatedReplicatedStore<S> {
    /// Wrap `inner`, which serves every read and acknowledges every write
    /// immediately, as a single-node stand-in for a replicated quorum.
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// Borrow the wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: NodeStore> NodeStore for SimulatedReplicatedStore<S> {
    fn list(&self) -> Result<Vec<Node>, StoreError> {
        self.inner.list()
    }

    fn get(&self, id: &str) -> Result<Node, StoreError> {
        self.inner.get(id)
    }

    fn create(&self, node: Node) -> Result<(), StoreError> {
        self.inner.create(node)
    }

    fn update(&self, node: Node) -> Result<(), StoreError> {
        self.inner.update(node)
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.inner.delete(id)
    }
}

impl<S: RouteStore> RouteStore for SimulatedReplicatedStore<S> {
    fn list(&self) -> Result<Vec<Route>, StoreError> {
        self.inner.list()
    }

    fn get(&self, id: &str) -> Result<Route, StoreError> {
        self.inner.get(id)
    }

    fn create(&self, route: Route) -> Result<(), StoreError> {
        self.inner.create(route)
    }

    fn update(&self, route: Route) -> Result<(), StoreError> {
        self.inner.update(route)
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.inner.delete(id)
    }
}

impl<S: MicStore> MicStore for SimulatedReplicatedStore<S> {
    fn list(&self) -> Result<Vec<Mic>, StoreError> {
        self.inner.list()
    }

    fn get(&self, id: &str) -> Result<Mic, StoreError> {
        self.inner.get(id)
    }

    fn create(&self, mic: Mic) -> Result<(), StoreError> {
        self.inner.create(mic)
    }

    fn update(&self, mic: Mic) -> Result<(), StoreError> {
        self.inner.update(mic)
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.inner.delete(id)
    }

    fn revoke(&self, id: &str) -> Result<(), StoreError> {
        self.inner.revoke(id)
    }
}

impl<S: FirmwareStore> FirmwareStore for SimulatedReplicatedStore<S> {
    fn list(&self) -> Result<Vec<FirmwareImage>, StoreError> {
        self.inner.list()
    }

    fn get(&self, id: &str) -> Result<FirmwareImage, StoreError> {
        self.inner.get(id)
    }

    fn create(&self, image: FirmwareImage) -> Result<(), StoreError> {
        self.inner.create(image)
    }

    fn update(&self, image: FirmwareImage) -> Result<(), StoreError> {
        self.inner.update(image)
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.inner.delete(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use crate::model::NodeStatus;

    #[test]
    fn forwards_crud_to_inner() {
        let store = SimulatedReplicatedStore::new(InMemoryStore::new());
        let node = Node {
            id: "n1".to_owned(),
            address: "10.0.0.1:6477".to_owned(),
            status: NodeStatus::Active,
            firmware_version: "1.0.0".to_owned(),
            last_seen: 0,
            metrics: Default::default(),
        };
        NodeStore::create(&store, node.clone()).unwrap();
        assert_eq!(NodeStore::get(&store, "n1").unwrap(), node);
        assert_eq!(NodeStore::list(&store).unwrap().len(), 1);
        NodeStore::delete(&store, "n1").unwrap();
        assert!(NodeStore::get(&store, "n1").is_err());
    }
}
