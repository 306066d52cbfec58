use crate::{
    error::StoreError,
    model::{FirmwareImage, Mic, Node, Route},
    stores::{FirmwareStore, MicStore, NodeStore, RouteStore},
    table::KvTable,
};

/// In-memory implementation of all four state-store traits (spec.md §4.I:
/// "an in-memory implementation suffices for single-node deployments").
///
/// `Clone` is cheap: each sub-store's [`KvTable`] shares state through the
/// table's internal mutex being moved behind an `Arc` by the caller if
/// multiple owners are needed — this type itself owns its tables directly
/// and is meant to be wrapped in an `Arc` by callers that need to share one
/// store across tasks (the same ownership shape as
/// [`crate::SimulatedReplicatedStore`]).
#[derive(Default)]
pub struct InMemoryStore {
    nodes: KvTable<Node>,
    routes: KvTable<Route>,
    mics: KvTable<Mic>,
    firmware: KvTable<FirmwareImage>,
}

impl InMemoryStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl NodeStore for InMemoryStore {
    fn list(&self) -> Result<Vec<Node>, StoreError> {
        self.nodes.list()
    }

    fn get(&self, id: &str) -> Result<Node, StoreError> {
        self.nodes.get(id)
    }

    fn create(&self, node: Node) -> Result<(), StoreError> {
        self.nodes.create(&node.id.clone(), &node)
    }

    fn update(&self, node: Node) -> Result<(), StoreError> {
        self.nodes.update(&node.id.clone(), &node)
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.nodes.delete(id)
    }
}

impl RouteStore for InMemoryStore {
    fn list(&self) -> Result<Vec<Route>, StoreError> {
        self.routes.list()
    }

    fn get(&self, id: &str) -> Result<Route, StoreError> {
        self.routes.get(id)
    }

    fn create(&self, route: Route) -> Result<(), StoreError> {
        self.routes.create(&route.id.clone(), &route)
    }

    fn update(&self, route: Route) -> Result<(), StoreError> {
        self.routes.update(&route.id.clone(), &route)
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.routes.delete(id)
    }
}

impl MicStore for InMemoryStore {
    fn list(&self) -> Result<Vec<Mic>, StoreError> {
        self.mics.list()
    }

    fn get(&self, id: &str) -> Result<Mic, StoreError> {
        self.mics.get(id)
    }

    fn create(&self, mic: Mic) -> Result<(), StoreError> {
        self.mics.create(&mic.id.clone(), &mic)
    }

    fn update(&self, mic: Mic) -> Result<(), StoreError> {
        self.mics.update(&mic.id.clone(), &mic)
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.mics.delete(id)
    }

    fn revoke(&self, id: &str) -> Result<(), StoreError> {
        self.mics.mutate(id, |mic| mic.revoked = true)
    }
}

impl FirmwareStore for InMemoryStore {
    fn list(&self) -> Result<Vec<FirmwareImage>, StoreError> {
        self.firmware.list()
    }

    fn get(&self, id: &str) -> Result<FirmwareImage, StoreError> {
        self.firmware.get(id)
    }

    fn create(&self, image: FirmwareImage) -> Result<(), StoreError> {
        self.firmware.create(&image.id.clone(), &image)
    }

    fn update(&self, image: FirmwareImage) -> Result<(), StoreError> {
        self.firmware.update(&image.id.clone(), &image)
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.firmware.delete(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeStatus;

    fn sample_node(id: &str) -> Node {
        Node {
            id: id.to_owned(),
            address: "10.0.0.1:6477".to_owned(),
            status: NodeStatus::Active,
            firmware_version: "1.0.0".to_owned(),
            last_seen: 0,
            metrics: Default::default(),
        }
    }

    #[test]
    fn create_then_get_round_trips() {
        let store = InMemoryStore::new();
        NodeStore::create(&store, sample_node("n1")).unwrap();
        let fetched = NodeStore::get(&store, "n1").unwrap();
        assert_eq!(fetched.id, "n1");
    }

    #[test]
    fn create_twice_fails_already_exists() {
        let store = InMemoryStore::new();
        NodeStore::create(&store, sample_node("n1")).unwrap();
        let err = NodeStore::create(&store, sample_node("n1")).unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)));
    }

    #[test]
    fn get_missing_fails_not_found() {
        let store = InMemoryStore::new();
        let err = NodeStore::get(&store, "missing").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn delete_missing_fails_not_found() {
        let store = InMemoryStore::new();
        let err = NodeStore::delete(&store, "missing").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn update_requires_existence() {
        let store = InMemoryStore::new();
        let err = NodeStore::update(&store, sample_node("n1")).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        NodeStore::create(&store, sample_node("n1")).unwrap();
        let mut updated = sample_node("n1");
        updated.status = NodeStatus::Draining;
        NodeStore::update(&store, updated).unwrap();
        assert_eq!(NodeStore::get(&store, "n1").unwrap().status, NodeStatus::Draining);
    }

    #[test]
    fn mic_revoke_flips_flag_without_full_update() {
        let store = InMemoryStore::new();
        let mic = Mic {
            id: "mic1".to_owned(),
            node_id: "n1".to_owned(),
            model_hash: [0u8; 32],
            capabilities: vec!["text_gen".to_owned()],
            valid_from: 0,
            valid_until: 1000,
            signature: vec![1, 2, 3],
            revoked: false,
        };
        MicStore::create(&store, mic).unwrap();
        MicStore::revoke(&store, "mic1").unwrap();
        assert!(MicStore::get(&store, "mic1").unwrap().revoked);
    }
}
