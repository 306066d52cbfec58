use crate::{
    error::StoreError,
    model::{FirmwareImage, Mic, Node, Route},
};

/// CRUD over [`Node`] records (spec.md §4.I).
pub trait NodeStore: Send + Sync {
    /// All nodes currently known.
    fn list(&self) -> Result<Vec<Node>, StoreError>;
    /// Fetch a node by id.
    fn get(&self, id: &str) -> Result<Node, StoreError>;
    /// Create a node; fails with [`StoreError::AlreadyExists`] if `id` is
    /// already present.
    fn create(&self, node: Node) -> Result<(), StoreError>;
    /// Overwrite an existing node.
    fn update(&self, node: Node) -> Result<(), StoreError>;
    /// Remove a node; fails with [`StoreError::NotFound`] if absent.
    fn delete(&self, id: &str) -> Result<(), StoreError>;
}

/// CRUD over [`Route`] records (spec.md §4.I).
pub trait RouteStore: Send + Sync {
    /// All routes currently published.
    fn list(&self) -> Result<Vec<Route>, StoreError>;
    /// Fetch a route by id.
    fn get(&self, id: &str) -> Result<Route, StoreError>;
    /// Create a route; fails with [`StoreError::AlreadyExists`] if `id` is
    /// already present.
    fn create(&self, route: Route) -> Result<(), StoreError>;
    /// Overwrite an existing route.
    fn update(&self, route: Route) -> Result<(), StoreError>;
    /// Remove a route; fails with [`StoreError::NotFound`] if absent.
    fn delete(&self, id: &str) -> Result<(), StoreError>;
}

/// CRUD over [`Mic`] records, plus revocation (spec.md §4.I, §4.K).
pub trait MicStore: Send + Sync {
    /// All certificates currently issued.
    fn list(&self) -> Result<Vec<Mic>, StoreError>;
    /// Fetch a certificate by id.
    fn get(&self, id: &str) -> Result<Mic, StoreError>;
    /// Create a certificate; fails with [`StoreError::AlreadyExists`] if
    /// `id` is already present.
    fn create(&self, mic: Mic) -> Result<(), StoreError>;
    /// Overwrite an existing certificate.
    fn update(&self, mic: Mic) -> Result<(), StoreError>;
    /// Remove a certificate; fails with [`StoreError::NotFound`] if absent.
    fn delete(&self, id: &str) -> Result<(), StoreError>;
    /// Mark a certificate as revoked without a full `get`+`update`
    /// round-trip. A persistent store must mirror the CA's in-memory
    /// revocation set for durability (spec.md §4.K).
    fn revoke(&self, id: &str) -> Result<(), StoreError>;
}

/// CRUD over [`FirmwareImage`] records (spec.md §4.I).
pub trait FirmwareStore: Send + Sync {
    /// All firmware images currently published.
    fn list(&self) -> Result<Vec<FirmwareImage>, StoreError>;
    /// Fetch a firmware image by id.
    fn get(&self, id: &str) -> Result<FirmwareImage, StoreError>;
    /// Create a firmware image; fails with [`StoreError::AlreadyExists`] if
    /// `id` is already present.
    fn create(&self, image: FirmwareImage) -> Result<(), StoreError>;
    /// Overwrite an existing firmware image.
    fn update(&self, image: FirmwareImage) -> Result<(), StoreError>;
    /// Remove a firmware image; fails with [`StoreError::NotFound`] if
    /// absent.
    fn delete(&self, id: &str) -> Result<(), StoreError>;
}
