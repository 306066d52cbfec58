use std::{
    collections::HashSet,
    sync::{Arc, Mutex, RwLock},
    time::Duration,
};

use strand_store::{FirmwareStore, NodeStore};
use tokio_util::sync::CancellationToken;

use crate::{
    error::FleetError,
    event::{EventLog, FirmwareUpdate, FleetEvent},
};

/// Default interval between firmware reconciliation ticks (spec.md §4.J).
pub const DEFAULT_RECONCILE_INTERVAL: Duration = Duration::from_secs(30);

/// Queues [`FirmwareUpdate`] work items for nodes running a version other
/// than the declared desired version (spec.md §4.J).
///
/// Duplicate detection is by `(node_id, desired_version)`: once a node has
/// a pending update queued for a given target version, re-running
/// reconciliation does not queue a second one for that same target. The
/// dedup set is cleared when [`Self::set_desired_version`] changes the
/// target, so a new rollout is requeued even for nodes that were already
/// current on the previous target.
pub struct FirmwareReconciler<S> {
    store: Arc<S>,
    events: Arc<EventLog>,
    desired_version: RwLock<Option<String>>,
    queued: Mutex<HashSet<(String, String)>>,
}

impl<S: NodeStore + FirmwareStore> FirmwareReconciler<S> {
    /// A reconciler with no desired version set; reconciliation is a no-op
    /// until [`Self::set_desired_version`] is called.
    #[must_use]
    pub fn new(store: Arc<S>, events: Arc<EventLog>) -> Self {
        Self {
            store,
            events,
            desired_version: RwLock::new(None),
            queued: Mutex::new(HashSet::new()),
        }
    }

    /// Set (or clear, with `None`) the fleet's desired firmware version.
    /// Changing the target resets duplicate-detection so nodes already
    /// queued against a prior target are reconsidered.
    pub fn set_desired_version(&self, version: Option<String>) {
        let mut desired = self.desired_version.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        if *desired != version {
            self.queued.lock().unwrap_or_else(std::sync::PoisonError::into_inner).clear();
            *desired = version;
        }
    }

    /// The currently declared desired version, if any.
    #[must_use]
    pub fn desired_version(&self) -> Option<String> {
        self.desired_version.read().unwrap_or_else(std::sync::PoisonError::into_inner).clone()
    }

    /// Run one reconciliation pass, returning the [`FirmwareUpdate`]s newly
    /// queued this tick (already-queued `(node_id, desired_version)` pairs
    /// are skipped and not returned again).
    ///
    /// # Errors
    ///
    /// Returns [`FleetError`] if the underlying store fails to list nodes
    /// or firmware images.
    pub fn reconcile_once(&self) -> Result<Vec<FirmwareUpdate>, FleetError> {
        let Some(desired) = self.desired_version() else {
            return Ok(Vec::new());
        };

        let images = FirmwareStore::list(&*self.store)?;
        let firmware_id = images
            .iter()
            .find(|image| image.version == desired)
            .map_or_else(|| desired.clone(), |image| image.id.clone());

        let mut newly_queued = Vec::new();
        let mut queued = self.queued.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        for node in NodeStore::list(&*self.store)? {
            if node.firmware_version == desired {
                continue;
            }
            let key = (node.id.clone(), desired.clone());
            if queued.contains(&key) {
                continue;
            }
            let update = FirmwareUpdate {
                node_id: node.id.clone(),
                current_version: node.firmware_version.clone(),
                desired_version: desired.clone(),
                firmware_id: firmware_id.clone(),
            };
            tracing::info!(
                node_id = %update.node_id,
                current = %update.current_version,
                desired = %update.desired_version,
                "queued firmware update"
            );
            self.events.push(FleetEvent::FirmwareUpdateQueued(update.clone()));
            queued.insert(key);
            newly_queued.push(update);
        }
        Ok(newly_queued)
    }

    /// Run reconciliation ticks on `reconcile_interval` until `ctx` is
    /// cancelled.
    pub async fn run(&self, ctx: CancellationToken, reconcile_interval: Duration) {
        let mut ticker = tokio::time::interval(reconcile_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                biased;
                () = ctx.cancelled() => {
                    tracing::debug!("firmware reconciler stopping on cancellation");
                    return;
                }
                _ = ticker.tick() => {
                    if let Err(err) = self.reconcile_once() {
                        tracing::warn!(error = %err, "firmware reconciliation tick failed");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use strand_store::{FirmwareImage, InMemoryStore, Node, NodeStatus};

    use super::*;

    fn node(id: &str, firmware_version: &str) -> Node {
        Node {
            id: id.to_owned(),
            address: "10.0.0.1:6477".to_owned(),
            status: NodeStatus::Active,
            firmware_version: firmware_version.to_owned(),
            last_seen: 0,
            metrics: BTreeMap::new(),
        }
    }

    #[test]
    fn no_desired_version_is_a_no_op() {
        let store = Arc::new(InMemoryStore::new());
        NodeStore::create(&*store, node("n1", "1.0.0")).unwrap();
        let reconciler = FirmwareReconciler::new(store, Arc::new(EventLog::new()));
        assert_eq!(reconciler.reconcile_once().unwrap(), Vec::new());
    }

    #[test]
    fn stale_node_is_queued_once_and_not_duplicated() {
        let store = Arc::new(InMemoryStore::new());
        NodeStore::create(&*store, node("n1", "1.0.0")).unwrap();
        NodeStore::create(&*store, node("n2", "2.0.0")).unwrap();
        let events = Arc::new(EventLog::new());
        let reconciler = FirmwareReconciler::new(Arc::clone(&store), Arc::clone(&events));
        reconciler.set_desired_version(Some("2.0.0".to_owned()));

        let queued = reconciler.reconcile_once().unwrap();
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].node_id, "n1");
        assert_eq!(queued[0].current_version, "1.0.0");
        assert_eq!(queued[0].desired_version, "2.0.0");
        assert_eq!(events.len(), 1);

        // Re-running does not duplicate the already-queued update.
        let queued_again = reconciler.reconcile_once().unwrap();
        assert!(queued_again.is_empty());
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn firmware_id_matches_published_image_by_version() {
        let store = Arc::new(InMemoryStore::new());
        NodeStore::create(&*store, node("n1", "1.0.0")).unwrap();
        FirmwareStore::create(
            &*store,
            FirmwareImage {
                id: "fw-abc123".to_owned(),
                version: "2.0.0".to_owned(),
                platform: "x86_64".to_owned(),
                size: 1024,
                checksum: "deadbeef".to_owned(),
                url: "https://fw.example/2.0.0".to_owned(),
                created_at: 0,
            },
        )
        .unwrap();
        let reconciler = FirmwareReconciler::new(store, Arc::new(EventLog::new()));
        reconciler.set_desired_version(Some("2.0.0".to_owned()));

        let queued = reconciler.reconcile_once().unwrap();
        assert_eq!(queued[0].firmware_id, "fw-abc123");
    }

    #[test]
    fn falls_back_to_version_string_when_no_image_published() {
        let store = Arc::new(InMemoryStore::new());
        NodeStore::create(&*store, node("n1", "1.0.0")).unwrap();
        let reconciler = FirmwareReconciler::new(store, Arc::new(EventLog::new()));
        reconciler.set_desired_version(Some("2.0.0".to_owned()));

        let queued = reconciler.reconcile_once().unwrap();
        assert_eq!(queued[0].firmware_id, "2.0.0");
    }

    #[test]
    fn changing_target_resets_dedup_and_requeues() {
        let store = Arc::new(InMemoryStore::new());
        NodeStore::create(&*store, node("n1", "1.0.0")).unwrap();
        let events = Arc::new(EventLog::new());
        let reconciler = FirmwareReconciler::new(Arc::clone(&store), Arc::clone(&events));

        reconciler.set_desired_version(Some("2.0.0".to_owned()));
        assert_eq!(reconciler.reconcile_once().unwrap().len(), 1);

        reconciler.set_desired_version(Some("3.0.0".to_owned()));
        let requeued = reconciler.reconcile_once().unwrap();
        assert_eq!(requeued.len(), 1);
        assert_eq!(requeued[0].desired_version, "3.0.0");
    }

    #[tokio::test(start_paused = true)]
    async fn run_stops_promptly_on_cancellation() {
        let store = Arc::new(InMemoryStore::new());
        let reconciler = FirmwareReconciler::new(store, Arc::new(EventLog::new()));
        let ctx = CancellationToken::new();
        ctx.cancel();
        reconciler.run(ctx, Duration::from_secs(30)).await;
    }
}
