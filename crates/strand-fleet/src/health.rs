use std::{
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use strand_store::{NodeStatus, NodeStore};
use tokio_util::sync::CancellationToken;

use crate::{error::FleetError, event::EventLog, event::FleetEvent};

/// Default interval between health reconciliation ticks (spec.md §4.J).
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(10);

/// Default staleness threshold before a node is demoted to unhealthy
/// (spec.md §4.J).
pub const DEFAULT_UNHEALTHY_AFTER: Duration = Duration::from_secs(30);

/// Demotes fleet nodes that have missed their heartbeat deadline to
/// [`NodeStatus::Unhealthy`] (spec.md §4.J).
///
/// Each tick considers every node with `status != Unhealthy`; a node whose
/// `last_seen` is older than `unhealthy_after` transitions and a
/// [`FleetEvent::NodeUnhealthy`] is appended to the shared event log.
/// Already-unhealthy nodes are left alone — recovery (a heartbeat bumping
/// `last_seen` and status back to `Active`) is the node's own
/// responsibility, not the reconciler's.
pub struct HealthReconciler<S> {
    store: Arc<S>,
    events: Arc<EventLog>,
    unhealthy_after: Duration,
}

impl<S: NodeStore> HealthReconciler<S> {
    /// A reconciler over `store` using [`DEFAULT_UNHEALTHY_AFTER`] as its
    /// staleness threshold, appending transitions to `events`.
    #[must_use]
    pub fn new(store: Arc<S>, events: Arc<EventLog>) -> Self {
        Self::with_unhealthy_after(store, events, DEFAULT_UNHEALTHY_AFTER)
    }

    /// A reconciler with an explicit staleness threshold, overriding
    /// [`DEFAULT_UNHEALTHY_AFTER`].
    #[must_use]
    pub fn with_unhealthy_after(
        store: Arc<S>,
        events: Arc<EventLog>,
        unhealthy_after: Duration,
    ) -> Self {
        Self { store, events, unhealthy_after }
    }

    /// Run one reconciliation pass at wall-clock `now` (Unix epoch
    /// seconds), returning the number of nodes demoted.
    ///
    /// # Errors
    ///
    /// Returns [`FleetError`] if the underlying store fails to list or
    /// update a node.
    pub fn reconcile_once(&self, now: u64) -> Result<usize, FleetError> {
        let unhealthy_after_secs = self.unhealthy_after.as_secs();
        let mut demoted = 0;
        for mut node in self.store.list()? {
            if node.status == NodeStatus::Unhealthy {
                continue;
            }
            if now.saturating_sub(node.last_seen) <= unhealthy_after_secs {
                continue;
            }
            let node_id = node.id.clone();
            node.status = NodeStatus::Unhealthy;
            self.store.update(node)?;
            self.events.push(FleetEvent::NodeUnhealthy { node_id: node_id.clone(), at: now });
            tracing::info!(node_id, "node demoted to unhealthy");
            demoted += 1;
        }
        Ok(demoted)
    }

    /// Run reconciliation ticks on `check_interval` until `ctx` is
    /// cancelled.
    ///
    /// Every suspension point (the tick wait) observes `ctx`
    /// (spec.md §5, §9 "Context propagation"); a tick whose store call
    /// fails is logged and does not stop the loop, matching the server
    /// dispatch policy of never tearing down on a single handler error.
    pub async fn run(&self, ctx: CancellationToken, check_interval: Duration) {
        let mut ticker = tokio::time::interval(check_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                biased;
                () = ctx.cancelled() => {
                    tracing::debug!("health reconciler stopping on cancellation");
                    return;
                }
                _ = ticker.tick() => {
                    let now = unix_now();
                    if let Err(err) = self.reconcile_once(now) {
                        tracing::warn!(error = %err, "health reconciliation tick failed");
                    }
                }
            }
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use strand_store::{InMemoryStore, Node, NodeStatus};

    use super::*;

    fn node(id: &str, last_seen: u64, status: NodeStatus) -> Node {
        Node {
            id: id.to_owned(),
            address: "10.0.0.1:6477".to_owned(),
            status,
            firmware_version: "1.0.0".to_owned(),
            last_seen,
            metrics: BTreeMap::new(),
        }
    }

    #[test]
    fn stale_node_transitions_to_unhealthy_and_emits_event() {
        let store = Arc::new(InMemoryStore::new());
        NodeStore::create(&*store, node("n1", 0, NodeStatus::Active)).unwrap();
        let events = Arc::new(EventLog::new());
        let reconciler = HealthReconciler::with_unhealthy_after(
            Arc::clone(&store),
            Arc::clone(&events),
            Duration::from_secs(30),
        );

        assert_eq!(reconciler.reconcile_once(31).unwrap(), 1);
        assert_eq!(NodeStore::get(&*store, "n1").unwrap().status, NodeStatus::Unhealthy);
        assert_eq!(events.len(), 1);
        assert!(
            matches!(&events.snapshot()[0], FleetEvent::NodeUnhealthy { node_id, .. } if node_id == "n1")
        );
    }

    #[test]
    fn fresh_node_is_left_alone() {
        let store = Arc::new(InMemoryStore::new());
        NodeStore::create(&*store, node("n1", 20, NodeStatus::Active)).unwrap();
        let events = Arc::new(EventLog::new());
        let reconciler = HealthReconciler::with_unhealthy_after(
            Arc::clone(&store),
            Arc::clone(&events),
            Duration::from_secs(30),
        );

        assert_eq!(reconciler.reconcile_once(40).unwrap(), 0);
        assert_eq!(NodeStore::get(&*store, "n1").unwrap().status, NodeStatus::Active);
        assert!(events.is_empty());
    }

    #[test]
    fn already_unhealthy_node_is_not_reprocessed() {
        let store = Arc::new(InMemoryStore::new());
        NodeStore::create(&*store, node("n1", 0, NodeStatus::Unhealthy)).unwrap();
        let events = Arc::new(EventLog::new());
        let reconciler = HealthReconciler::with_unhealthy_after(
            Arc::clone(&store),
            Arc::clone(&events),
            Duration::from_secs(30),
        );

        assert_eq!(reconciler.reconcile_once(1_000_000).unwrap(), 0);
        assert!(events.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn run_stops_promptly_on_cancellation() {
        let store = Arc::new(InMemoryStore::new());
        let events = Arc::new(EventLog::new());
        let reconciler = HealthReconciler::new(store, events);
        let ctx = CancellationToken::new();
        ctx.cancel();
        reconciler.run(ctx, Duration::from_secs(10)).await;
    }
}
