use std::collections::VecDeque;
use std::sync::Mutex;

/// A queued firmware update (spec.md §4.J).
#[derive(Debug, Clone, PartialEq)]
pub struct FirmwareUpdate {
    /// Node targeted by this update.
    pub node_id: String,
    /// The node's current firmware version.
    pub current_version: String,
    /// The fleet's desired firmware version.
    pub desired_version: String,
    /// The [`strand_store::FirmwareImage`] id matching `desired_version`,
    /// if one is published. Falls back to `desired_version` itself when
    /// no matching image is found.
    pub firmware_id: String,
}

/// An event emitted by a fleet reconciler (spec.md §4.J: "append-only and
/// readable by operators").
#[derive(Debug, Clone, PartialEq)]
pub enum FleetEvent {
    /// A node missed its heartbeat deadline and transitioned to unhealthy.
    NodeUnhealthy {
        /// The node that transitioned.
        node_id: String,
        /// Unix epoch seconds the reconciler observed the transition.
        at: u64,
    },
    /// A firmware update was queued for a node.
    FirmwareUpdateQueued(FirmwareUpdate),
}

const DEFAULT_CAPACITY: usize = 10_000;

/// Bounded append-only log of [`FleetEvent`]s. Oldest events are dropped
/// once `capacity` is exceeded so the log cannot grow unbounded in a
/// long-running operator process.
pub struct EventLog {
    events: Mutex<VecDeque<FleetEvent>>,
    capacity: usize,
}

impl EventLog {
    /// A log bounded to [`DEFAULT_CAPACITY`] events.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// A log bounded to `capacity` events.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self { events: Mutex::new(VecDeque::new()), capacity }
    }

    /// Append `event`, evicting the oldest event if the log is full.
    pub fn push(&self, event: FleetEvent) {
        let mut events = self.events.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if events.len() >= self.capacity {
            events.pop_front();
        }
        events.push_back(event);
    }

    /// A snapshot of every event currently retained, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<FleetEvent> {
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// Number of events currently retained.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(std::sync::PoisonError::into_inner).len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_then_snapshot_preserves_order() {
        let log = EventLog::new();
        log.push(FleetEvent::NodeUnhealthy { node_id: "n1".to_owned(), at: 1 });
        log.push(FleetEvent::NodeUnhealthy { node_id: "n2".to_owned(), at: 2 });
        let events = log.snapshot();
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], FleetEvent::NodeUnhealthy { node_id, .. } if node_id == "n1"));
    }

    #[test]
    fn evicts_oldest_past_capacity() {
        let log = EventLog::with_capacity(2);
        log.push(FleetEvent::NodeUnhealthy { node_id: "n1".to_owned(), at: 1 });
        log.push(FleetEvent::NodeUnhealthy { node_id: "n2".to_owned(), at: 2 });
        log.push(FleetEvent::NodeUnhealthy { node_id: "n3".to_owned(), at: 3 });
        let events = log.snapshot();
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], FleetEvent::NodeUnhealthy { node_id, .. } if node_id == "n2"));
    }
}
