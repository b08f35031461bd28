//! Reclamation of stale widget instances.
//!
//! Two triggers: the periodic timer (skipped while the user is active) and
//! an explicit node deletion from the host. Both run the same registry sweep.

use std::cell::Cell;
use std::rc::Rc;

use crate::constants::USER_IDLE_AFTER_MS;
use crate::coordinator::OperationCoordinator;
use crate::registry::HostGraph;

/// Remembers the last pointer/key/click event.
#[derive(Debug, Default)]
pub struct ActivityTracker {
    last_activity: Cell<Option<i64>>,
}

impl ActivityTracker {
    pub fn note_activity(&self, now_ms: i64) {
        self.last_activity.set(Some(now_ms));
    }

    pub fn is_active(&self, now_ms: i64) -> bool {
        self.last_activity
            .get()
            .is_some_and(|t| now_ms - t < USER_IDLE_AFTER_MS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepTrigger {
    Timer,
    NodeDeleted,
}

pub struct ReclamationSweeper {
    coordinator: Rc<OperationCoordinator>,
    host: Rc<dyn HostGraph>,
    activity: ActivityTracker,
}

impl ReclamationSweeper {
    pub fn new(coordinator: Rc<OperationCoordinator>, host: Rc<dyn HostGraph>) -> Self {
        Self {
            coordinator,
            host,
            activity: ActivityTracker::default(),
        }
    }

    pub fn activity(&self) -> &ActivityTracker {
        &self.activity
    }

    /// Timer tick. Returns `None` when the sweep was skipped.
    pub fn on_tick(&self, now_ms: i64) -> Option<usize> {
        if !self.coordinator.flags().enabled {
            return None;
        }
        if self.activity.is_active(now_ms) || self.coordinator.registry().len() == 0 {
            return None;
        }
        Some(self.sweep(SweepTrigger::Timer))
    }

    /// Host deleted a node. Runs regardless of user activity.
    pub fn on_node_removed(&self) -> usize {
        if !self.coordinator.flags().enabled {
            return 0;
        }
        self.sweep(SweepTrigger::NodeDeleted)
    }

    pub fn sweep(&self, trigger: SweepTrigger) -> usize {
        let removed = {
            let history = self.coordinator.history();
            self.coordinator
                .registry_mut()
                .sweep_unused(&history, self.host.as_ref())
        };
        let remaining = self.coordinator.registry().len();
        log::info!(
            "[{:?}] reclaimed {} empty widget instances, {} remaining",
            trigger,
            removed,
            remaining
        );
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_expires_after_idle_window() {
        let tracker = ActivityTracker::default();
        assert!(!tracker.is_active(0));
        tracker.note_activity(1_000);
        assert!(tracker.is_active(5_999));
        assert!(!tracker.is_active(6_000));
    }
}
