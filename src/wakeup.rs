//! One-shot wake scheduling.
//!
//! A wake is a single point in time. Nothing repeats: whoever handles a
//! firing is responsible for scheduling the next one.

use std::fmt;

use chrono::{DateTime, Utc};

/// Opaque identifier of a scheduled wake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl fmt::Display for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wake#{}", self.0)
    }
}

pub trait WakeScheduler {
    /// Arrange for a "fired" event at or after `at`.
    fn schedule(&mut self, at: DateTime<Utc>) -> TimerHandle;
}

/// A wake that has been scheduled but not delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingWake {
    pub handle: TimerHandle,
    pub at: DateTime<Utc>,
}

/// In-process scheduler: keeps pending wakes ordered by due time and lets the
/// host loop pull them out once they are due.
#[derive(Debug, Default)]
pub struct WakeQueue {
    next_id: u64,
    pending: Vec<PendingWake>,
}

impl WakeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// The earliest pending wake, if any.
    pub fn next_due(&self) -> Option<PendingWake> {
        self.pending.first().copied()
    }

    /// Remove and return every wake due at `now`, earliest first.
    pub fn pop_due(&mut self, now: DateTime<Utc>) -> Vec<PendingWake> {
        let split = self.pending.partition_point(|w| w.at <= now);
        self.pending.drain(..split).collect()
    }

    /// Drop a pending wake. Returns whether it was still pending.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|w| w.handle != handle);
        self.pending.len() != before
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl WakeScheduler for WakeQueue {
    fn schedule(&mut self, at: DateTime<Utc>) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        // Equal times keep scheduling order.
        let idx = self.pending.partition_point(|w| w.at <= at);
        self.pending.insert(idx, PendingWake { handle, at });
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn handles_are_unique() {
        let mut queue = WakeQueue::new();
        let now = Utc::now();
        let a = queue.schedule(now);
        let b = queue.schedule(now);
        assert_ne!(a, b);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn pending_wakes_are_ordered_by_time() {
        let mut queue = WakeQueue::new();
        let now = Utc::now();
        let late = queue.schedule(now + Duration::seconds(10));
        let early = queue.schedule(now + Duration::seconds(1));

        assert_eq!(queue.next_due().unwrap().handle, early);

        let due = queue.pop_due(now + Duration::seconds(5));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].handle, early);
        assert_eq!(queue.next_due().unwrap().handle, late);
    }

    #[test]
    fn nothing_due_before_its_time() {
        let mut queue = WakeQueue::new();
        let now = Utc::now();
        queue.schedule(now + Duration::seconds(3));
        assert!(queue.pop_due(now).is_empty());
        assert_eq!(queue.pop_due(now + Duration::seconds(3)).len(), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn cancel_removes_only_that_wake() {
        let mut queue = WakeQueue::new();
        let now = Utc::now();
        let a = queue.schedule(now);
        let b = queue.schedule(now);

        assert!(queue.cancel(a));
        assert!(!queue.cancel(a));
        assert_eq!(queue.next_due().unwrap().handle, b);
    }

    #[test]
    fn handle_display() {
        let mut queue = WakeQueue::new();
        let handle = queue.schedule(Utc::now());
        assert_eq!(handle.to_string(), "wake#0");
    }
}
