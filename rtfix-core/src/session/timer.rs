//! Cancelable timers owned by a lifecycle driver
//!
//! The driver schedules actions here and the connection task sleeps until
//! [`Timers::next_due`]. When the sleep ends the task hands the handle back
//! through [`SessionEvent::TimerFired`](super::SessionEvent::TimerFired); the
//! driver only acts if [`Timers::fire`] still knows the handle. Cancelling
//! empties the set, so a handle that was in flight when the session closed
//! is recognised as stale.

use std::time::Duration;

use tokio::time::Instant;

/// Work a timer performs when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledAction {
    SendGreeting,
    Close,
}

/// Handle identifying one scheduled action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle {
    id: u64,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    handle: TimerHandle,
    due: Instant,
    action: ScheduledAction,
}

/// Pending scheduled actions of one session
#[derive(Debug, Default)]
pub struct Timers {
    next_id: u64,
    pending: Vec<Pending>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `action` to run `after` from `now`
    pub fn schedule(&mut self, action: ScheduledAction, now: Instant, after: Duration) -> TimerHandle {
        let handle = TimerHandle { id: self.next_id };
        self.next_id += 1;
        self.pending.push(Pending {
            handle,
            due: now + after,
            action,
        });
        handle
    }

    /// Earliest pending timer
    pub fn next_due(&self) -> Option<(TimerHandle, Instant)> {
        self.pending
            .iter()
            .min_by_key(|p| (p.due, p.handle.id))
            .map(|p| (p.handle, p.due))
    }

    /// Claim a fired timer; `None` if it was cancelled or already fired
    pub fn fire(&mut self, handle: TimerHandle) -> Option<ScheduledAction> {
        let index = self.pending.iter().position(|p| p.handle == handle)?;
        Some(self.pending.swap_remove(index).action)
    }

    /// Drop every pending timer
    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.pending.len();
        self.pending.clear();
        cancelled
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
