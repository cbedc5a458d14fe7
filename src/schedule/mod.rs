//! Cooperative scheduler over simulated time.
//!
//! All delayed work in a game (countdown steps, duel clock ticks, the pass
//! lockout, randomizer steps) is an [`Alarm`] registered here. Components keep
//! the returned [`TimerHandle`] and cancel through it; the scheduler itself
//! never calls back into anyone. The board drains due alarms with
//! [`Scheduler::pop_due`] and routes each one to its owner.
//!
//! ## Ordering
//!
//! Alarms fire in due-time order; ties fire in the order they were scheduled.
//! An alarm scheduled with zero delay while another is firing becomes due at
//! the current instant and fires in the same drain.
//!
//! ```
//! use std::time::Duration;
//! use tile_duel::schedule::{Alarm, Scheduler};
//!
//! let mut scheduler = Scheduler::new();
//! let tick = scheduler.schedule_repeating(Duration::from_millis(250), Alarm::ClockTick);
//!
//! let until = Duration::from_millis(600);
//! let mut fired = 0;
//! while let Some((handle, _)) = scheduler.pop_due(until) {
//!     assert_eq!(handle, tick);
//!     fired += 1;
//! }
//! assert_eq!(fired, 2);
//! assert!(scheduler.cancel(tick));
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Shortest cadence a repeating alarm runs at.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Identifies one scheduled alarm. Repeating alarms keep their handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimerHandle(u64);

impl TimerHandle {
    /// Raw handle value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Every kind of delayed work the game schedules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Alarm {
    /// Show countdown label `n` ("3", "2", "1", "GO!").
    CountdownStep(u8),
    /// Countdown over; the duel clocks start.
    CountdownFinished,
    /// One duel clock tick.
    ClockTick,
    /// The pass lockout ended.
    PassCooldownEnded,
    /// Advance the randomizer highlight.
    SelectorStep,
}

#[derive(Clone, Debug)]
struct Entry {
    handle: TimerHandle,
    due: Duration,
    /// Tie-breaker: scheduling order.
    seq: u64,
    alarm: Alarm,
    repeat: Option<Duration>,
}

/// Simulated-time alarm queue.
#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    now: Duration,
    next_handle: u64,
    next_seq: u64,
    entries: Vec<Entry>,
}

impl Scheduler {
    /// Create an empty scheduler at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulated time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of alarms still pending.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    /// Check whether a handle is still pending.
    #[must_use]
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.entries.iter().any(|e| e.handle == handle)
    }

    /// Fire `alarm` once, `delay` from now.
    pub fn schedule(&mut self, delay: Duration, alarm: Alarm) -> TimerHandle {
        self.insert(delay, alarm, None)
    }

    /// Fire `alarm` every `interval`, first after one interval.
    ///
    /// Intervals below [`MIN_INTERVAL`] are raised to it so a drain always
    /// terminates.
    pub fn schedule_repeating(&mut self, interval: Duration, alarm: Alarm) -> TimerHandle {
        let interval = interval.max(MIN_INTERVAL);
        self.insert(interval, alarm, Some(interval))
    }

    fn insert(&mut self, delay: Duration, alarm: Alarm, repeat: Option<Duration>) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        let seq = self.bump_seq();
        self.entries.push(Entry { handle, due: self.now + delay, seq, alarm, repeat });
        handle
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Cancel a pending alarm. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        before != self.entries.len()
    }

    /// Drop every pending alarm.
    pub fn cancel_all(&mut self) {
        if !self.entries.is_empty() {
            debug!(pending = self.entries.len(), "cancelling all scheduled alarms");
        }
        self.entries.clear();
    }

    /// Pop the next alarm due at or before `until`, moving `now` to its due time.
    ///
    /// Repeating alarms are re-armed one interval later under the same handle.
    /// Returns `None` once nothing more is due; call [`Scheduler::advance_to`]
    /// afterwards to settle `now` at `until`.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TimerHandle, Alarm)> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due <= until)
            .min_by_key(|(_, e)| (e.due, e.seq))
            .map(|(i, _)| i)?;

        let entry = &self.entries[idx];
        let (handle, alarm, due, repeat) = (entry.handle, entry.alarm, entry.due, entry.repeat);
        self.now = self.now.max(due);

        match repeat {
            Some(interval) => {
                let seq = self.bump_seq();
                let entry = &mut self.entries[idx];
                entry.due = due + interval;
                entry.seq = seq;
            }
            None => {
                self.entries.swap_remove(idx);
            }
        }

        Some((handle, alarm))
    }

    /// Move simulated time forward to `until` (never backwards).
    pub fn advance_to(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }
}
