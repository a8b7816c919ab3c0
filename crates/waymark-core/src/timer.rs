//! Timers driven by a host-supplied clock.
//!
//! Browsers give no monotonic `Instant` to wasm code, so every operation takes
//! `now` as a [`Duration`] since an arbitrary host epoch (typically
//! `performance.now()`). Headless hosts and tests advance the clock by hand.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

use slotmap::{SlotMap, new_key_type};

use crate::error::{Result, TimerError};

new_key_type! {
    /// A unique identifier for a timer.
    pub struct TimerId;
}

/// Internal timer data.
#[derive(Debug)]
struct TimerData {
    /// When this timer should fire.
    fire_time: Duration,
}

/// An entry in the timer queue (min-heap by fire time).
#[derive(Debug, Clone, Copy)]
struct TimerQueueEntry {
    id: TimerId,
    fire_time: Duration,
}

impl PartialEq for TimerQueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.fire_time == other.fire_time
    }
}

impl Eq for TimerQueueEntry {}

impl PartialOrd for TimerQueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerQueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap (BinaryHeap is max-heap by default).
        other.fire_time.cmp(&self.fire_time)
    }
}

/// Manages one-shot timers.
#[derive(Debug, Default)]
pub struct TimerManager {
    /// All pending timers.
    timers: SlotMap<TimerId, TimerData>,
    /// Priority queue of pending fires. Stopped timers are dropped lazily.
    queue: BinaryHeap<TimerQueueEntry>,
}

impl TimerManager {
    /// Create a new timer manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a one-shot timer that fires `duration` after `now`.
    pub fn start_one_shot(&mut self, now: Duration, duration: Duration) -> TimerId {
        let fire_time = now + duration;
        let id = self.timers.insert(TimerData { fire_time });
        self.queue.push(TimerQueueEntry { id, fire_time });
        tracing::trace!(target: "waymark_core::timer", ?id, ?fire_time, "timer started");
        id
    }

    /// Stop and remove a timer.
    pub fn stop(&mut self, id: TimerId) -> Result<()> {
        if self.timers.remove(id).is_some() {
            tracing::trace!(target: "waymark_core::timer", ?id, "timer stopped");
            Ok(())
        } else {
            Err(TimerError::InvalidTimerId.into())
        }
    }

    /// Check if a timer is still pending.
    pub fn is_active(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    /// The fire time of a pending timer.
    pub fn deadline(&self, id: TimerId) -> Option<Duration> {
        self.timers.get(id).map(|t| t.fire_time)
    }

    /// Number of pending timers.
    pub fn active_count(&self) -> usize {
        self.timers.len()
    }

    fn prune(&mut self) {
        while let Some(entry) = self.queue.peek() {
            if self.timers.contains_key(entry.id) {
                break;
            }
            self.queue.pop();
        }
    }

    /// Get the duration from `now` until the next timer fires, if any.
    pub fn time_until_next(&mut self, now: Duration) -> Option<Duration> {
        self.prune();
        self.queue
            .peek()
            .map(|entry| entry.fire_time.saturating_sub(now))
    }

    /// Remove and return every timer due at or before `now`, earliest first.
    #[tracing::instrument(skip(self), target = "waymark_core::timer", level = "trace")]
    pub fn process_expired(&mut self, now: Duration) -> Vec<TimerId> {
        let mut fired = Vec::new();
        while let Some(entry) = self.queue.peek().copied() {
            if entry.fire_time > now {
                break;
            }
            self.queue.pop();
            if self.timers.remove(entry.id).is_some() {
                fired.push(entry.id);
            }
        }
        fired
    }
}

/// Trailing-edge debouncer.
///
/// Each [`signal`](Self::signal) cancels any pending deadline and schedules a
/// new one `window` later; [`poll`](Self::poll) reports `true` exactly once
/// when a deadline passes without being superseded.
#[derive(Debug)]
pub struct Debouncer {
    timers: TimerManager,
    pending: Option<TimerId>,
    window: Duration,
}

impl Debouncer {
    /// Create a debouncer with the given quiet window.
    pub fn new(window: Duration) -> Self {
        Self {
            timers: TimerManager::new(),
            pending: None,
            window,
        }
    }

    /// The quiet window.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record an event at `now`, restarting the window.
    pub fn signal(&mut self, now: Duration) {
        if let Some(previous) = self.pending.take() {
            let _ = self.timers.stop(previous);
        }
        self.pending = Some(self.timers.start_one_shot(now, self.window));
    }

    /// Whether a deadline is pending.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The pending deadline, if any.
    pub fn deadline(&self) -> Option<Duration> {
        self.pending.and_then(|id| self.timers.deadline(id))
    }

    /// Check the deadline against `now`. Returns `true` once per quiet window.
    pub fn poll(&mut self, now: Duration) -> bool {
        let Some(pending) = self.pending else {
            return false;
        };
        if self.timers.process_expired(now).contains(&pending) {
            self.pending = None;
            return true;
        }
        false
    }

    /// Drop any pending deadline.
    pub fn cancel(&mut self) {
        if let Some(previous) = self.pending.take() {
            let _ = self.timers.stop(previous);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_one_shot_fires_once() {
        let mut timers = TimerManager::new();
        let id = timers.start_one_shot(ms(0), ms(50));

        assert!(timers.process_expired(ms(49)).is_empty());
        assert_eq!(timers.process_expired(ms(50)), vec![id]);
        assert!(timers.process_expired(ms(100)).is_empty());
        assert!(!timers.is_active(id));
    }

    #[test]
    fn test_fire_order() {
        let mut timers = TimerManager::new();
        let late = timers.start_one_shot(ms(0), ms(30));
        let early = timers.start_one_shot(ms(0), ms(10));
        assert_eq!(timers.process_expired(ms(40)), vec![early, late]);
    }

    #[test]
    fn test_stop() {
        let mut timers = TimerManager::new();
        let id = timers.start_one_shot(ms(0), ms(10));
        assert!(timers.stop(id).is_ok());
        assert!(timers.stop(id).is_err());
        assert!(timers.process_expired(ms(20)).is_empty());
        assert_eq!(timers.time_until_next(ms(0)), None);
    }

    #[test]
    fn test_time_until_next() {
        let mut timers = TimerManager::new();
        timers.start_one_shot(ms(100), ms(25));
        assert_eq!(timers.time_until_next(ms(110)), Some(ms(15)));
        assert_eq!(timers.time_until_next(ms(200)), Some(Duration::ZERO));
    }

    #[test]
    fn test_debouncer_trailing_edge() {
        let mut debounce = Debouncer::new(ms(100));
        debounce.signal(ms(0));
        debounce.signal(ms(60));
        assert!(!debounce.poll(ms(100)));
        assert_eq!(debounce.deadline(), Some(ms(160)));
        assert!(debounce.poll(ms(160)));
        assert!(!debounce.poll(ms(400)));
        assert!(!debounce.is_pending());
    }

    #[test]
    fn test_debouncer_cancel() {
        let mut debounce = Debouncer::new(ms(100));
        debounce.signal(ms(0));
        debounce.cancel();
        assert!(!debounce.poll(ms(200)));
    }
}
