//! Monotonic millisecond time source plus the cancellable timer handles that
//! drive every periodic or deferred piece of gameplay.
//!
//! All cadence checks compare `now - last >= interval`; nothing here sleeps or
//! blocks. Owners poll their timers with the current time once per tick.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

pub type Millis = u64;

pub trait Clock {
    fn now_ms(&self) -> Millis;
}

/// Time since `since`; zero when `since` lies in the future.
pub fn elapsed_ms(now: Millis, since: Millis) -> Millis {
    now.saturating_sub(since)
}

#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> Millis {
        self.origin.elapsed().as_millis() as Millis
    }
}

/// Hand-driven clock. Clones share the same underlying time so a caller can
/// keep a handle after passing the clock into a session.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Millis>>,
}

impl ManualClock {
    pub fn new(start_ms: Millis) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    /// Moves time to `ms`; earlier values are ignored to stay monotonic.
    pub fn set(&self, ms: Millis) {
        if ms > self.now.get() {
            self.now.set(ms);
        }
    }

    pub fn advance(&self, delta_ms: Millis) {
        self.now.set(self.now.get().saturating_add(delta_ms));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> Millis {
        self.now.get()
    }
}

/// Fixed-interval registration. Starting an already running timer and
/// cancelling a stopped one are both no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalTimer {
    interval_ms: Millis,
    next_due: Option<Millis>,
}

impl IntervalTimer {
    pub fn new(interval_ms: Millis) -> Self {
        Self {
            interval_ms: interval_ms.max(1),
            next_due: None,
        }
    }

    pub fn interval_ms(&self) -> Millis {
        self.interval_ms
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn start(&mut self, now: Millis) -> bool {
        if self.next_due.is_some() {
            return false;
        }
        self.next_due = Some(now.saturating_add(self.interval_ms));
        true
    }

    pub fn cancel(&mut self) -> bool {
        self.next_due.take().is_some()
    }

    /// Number of whole intervals that came due by `now`, at most `max_steps`.
    /// Backlog beyond the cap is dropped and the next deadline is re-anchored
    /// on `now`.
    pub fn due_steps(&mut self, now: Millis, max_steps: u32) -> u32 {
        let Some(mut due) = self.next_due else {
            return 0;
        };
        let mut steps = 0u32;
        while due <= now && steps < max_steps {
            steps += 1;
            due = due.saturating_add(self.interval_ms);
        }
        if due <= now {
            due = now.saturating_add(self.interval_ms);
        }
        self.next_due = Some(due);
        steps
    }
}

/// One-shot deferred task carrying its payload until it fires or is cancelled.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeout<T> {
    due_at: Millis,
    payload: Option<T>,
}

impl<T> Default for Timeout<T> {
    fn default() -> Self {
        Self {
            due_at: 0,
            payload: None,
        }
    }
}

impl<T> Timeout<T> {
    /// Replaces any pending task.
    pub fn schedule(&mut self, now: Millis, delay_ms: Millis, payload: T) {
        self.due_at = now.saturating_add(delay_ms);
        self.payload = Some(payload);
    }

    pub fn is_pending(&self) -> bool {
        self.payload.is_some()
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.payload.take()
    }

    pub fn fire_if_due(&mut self, now: Millis) -> Option<T> {
        if self.payload.is_some() && now >= self.due_at {
            self.payload.take()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_saturates_for_future_timestamps() {
        assert_eq!(elapsed_ms(150, 100), 50);
        assert_eq!(elapsed_ms(100, 150), 0);
    }

    #[test]
    fn manual_clock_is_shared_and_monotonic() {
        let clock = ManualClock::new(100);
        let handle = clock.clone();
        handle.advance(50);
        assert_eq!(clock.now_ms(), 150);

        handle.set(120);
        assert_eq!(clock.now_ms(), 150);
        handle.set(400);
        assert_eq!(clock.now_ms(), 400);
    }

    #[test]
    fn system_clock_never_goes_backwards() {
        let clock = SystemClock::new();
        let first = clock.now_ms();
        let second = clock.now_ms();
        assert!(second >= first);
    }

    #[test]
    fn interval_timer_start_and_cancel_are_idempotent() {
        let mut timer = IntervalTimer::new(16);
        assert!(timer.start(0));
        assert!(!timer.start(5));
        assert!(timer.is_running());
        assert!(timer.cancel());
        assert!(!timer.cancel());
        assert!(!timer.is_running());
    }

    #[test]
    fn interval_timer_counts_whole_intervals() {
        let mut timer = IntervalTimer::new(16);
        timer.start(0);
        assert_eq!(timer.due_steps(15, 8), 0);
        assert_eq!(timer.due_steps(16, 8), 1);
        assert_eq!(timer.due_steps(50, 8), 2);
        assert_eq!(timer.due_steps(63, 8), 0);
        assert_eq!(timer.due_steps(64, 8), 1);
    }

    #[test]
    fn interval_timer_drops_backlog_beyond_cap() {
        let mut timer = IntervalTimer::new(10);
        timer.start(0);
        assert_eq!(timer.due_steps(1_000, 3), 3);
        assert_eq!(timer.due_steps(1_005, 3), 0);
        assert_eq!(timer.due_steps(1_010, 3), 1);
    }

    #[test]
    fn stopped_interval_timer_reports_no_steps() {
        let mut timer = IntervalTimer::new(16);
        assert_eq!(timer.due_steps(10_000, 8), 0);
    }

    #[test]
    fn zero_interval_is_raised_to_one_millisecond() {
        assert_eq!(IntervalTimer::new(0).interval_ms(), 1);
    }

    #[test]
    fn timeout_fires_once_at_deadline() {
        let mut timeout = Timeout::default();
        timeout.schedule(100, 500, "spawn");
        assert!(timeout.is_pending());
        assert_eq!(timeout.fire_if_due(599), None);
        assert_eq!(timeout.fire_if_due(600), Some("spawn"));
        assert_eq!(timeout.fire_if_due(700), None);
        assert!(!timeout.is_pending());
    }

    #[test]
    fn cancelled_timeout_never_fires() {
        let mut timeout = Timeout::default();
        timeout.schedule(0, 10, 7u32);
        assert_eq!(timeout.cancel(), Some(7));
        assert_eq!(timeout.fire_if_due(1_000), None);
    }
}
