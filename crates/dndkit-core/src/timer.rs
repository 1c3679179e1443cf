#![forbid(unsafe_code)]

//! Host-polled timers.
//!
//! The engine never sleeps or spawns. A timer only records when it is due;
//! the host passes `now` on every event and tick, and the owner asks the
//! timer whether it fired. A stopped timer reports nothing, so there is no
//! trailing fire after teardown.

use core::time::Duration;

use web_time::Instant;

/// A repeating timer with a fixed period (`setInterval`).
///
/// A schedule that would run past the range of [`Instant`] is treated as
/// never due: the timer stays running but does not fire.
#[derive(Debug, Clone)]
pub struct Interval {
    period: Duration,
    running: bool,
    next_due: Option<Instant>,
}

impl Interval {
    /// Create a stopped interval. A zero period is clamped to 1 ms.
    #[must_use]
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            running: false,
            next_due: None,
        }
    }

    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Start (or restart) the interval; the first fire is one period after
    /// `now`.
    pub fn start(&mut self, now: Instant) {
        self.running = true;
        self.next_due = now.checked_add(self.period);
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.next_due = None;
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Number of periods elapsed since the last poll, advancing the
    /// schedule past `now`.
    pub fn poll(&mut self, now: Instant) -> u32 {
        let Some(due) = self.next_due else {
            return 0;
        };
        if now < due {
            return 0;
        }
        let behind = now.duration_since(due).as_nanos() / self.period.as_nanos();
        let fired = u32::try_from(behind.saturating_add(1)).unwrap_or(u32::MAX);
        self.next_due = self
            .period
            .checked_mul(fired)
            .and_then(|step| due.checked_add(step))
            .filter(|&next| next > now)
            .or_else(|| now.checked_add(self.period));
        fired
    }
}

/// A one-shot timer (`setTimeout`).
///
/// Arming with a delay beyond the range of [`Instant`] leaves the deadline
/// armed but never due.
#[derive(Debug, Clone, Default)]
pub struct Deadline {
    armed: bool,
    due: Option<Instant>,
}

impl Deadline {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            armed: false,
            due: None,
        }
    }

    /// Arm the deadline `delay` after `now`, replacing any previous one.
    pub fn arm(&mut self, now: Instant, delay: Duration) {
        self.armed = true;
        self.due = now.checked_add(delay);
    }

    pub fn cancel(&mut self) {
        self.armed = false;
        self.due = None;
    }

    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.armed
    }

    /// Whether the deadline is armed and `now` has reached it.
    #[must_use]
    pub fn is_due(&self, now: Instant) -> bool {
        self.armed && self.due.is_some_and(|due| now >= due)
    }
}

/// Host-driven clock for deterministic replay.
///
/// Time only moves when the host says so. `now()` is an [`Instant`] anchored
/// at construction, so it can be passed straight to `handle_event`/`tick`.
#[derive(Debug, Clone, Copy)]
pub struct DeterministicClock {
    base: Instant,
    elapsed: Duration,
}

impl Default for DeterministicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl DeterministicClock {
    /// Create a clock at elapsed zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            elapsed: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn now(&self) -> Instant {
        self.base + self.elapsed
    }

    /// Time since construction.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Set elapsed time. Moving backwards is ignored.
    pub fn set(&mut self, elapsed: Duration) {
        self.elapsed = self.elapsed.max(elapsed);
    }

    /// Advance by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
    }
}
