use std::time::Duration;

use chrono::{DateTime, Local};

/// The persisted half of the tracker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityRecord {
    pub total: Duration,
    pub last_reset: DateTime<Local>,
}

impl ActivityRecord {
    /// A fresh accounting day starting at `now`.
    pub fn fresh(now: DateTime<Local>) -> Self {
        Self {
            total: Duration::ZERO,
            last_reset: now,
        }
    }
}

/// Active-time state machine.
///
/// Owned by the daemon task; every mutation goes through `rollover_if_new_day`
/// and `accumulate`, which the daemon calls once per successful tick.
#[derive(Debug, Clone)]
pub struct Accumulator {
    total: Duration,
    last_reset: DateTime<Local>,

    // in-memory only; never persisted
    last_sample: DateTime<Local>,

    idle_threshold: Duration,
}

impl Accumulator {
    pub fn new(record: ActivityRecord, started_at: DateTime<Local>, idle_threshold: Duration) -> Self {
        Self {
            total: record.total,
            last_reset: record.last_reset,
            last_sample: started_at,
            idle_threshold,
        }
    }

    pub fn total(&self) -> Duration {
        self.total
    }

    pub fn last_reset(&self) -> DateTime<Local> {
        self.last_reset
    }

    pub fn last_sample(&self) -> DateTime<Local> {
        self.last_sample
    }

    pub fn idle_threshold(&self) -> Duration {
        self.idle_threshold
    }

    pub fn record(&self) -> ActivityRecord {
        ActivityRecord {
            total: self.total,
            last_reset: self.last_reset,
        }
    }

    /// Zeroes the total when `now` falls on a different local calendar day
    /// than the last reset. Returns whether a reset happened.
    pub fn rollover_if_new_day(&mut self, now: DateTime<Local>) -> bool {
        if now.date_naive() == self.last_reset.date_naive() {
            return false;
        }

        self.total = Duration::ZERO;
        self.last_reset = now;
        true
    }

    /// Counts the wall time since the previous sample when `idle` is below
    /// the threshold. Returns the added delta, or `None` when idle.
    ///
    /// The sample timestamp always moves to `now`. A clock that stepped
    /// backwards contributes zero.
    pub fn accumulate(&mut self, now: DateTime<Local>, idle: Duration) -> Option<Duration> {
        let elapsed = (now - self.last_sample).to_std().unwrap_or(Duration::ZERO);
        self.last_sample = now;

        if idle >= self.idle_threshold {
            return None;
        }

        self.total = self.total.saturating_add(elapsed);
        Some(elapsed)
    }
}
