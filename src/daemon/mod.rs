// License: MIT

mod run;


use std::time::Duration;

use chrono::{DateTime, Local};

use crate::config::TOOLTIP;
use crate::core::{
    accumulator::Accumulator,
    error::SensorError,
    format::format_label,
    info::InfoSnapshot,
};
use crate::services::{idle::BoundedSampler, store::Store, tray::TrayPresenter};
use crate::{tdebug, tinfo, twarn};

type AnyError = Box<dyn std::error::Error + Send + Sync>;

/// Owns the tracker state and every collaborator that touches it.
///
/// Only the daemon task holds this, so none of it needs locking.
pub struct Daemon {
    accumulator: Accumulator,
    store: Store,
    sampler: BoundedSampler,
    presenter: Box<dyn TrayPresenter>,
}

impl Daemon {
    /// Loads the persisted record and prepares the presenter.
    pub fn new(
        store: Store,
        sampler: BoundedSampler,
        mut presenter: Box<dyn TrayPresenter>,
        idle_threshold: Duration,
        now: DateTime<Local>,
    ) -> Self {
        presenter.set_label("Starting...");
        presenter.set_tooltip(TOOLTIP);

        let record = store.load(now);
        let accumulator = Accumulator::new(record, now, idle_threshold);

        tinfo!(
            "Daemon",
            "tracking into {} (today so far: {})",
            store.path().display(),
            format_label(accumulator.total())
        );

        Self {
            accumulator,
            store,
            sampler,
            presenter,
        }
    }

    pub fn accumulator(&self) -> &Accumulator {
        &self.accumulator
    }

    /// Samples the idle sensor and applies the reading.
    pub async fn handle_tick(&mut self, now: DateTime<Local>) {
        let reading = self.sampler.sample().await;
        self.on_tick(now, reading);
    }

    /// One accounting step.
    ///
    /// A failed reading drops the tick: no reset check, no accumulation, no
    /// label update, and the sample timestamp stays put.
    pub fn on_tick(&mut self, now: DateTime<Local>, reading: Result<Duration, SensorError>) {
        let idle = match reading {
            Ok(idle) => idle,
            Err(e) => {
                let since = self.accumulator.last_sample().format("%H:%M:%S");
                match e {
                    // a missing sensor stays missing; keep the log readable
                    SensorError::Unavailable(_) => {
                        tdebug!("Daemon", "error getting idle time: {e}; tick dropped (last sample {since})")
                    }
                    _ => twarn!("Daemon", "error getting idle time: {e}; tick dropped (last sample {since})"),
                }
                return;
            }
        };
        tdebug!("Daemon", "idle time: {}ms", idle.as_millis());

        if self.accumulator.rollover_if_new_day(now) {
            tinfo!("Daemon", "day change detected, resetting active time");
            self.store.persist(&self.accumulator.record());
        }

        match self.accumulator.accumulate(now, idle) {
            Some(delta) => {
                tdebug!(
                    "Daemon",
                    "active: +{}ms, total active: {}s",
                    delta.as_millis(),
                    self.accumulator.total().as_secs()
                );
                self.store.persist(&self.accumulator.record());
            }
            None => tdebug!("Daemon", "system idle"),
        }

        self.presenter.set_label(&format_label(self.accumulator.total()));
    }

    pub fn snapshot(&self) -> InfoSnapshot {
        let acc = self.accumulator();

        InfoSnapshot {
            text: format_label(acc.total()),
            tooltip: TOOLTIP.to_string(),
            class: "active-time".to_string(),
            total_seconds: acc.total().as_secs(),
            last_reset: acc.last_reset().to_rfc3339(),
            idle_threshold_seconds: acc.idle_threshold().as_secs(),
            sensor: self.sampler.name().to_string(),
        }
    }

    /// Final write on quit; same content as the last tick's write.
    pub fn shutdown(&mut self) {
        tinfo!("Daemon", "exiting, writing final active time");
        self.store.persist(&self.accumulator.record());
        self.presenter.quit();
    }
}
