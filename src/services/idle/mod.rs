pub mod wayland;
pub mod x11;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::oneshot;

use crate::core::error::SensorError;
use crate::{tinfo, twarn};

/// Source of "time since last keyboard/mouse input".
pub trait IdleSampler: Send + Sync {
    fn name(&self) -> &'static str;
    fn idle_duration(&self) -> Result<Duration, SensorError>;
}

/// Stand-in used when no idle source could be opened.
pub struct UnavailableSampler {
    reason: String,
}

impl UnavailableSampler {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

impl IdleSampler for UnavailableSampler {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    fn idle_duration(&self) -> Result<Duration, SensorError> {
        Err(SensorError::Unavailable(self.reason.clone()))
    }
}

/// Runs sensor queries off the async runtime with a hard deadline.
///
/// Each query runs on its own detached thread so a wedged sensor can neither
/// freeze the tick loop nor hold up process exit. While one query is still
/// outstanding, further samples fail fast with `SensorError::Stalled`.
pub struct BoundedSampler {
    inner: Arc<dyn IdleSampler>,
    limit: Duration,
    in_flight: Arc<AtomicBool>,
}

impl BoundedSampler {
    pub fn new(inner: Arc<dyn IdleSampler>, limit: Duration) -> Self {
        Self {
            inner,
            limit,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn name(&self) -> &'static str {
        self.inner.name()
    }

    pub async fn sample(&self) -> Result<Duration, SensorError> {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            return Err(SensorError::Stalled);
        }

        let (tx, rx) = oneshot::channel();
        let inner = Arc::clone(&self.inner);
        let in_flight = Arc::clone(&self.in_flight);

        let spawned = std::thread::Builder::new()
            .name("idle-query".to_string())
            .spawn(move || {
                let res = inner.idle_duration();
                in_flight.store(false, Ordering::Release);
                let _ = tx.send(res);
            });

        if let Err(e) = spawned {
            self.in_flight.store(false, Ordering::Release);
            return Err(SensorError::Query(format!("failed to spawn query thread: {e}")));
        }

        match tokio::time::timeout(self.limit, rx).await {
            Ok(Ok(res)) => res,
            Ok(Err(_)) => Err(SensorError::Query("query thread exited without a reading".to_string())),
            Err(_) => Err(SensorError::Timeout(self.limit)),
        }
    }
}

/// Pick an idle source for the current session.
///
/// Wayland sessions use `ext_idle_notifier_v1`; X11 sessions use the
/// MIT-SCREEN-SAVER extension. Anything else yields a sampler that always
/// reports `Unavailable`.
pub fn detect() -> Arc<dyn IdleSampler> {
    let mut failures = Vec::new();

    if std::env::var_os("WAYLAND_DISPLAY").is_some() {
        match wayland::WaylandIdleSampler::connect() {
            Ok(s) => {
                tinfo!("Idle", "using wayland ext_idle_notifier_v1");
                return Arc::new(s);
            }
            Err(e) => {
                twarn!("Idle", "{e}");
                failures.push(e.to_string());
            }
        }
    }

    if std::env::var_os("DISPLAY").is_some() {
        match x11::X11IdleSampler::connect() {
            Ok(s) => {
                tinfo!("Idle", "using X11 screensaver extension");
                return Arc::new(s);
            }
            Err(e) => {
                twarn!("Idle", "{e}");
                failures.push(e.to_string());
            }
        }
    }

    let reason = if failures.is_empty() {
        "neither WAYLAND_DISPLAY nor DISPLAY is set".to_string()
    } else {
        failures.join("; ")
    };

    twarn!("Idle", "no idle source available ({reason}); ticks will be skipped");
    Arc::new(UnavailableSampler::new(reason))
}
