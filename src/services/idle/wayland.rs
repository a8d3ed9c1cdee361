// License: MIT

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};
use std::time::{Duration, Instant};

use wayland_client::{
    Connection, Dispatch, QueueHandle,
    protocol::{wl_registry, wl_seat::WlSeat},
};
use wayland_protocols::ext::idle_notify::v1::client::{
    ext_idle_notification_v1::{Event as IdleEvent, ExtIdleNotificationV1},
    ext_idle_notifier_v1::ExtIdleNotifierV1,
};

use super::IdleSampler;
use crate::core::error::SensorError;
use crate::{tdebug, terror, tinfo, twarn};

/// Granularity of the idle notification. Idle readings are exact to within
/// this window, far below the one-minute activity threshold.
const NOTIFY_TIMEOUT_MS: u32 = 1000;

/// Version 2 adds input-only notifications, which ignore idle inhibitors.
const NOTIFIER_VERSION: u32 = 2;

/// Which notification request the bound notifier supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NotificationKind {
    /// Only user input counts; inhibitors are ignored.
    Input,
    /// Idle inhibitors hold the seat active (version 1 compositors).
    Inhibitable,
}

/// Version to bind at and the notification kind it allows.
fn negotiate(advertised: u32) -> (u32, NotificationKind) {
    let version = advertised.clamp(1, NOTIFIER_VERSION);
    let kind = if version >= 2 {
        NotificationKind::Input
    } else {
        NotificationKind::Inhibitable
    };
    (version, kind)
}

/// Idle state shared between the dispatch thread and the sampler.
#[derive(Debug, Default)]
struct IdleMark {
    // set on `idled`, cleared on `resumed`
    idled_at: Option<Instant>,
}

fn lock(mark: &Mutex<IdleMark>) -> std::sync::MutexGuard<'_, IdleMark> {
    mark.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct WaylandState {
    mark: Arc<Mutex<IdleMark>>,

    idle_notifier: Option<(ExtIdleNotifierV1, NotificationKind)>,
    seat: Option<WlSeat>,
    notification: Option<ExtIdleNotificationV1>,
}

impl WaylandState {
    fn new(mark: Arc<Mutex<IdleMark>>) -> Self {
        Self {
            mark,
            idle_notifier: None,
            seat: None,
            notification: None,
        }
    }
}

// ---------------- Registry binding ----------------

impl Dispatch<wl_registry::WlRegistry, ()> for WaylandState {
    fn event(
        state: &mut Self,
        registry: &wl_registry::WlRegistry,
        event: wl_registry::Event,
        _: &(),
        _: &Connection,
        qh: &QueueHandle<Self>,
    ) {
        if let wl_registry::Event::Global {
            name,
            interface,
            version,
        } = event
        {
            match interface.as_str() {
                "ext_idle_notifier_v1" => {
                    let (version, kind) = negotiate(version);
                    let notifier = registry.bind::<ExtIdleNotifierV1, _, _>(name, version, qh, ());
                    state.idle_notifier = Some((notifier, kind));
                }
                "wl_seat" => {
                    state.seat = Some(registry.bind::<WlSeat, _, _>(name, 1, qh, ()));
                }
                _ => {}
            }
        }
    }
}

impl Dispatch<ExtIdleNotifierV1, ()> for WaylandState {
    fn event(
        _: &mut Self,
        _: &ExtIdleNotifierV1,
        _: <ExtIdleNotifierV1 as wayland_client::Proxy>::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
    }
}

impl Dispatch<WlSeat, ()> for WaylandState {
    fn event(
        _: &mut Self,
        _: &WlSeat,
        _: wayland_client::protocol::wl_seat::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
    }
}

// ---------------- Idle notifications ----------------

impl Dispatch<ExtIdleNotificationV1, ()> for WaylandState {
    fn event(
        state: &mut Self,
        _: &ExtIdleNotificationV1,
        event: IdleEvent,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        match event {
            IdleEvent::Idled => {
                lock(&state.mark).idled_at = Some(Instant::now());
                tdebug!("Wayland", "idled");
            }
            IdleEvent::Resumed => {
                lock(&state.mark).idled_at = None;
                tdebug!("Wayland", "resumed");
            }
            _ => {}
        }
    }
}

/// Idle sampler backed by `ext_idle_notifier_v1`.
///
/// The compositor only reports transitions, so the reading is reconstructed:
/// zero while input keeps arriving, otherwise the notification timeout plus
/// the time since `idled` fired.
pub struct WaylandIdleSampler {
    mark: Arc<Mutex<IdleMark>>,
    alive: Arc<AtomicBool>,
    timeout: Duration,
}

impl WaylandIdleSampler {
    /// Connects, binds the notifier and starts a detached dispatch thread.
    pub fn connect() -> Result<Self, SensorError> {
        let conn = Connection::connect_to_env()
            .map_err(|e| SensorError::Unavailable(format!("wayland connect failed: {e}")))?;
        let mut event_queue = conn.new_event_queue();
        let qh = event_queue.handle();
        let display = conn.display();

        let mark = Arc::new(Mutex::new(IdleMark::default()));
        let mut state = WaylandState::new(Arc::clone(&mark));

        let _registry = display.get_registry(&qh, ());
        event_queue
            .roundtrip(&mut state)
            .map_err(|e| SensorError::Unavailable(format!("wayland roundtrip failed: {e}")))?;

        let (Some((notifier, kind)), Some(seat)) = (&state.idle_notifier, &state.seat) else {
            return Err(SensorError::Unavailable(
                "compositor lacks ext_idle_notifier_v1 or wl_seat".to_string(),
            ));
        };
        let notification = match kind {
            NotificationKind::Input => {
                notifier.get_input_idle_notification(NOTIFY_TIMEOUT_MS, seat, &qh, ())
            }
            NotificationKind::Inhibitable => {
                twarn!(
                    "Wayland",
                    "ext_idle_notifier_v1 is version 1; idle inhibitors (video players) will read as activity"
                );
                notifier.get_idle_notification(NOTIFY_TIMEOUT_MS, seat, &qh, ())
            }
        };
        state.notification = Some(notification);

        let alive = Arc::new(AtomicBool::new(true));
        let alive_thread = Arc::clone(&alive);

        std::thread::Builder::new()
            .name("wayland-idle".to_string())
            .spawn(move || {
                tinfo!("Wayland", "idle notification active (timeout_ms={})", NOTIFY_TIMEOUT_MS);
                loop {
                    if let Err(e) = event_queue.blocking_dispatch(&mut state) {
                        terror!("Wayland", "dispatch error: {}", e);
                        break;
                    }
                }
                alive_thread.store(false, Ordering::Release);
            })
            .map_err(|e| SensorError::Unavailable(format!("failed to start wayland thread: {e}")))?;

        Ok(Self {
            mark,
            alive,
            timeout: Duration::from_millis(u64::from(NOTIFY_TIMEOUT_MS)),
        })
    }
}

impl IdleSampler for WaylandIdleSampler {
    fn name(&self) -> &'static str {
        "wayland"
    }

    fn idle_duration(&self) -> Result<Duration, SensorError> {
        if !self.alive.load(Ordering::Acquire) {
            return Err(SensorError::Query("wayland connection lost".to_string()));
        }

        Ok(idle_from_mark(&lock(&self.mark), self.timeout, Instant::now()))
    }
}

fn idle_from_mark(mark: &IdleMark, timeout: Duration, now: Instant) -> Duration {
    match mark.idled_at {
        Some(at) => timeout + now.saturating_duration_since(at),
        None => Duration::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binds_input_notifications_when_offered() {
        assert_eq!(negotiate(2), (2, NotificationKind::Input));
        assert_eq!(negotiate(5), (2, NotificationKind::Input));
    }

    #[test]
    fn version_one_falls_back_to_inhibitable() {
        assert_eq!(negotiate(1), (1, NotificationKind::Inhibitable));
        assert_eq!(negotiate(0), (1, NotificationKind::Inhibitable));
    }

    #[test]
    fn resumed_reads_as_zero() {
        let mark = IdleMark { idled_at: None };
        assert_eq!(idle_from_mark(&mark, Duration::from_secs(1), Instant::now()), Duration::ZERO);
    }

    #[test]
    fn idled_adds_notification_timeout() {
        let at = Instant::now();
        let mark = IdleMark { idled_at: Some(at) };

        let idle = idle_from_mark(&mark, Duration::from_secs(1), at + Duration::from_secs(90));
        assert_eq!(idle, Duration::from_secs(91));
    }
}
