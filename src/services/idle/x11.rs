use std::time::Duration;

use x11rb::connection::Connection;
use x11rb::protocol::screensaver;
use x11rb::protocol::xproto::Window;
use x11rb::rust_connection::RustConnection;

use super::IdleSampler;
use crate::core::error::SensorError;

/// Reads `ms_since_user_input` from the MIT-SCREEN-SAVER extension.
pub struct X11IdleSampler {
    conn: RustConnection,
    root: Window,
}

impl X11IdleSampler {
    pub fn connect() -> Result<Self, SensorError> {
        let (conn, screen_num) = x11rb::connect(None)
            .map_err(|e| SensorError::Unavailable(format!("x11 connect failed: {e}")))?;

        let root = conn
            .setup()
            .roots
            .get(screen_num)
            .map(|screen| screen.root)
            .ok_or_else(|| SensorError::Unavailable(format!("x11 screen {screen_num} missing")))?;

        let sampler = Self { conn, root };

        // fail early when the extension is missing
        sampler
            .idle_duration()
            .map_err(|e| SensorError::Unavailable(e.to_string()))?;

        Ok(sampler)
    }
}

impl IdleSampler for X11IdleSampler {
    fn name(&self) -> &'static str {
        "x11"
    }

    fn idle_duration(&self) -> Result<Duration, SensorError> {
        let info = screensaver::query_info(&self.conn, self.root)
            .map_err(|e| SensorError::Query(format!("screensaver query: {e}")))?
            .reply()
            .map_err(|e| SensorError::Query(format!("screensaver reply: {e}")))?;

        Ok(Duration::from_millis(u64::from(info.ms_since_user_input)))
    }
}
