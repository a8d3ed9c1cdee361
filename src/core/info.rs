// License: MIT

use serde::Serialize;

/// Snapshot returned by the daemon for `activity-tracker info`.
///
/// `text`/`tooltip`/`class` follow the waybar custom-module contract; the
/// remaining fields are for scripts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InfoSnapshot {
    pub text: String,
    pub tooltip: String,
    pub class: String,

    pub total_seconds: u64,
    pub last_reset: String,
    pub idle_threshold_seconds: u64,
    pub sensor: String,
}

impl InfoSnapshot {
    pub fn pretty_text(&self) -> String {
        format!(
            "Active today:   {}\nSince:          {}\nIdle threshold: {}s\nIdle sensor:    {}",
            self.text, self.last_reset, self.idle_threshold_seconds, self.sensor
        )
    }

    /// Waybar needs valid JSON on stdout even when the daemon isn't running.
    pub fn not_running_json() -> &'static str {
        r#"{"text":"","tooltip":"Activity tracker not running","class":"not_running"}"#
    }
}
