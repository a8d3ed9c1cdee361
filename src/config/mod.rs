use std::path::PathBuf;
use std::time::Duration;

use eyre::Result;

use crate::cli::Args;
use crate::services::tray::OutputMode;

/// Directory name shared by the data file, the log file and the IPC socket.
pub const APP_DIR: &str = "activity_tracker";

pub const DATA_FILE: &str = "active_time";

/// Idle time at or above which a tick is not counted as active.
pub const IDLE_THRESHOLD: Duration = Duration::from_secs(60);

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Upper bound for a single idle-sensor query; well inside one tick.
pub const SENSOR_TIMEOUT: Duration = Duration::from_millis(500);

pub const TOOLTIP: &str = "Activity Tracker";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    pub data_path: PathBuf,
    pub idle_threshold: Duration,
    pub tick_interval: Duration,
    pub sensor_timeout: Duration,
    pub output: OutputMode,
}

impl TrackerConfig {
    pub fn from_args(args: &Args) -> Result<Self> {
        let data_path = match args.data_file.as_deref() {
            Some(p) => p.to_path_buf(),
            None => default_data_path()?,
        };

        let output = if args.no_status {
            OutputMode::Silent
        } else if args.json {
            OutputMode::Json
        } else {
            OutputMode::Plain
        };

        Ok(Self {
            data_path,
            idle_threshold: IDLE_THRESHOLD,
            tick_interval: TICK_INTERVAL,
            sensor_timeout: SENSOR_TIMEOUT,
            output,
        })
    }
}

/// `~/.config/activity_tracker/active_time`
pub fn default_data_path() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| eyre::eyre!("Could not determine home directory for the active time file"))?;

    Ok(home.join(".config").join(APP_DIR).join(DATA_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn data_file_override_wins() {
        let args = Args::parse_from(["activity-tracker", "--data-file", "/tmp/at/active_time"]);
        let cfg = TrackerConfig::from_args(&args).unwrap();

        assert_eq!(cfg.data_path, PathBuf::from("/tmp/at/active_time"));
        assert_eq!(cfg.idle_threshold, Duration::from_secs(60));
        assert_eq!(cfg.tick_interval, Duration::from_secs(1));
        assert_eq!(cfg.output, OutputMode::Plain);
    }

    #[test]
    fn output_flags_select_mode() {
        let args = Args::parse_from(["activity-tracker", "--data-file", "x", "--json"]);
        assert_eq!(TrackerConfig::from_args(&args).unwrap().output, OutputMode::Json);

        let args = Args::parse_from(["activity-tracker", "--data-file", "x", "--json", "--no-status"]);
        assert_eq!(TrackerConfig::from_args(&args).unwrap().output, OutputMode::Silent);
    }

    #[test]
    fn default_path_lives_under_dot_config() {
        if let Ok(path) = default_data_path() {
            assert!(path.ends_with(".config/activity_tracker/active_time"));
        }
    }
}
