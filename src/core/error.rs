// License: MIT

use std::fmt;
use std::time::Duration;

/// Failure to obtain an idle reading for a tick.
///
/// Every variant drops the tick: nothing is accumulated and the sample
/// timestamp stays where it was, so the next good tick spans the gap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorError {
    /// No usable idle source in this session (no Wayland notifier, no X11
    /// screensaver extension).
    Unavailable(String),

    /// The source exists but the query itself failed.
    Query(String),

    /// The query did not answer within the allowed window.
    Timeout(Duration),

    /// A previous query is still running; a new one is not started.
    Stalled,
}

/// Failure while reading or writing the persisted record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// No record on disk yet.
    NotFound,

    /// The file exists but could not be read.
    Read(String),

    /// The record could not be written.
    Write(String),

    /// The content is not `<nanos>,<unix-seconds>`.
    Corrupt(String),
}

// ---------------- Display ----------------

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorError::Unavailable(why) => write!(f, "idle sensor unavailable: {why}"),
            SensorError::Query(why) => write!(f, "idle query failed: {why}"),
            SensorError::Timeout(limit) => {
                write!(f, "idle query timed out after {}ms", limit.as_millis())
            }
            SensorError::Stalled => write!(f, "previous idle query still running"),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::NotFound => write!(f, "active time file not found"),
            StorageError::Read(why) => write!(f, "failed to read active time file: {why}"),
            StorageError::Write(why) => write!(f, "failed to write active time file: {why}"),
            StorageError::Corrupt(why) => write!(f, "active time file is corrupt: {why}"),
        }
    }
}

impl std::error::Error for SensorError {}
impl std::error::Error for StorageError {}
