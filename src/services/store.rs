use std::fs;
use std::io::{self, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Local, TimeZone};

use crate::core::accumulator::ActivityRecord;
use crate::core::error::StorageError;
use crate::{tdebug, tinfo, twarn};

/// Single-record store for the active-time total.
///
/// On-disk format is `<total as i64 nanoseconds>,<last reset as i64 unix seconds>`
/// with no trailing newline, overwritten in place.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where an unreadable record is moved before the tracker starts over.
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".bak");
        self.path.with_file_name(name)
    }

    pub fn write(&self, record: &ActivityRecord) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::Write(e.to_string()))?;
        }

        let mut file = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .mode(0o644)
            .open(&self.path)
            .map_err(|e| StorageError::Write(e.to_string()))?;

        file.write_all(encode(record).as_bytes())
            .map_err(|e| StorageError::Write(e.to_string()))
    }

    /// Write-through used by the daemon; a failed write only gets logged.
    pub fn persist(&self, record: &ActivityRecord) {
        if let Err(e) = self.write(record) {
            twarn!("Store", "{e}");
        }
    }

    pub fn read(&self) -> Result<ActivityRecord, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(StorageError::NotFound),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                return Err(StorageError::Corrupt("not valid UTF-8".to_string()));
            }
            Err(e) => return Err(StorageError::Read(e.to_string())),
        };

        decode(&raw)
    }

    /// Startup load with recovery.
    ///
    /// - missing: start fresh and write it
    /// - corrupt: start fresh and overwrite it
    /// - unreadable: move it aside to `backup_path()` and start fresh without
    ///   writing; the next tick's write recreates the record
    pub fn load(&self, now: DateTime<Local>) -> ActivityRecord {
        match self.read() {
            Ok(record) => {
                tdebug!(
                    "Store",
                    "loaded total={}s last_reset={}",
                    record.total.as_secs(),
                    record.last_reset.to_rfc3339()
                );
                record
            }
            Err(StorageError::NotFound) => {
                tinfo!("Store", "active time file not found, initializing {}", self.path.display());
                let fresh = ActivityRecord::fresh(now);
                self.persist(&fresh);
                fresh
            }
            Err(e @ StorageError::Corrupt(_)) => {
                twarn!("Store", "{e}; reinitializing");
                let fresh = ActivityRecord::fresh(now);
                self.persist(&fresh);
                fresh
            }
            Err(e) => {
                twarn!("Store", "{e}; starting from zero for this run");
                let backup = self.backup_path();
                match fs::rename(&self.path, &backup) {
                    Ok(()) => tinfo!("Store", "kept unreadable record at {}", backup.display()),
                    Err(err) => twarn!("Store", "could not move unreadable record aside: {err}"),
                }
                ActivityRecord::fresh(now)
            }
        }
    }
}

pub fn encode(record: &ActivityRecord) -> String {
    let nanos = i64::try_from(record.total.as_nanos()).unwrap_or(i64::MAX);
    format!("{},{}", nanos, record.last_reset.timestamp())
}

pub fn decode(raw: &str) -> Result<ActivityRecord, StorageError> {
    let fields: Vec<&str> = raw.trim().split(',').collect();
    let [total, reset] = fields.as_slice() else {
        return Err(StorageError::Corrupt(format!(
            "expected 2 comma-separated fields, found {}",
            fields.len()
        )));
    };

    let nanos: i64 = total
        .parse()
        .map_err(|e| StorageError::Corrupt(format!("active time {total:?}: {e}")))?;
    let nanos = u64::try_from(nanos)
        .map_err(|_| StorageError::Corrupt(format!("negative active time {nanos}")))?;

    let secs: i64 = reset
        .parse()
        .map_err(|e| StorageError::Corrupt(format!("last reset {reset:?}: {e}")))?;
    let last_reset = Local
        .timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| StorageError::Corrupt(format!("last reset {secs} out of range")))?;

    Ok(ActivityRecord {
        total: Duration::from_nanos(nanos),
        last_reset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 6, 10, 14, 30, 0).single().unwrap()
    }

    fn store_in(dir: &tempfile::TempDir) -> Store {
        Store::new(dir.path().join("activity_tracker").join("active_time"))
    }

    #[test]
    fn write_then_read_returns_same_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let record = ActivityRecord {
            total: Duration::new(3 * 3600 + 17, 123_456_789),
            last_reset: now(),
        };
        store.write(&record).unwrap();

        assert_eq!(store.read().unwrap(), record);
    }

    #[test]
    fn round_trip_holds_across_the_value_range() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let at = |secs: i64| Local.timestamp_opt(secs, 0).single().unwrap();
        let cases = [
            (Duration::ZERO, now()),
            (Duration::from_nanos(999_999_999), now()),
            (Duration::from_nanos(i64::MAX as u64), now()),
            (Duration::from_secs(42), at(-86_400 * 400)),
            (Duration::from_secs(7), at(0)),
        ];

        for (total, last_reset) in cases {
            let record = ActivityRecord { total, last_reset };
            store.write(&record).unwrap();
            assert_eq!(store.read().unwrap(), record, "record {}", encode(&record));
        }
    }

    #[test]
    fn file_format_is_nanos_comma_seconds() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let record = ActivityRecord {
            total: Duration::from_secs(1),
            last_reset: now(),
        };
        store.write(&record).unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw, format!("1000000000,{}", now().timestamp()));
    }

    #[test]
    fn write_creates_directory_and_uses_0644() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(!store.path().parent().unwrap().exists());

        store.write(&ActivityRecord::fresh(now())).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        // umask can only remove bits
        assert_eq!(mode & 0o777 & !0o644, 0);
        assert_ne!(mode & 0o600, 0);
    }

    #[test]
    fn overwrite_replaces_longer_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store
            .write(&ActivityRecord { total: Duration::from_secs(99_999), last_reset: now() })
            .unwrap();
        store.write(&ActivityRecord::fresh(now())).unwrap();

        assert_eq!(fs::read_to_string(store.path()).unwrap(), format!("0,{}", now().timestamp()));
    }

    #[test]
    fn missing_file_is_initialized_and_written() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let record = store.load(now());

        assert_eq!(record, ActivityRecord::fresh(now()));
        assert_eq!(store.read().unwrap(), record);
    }

    #[test]
    fn corrupt_files_are_reset_and_overwritten() {
        for garbage in ["garbage", "1,2,3", "abc,123", "123,abc", "-5,123", ""] {
            let dir = tempfile::tempdir().unwrap();
            let store = store_in(&dir);
            fs::create_dir_all(store.path().parent().unwrap()).unwrap();
            fs::write(store.path(), garbage).unwrap();

            let record = store.load(now());

            assert_eq!(record, ActivityRecord::fresh(now()), "input {garbage:?}");
            assert_eq!(
                fs::read_to_string(store.path()).unwrap(),
                format!("0,{}", now().timestamp()),
                "input {garbage:?}"
            );
        }
    }

    #[test]
    fn trailing_newline_is_tolerated() {
        assert_eq!(
            decode("60000000000,1700000000\n").unwrap().total,
            Duration::from_secs(60)
        );
    }

    #[test]
    fn decode_reports_field_count() {
        assert_eq!(
            decode("1,2,3"),
            Err(StorageError::Corrupt("expected 2 comma-separated fields, found 3".to_string()))
        );
    }

    #[test]
    fn unreadable_file_is_moved_aside_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        // a directory where the file should be cannot be read as a record
        fs::create_dir_all(store.path()).unwrap();

        let record = store.load(now());

        assert_eq!(record, ActivityRecord::fresh(now()));
        assert!(store.backup_path().is_dir());
        assert!(!store.path().exists());
    }

    #[test]
    fn persist_swallows_write_errors() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        fs::write(&blocker, "").unwrap();

        let store = Store::new(blocker.join("active_time"));
        assert!(matches!(
            store.write(&ActivityRecord::fresh(now())),
            Err(StorageError::Write(_))
        ));
        store.persist(&ActivityRecord::fresh(now()));
    }

    #[test]
    fn backup_sits_next_to_record() {
        let store = Store::new("/home/u/.config/activity_tracker/active_time");
        assert_eq!(
            store.backup_path(),
            PathBuf::from("/home/u/.config/activity_tracker/active_time.bak")
        );
    }
}
