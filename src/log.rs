use std::fmt::Arguments;
use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use chrono::Local;
use once_cell::sync::Lazy;

const MAX_LOG_BYTES: u64 = 5 * 1024 * 1024;
const LOG_BACKUPS: u32 = 3;

#[derive(PartialEq, PartialOrd, Clone, Copy, Debug)]
pub enum LogLevel {
    Error = 1,
    Warn  = 2,
    Info  = 3,
    Debug = 4,
}

impl LogLevel {
    /// Get ANSI color code for terminal output
    fn color(&self) -> &'static str {
        match self {
            LogLevel::Error => "\x1b[31m", // Red
            LogLevel::Warn  => "\x1b[33m", // Yellow
            LogLevel::Info  => "\x1b[36m", // Cyan
            LogLevel::Debug => "\x1b[90m", // Gray
        }
    }

    fn short(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERR",
            LogLevel::Warn  => "WRN",
            LogLevel::Info  => "INF",
            LogLevel::Debug => "DBG",
        }
    }
}

const RESET_COLOR: &str = "\x1b[0m";

pub struct Config {
    pub level: LogLevel,
    pub use_colors: bool,

    /// `None` until `init` runs; before that only errors reach stderr.
    pub file: Option<LogFile>,
}

pub static GLOBAL_CONFIG: Lazy<Mutex<Config>> = Lazy::new(|| {
    Mutex::new(Config {
        level: LogLevel::Info,
        use_colors: std::io::stdout().is_terminal(),
        file: None,
    })
});

fn config() -> MutexGuard<'static, Config> {
    GLOBAL_CONFIG.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Append-only log file, rotated into `<name>.1` .. `<name>.N` once it
/// outgrows `max_bytes`. Rotation only happens at the start of a run.
pub struct LogFile {
    path: PathBuf,
    max_bytes: u64,
    backups: u32,
}

impl LogFile {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            max_bytes: MAX_LOG_BYTES,
            backups: LOG_BACKUPS,
        }
    }

    /// Rotates an oversized log, then writes this run's header. An existing
    /// log gets a blank line first so runs stay visually apart.
    pub fn start_run(&self) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let len = match fs::metadata(&self.path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => 0,
            Err(e) => return Err(e),
        };

        let mut header = String::new();
        if len >= self.max_bytes {
            self.rotate()?;
        } else if len > 0 {
            header.push('\n');
        }
        header.push_str(&format!(
            "---- activity tracker started {} (pid {}) ----",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            std::process::id()
        ));

        self.append(&header)
    }

    pub fn append(&self, line: &str) -> io::Result<()> {
        let mut f = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(f, "{line}")
    }

    fn rotate(&self) -> io::Result<()> {
        if self.backups == 0 {
            return fs::remove_file(&self.path);
        }

        // the oldest backup is overwritten by the shift
        for n in (1..self.backups).rev() {
            let from = self.backup(n);
            if from.exists() {
                fs::rename(from, self.backup(n + 1))?;
            }
        }
        fs::rename(&self.path, self.backup(1))
    }

    fn backup(&self, n: u32) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(format!(".{n}"));
        name.into()
    }
}

/// Enable file logging for this run and pick the level.
pub fn init(verbose: bool) {
    set_verbose(verbose);

    let file = LogFile::new(log_path());
    if let Err(e) = file.start_run() {
        eprintln!("activity-tracker: failed to prepare log file {}: {e}", file.path.display());
        return;
    }

    config().file = Some(file);
}

/// Set verbose/debug mode
pub fn set_verbose(enabled: bool) {
    config().level = if enabled { LogLevel::Debug } else { LogLevel::Info };
}

/// Core logging function
pub fn log_message(level: LogLevel, prefix: &str, args: Arguments) {
    let config = config();

    if level > config.level {
        return;
    }

    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    let file_line = format!("[{}][{}][{}] {}", timestamp, level.short(), prefix, args);

    if let Some(file) = &config.file {
        if let Err(e) = file.append(&file_line) {
            eprintln!("Failed to write log: {}", e);
        }
    }

    // Console only in debug mode or for errors
    if config.level == LogLevel::Debug || level == LogLevel::Error {
        let console_line = if config.use_colors {
            format!("{}●{} [{}][{}] {}", level.color(), RESET_COLOR, timestamp, prefix, args)
        } else {
            file_line
        };

        // stdout may carry status lines for a bar, so the console echo goes to stderr
        eprintln!("{}", console_line);
    }
}

/// Flexible macro to allow formatted logging
#[macro_export]
macro_rules! tlog {
    ($level:expr, $prefix:expr, $($arg:tt)*) => {
        $crate::log::log_message($level, $prefix, format_args!($($arg)*))
    };
}

/// Convenience macros
#[macro_export]
macro_rules! tinfo {
    ($prefix:expr, $($arg:tt)*) => { $crate::tlog!($crate::log::LogLevel::Info, $prefix, $($arg)*) };
}

#[macro_export]
macro_rules! twarn {
    ($prefix:expr, $($arg:tt)*) => { $crate::tlog!($crate::log::LogLevel::Warn, $prefix, $($arg)*) };
}

#[macro_export]
macro_rules! terror {
    ($prefix:expr, $($arg:tt)*) => { $crate::tlog!($crate::log::LogLevel::Error, $prefix, $($arg)*) };
}

#[macro_export]
macro_rules! tdebug {
    ($prefix:expr, $($arg:tt)*) => { $crate::tlog!($crate::log::LogLevel::Debug, $prefix, $($arg)*) };
}

/// Get log file path
pub fn log_path() -> PathBuf {
    let mut path = dirs::cache_dir().unwrap_or_else(|| PathBuf::from("/tmp"));
    path.push(crate::config::APP_DIR);
    if !path.exists() {
        let _ = create_dir_all(&path);
    }
    path.push("activity_tracker.log");
    path
}
