// License: MIT

use std::io;
use std::os::unix::net::{UnixListener, UnixStream};

use tokio::signal::unix::{SignalKind, signal};

// ---------------- single-instance lock ----------------

/// Bind the IPC socket, which doubles as the single-instance lock: only one
/// tracker may write the active time file.
///
/// A socket file nobody answers on is left over from a crash and gets
/// replaced.
pub fn acquire_single_instance_lock() -> Result<UnixListener, String> {
    let path = crate::ipc::socket_path()?;
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    match UnixListener::bind(&path) {
        Ok(l) => Ok(l),
        Err(e) if e.kind() == io::ErrorKind::AddrInUse => match UnixStream::connect(&path) {
            Ok(_) => Err(format!(
                "activity tracker is already running (another instance holds {})",
                path.display()
            )),
            Err(_) => {
                let _ = std::fs::remove_file(&path);
                UnixListener::bind(&path)
                    .map_err(|e| format!("failed to bind instance lock {}: {e}", path.display()))
            }
        },
        Err(e) => Err(format!("failed to bind instance lock {}: {e}", path.display())),
    }
}

/// Removes the socket file on exit so `info`/`stop` report "not running".
pub fn release_single_instance_lock() {
    if let Ok(path) = crate::ipc::socket_path() {
        let _ = std::fs::remove_file(path);
    }
}

// ---------------- quit signals ----------------

/// Resolves on Ctrl+C or SIGTERM.
pub async fn quit_signal() -> io::Result<&'static str> {
    let mut term = signal(SignalKind::terminate())?;

    tokio::select! {
        res = tokio::signal::ctrl_c() => res.map(|_| "Ctrl+C"),
        _ = term.recv() => Ok("SIGTERM"),
    }
}
